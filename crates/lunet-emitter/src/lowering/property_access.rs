//! Accessor-property lowering.
//!
//! A property without a backing field reads and writes through accessor
//! calls. Plain reads become a getter call. Writes and increments become
//! setter calls whose value argument arrives later, via a deferred write.
//! Increment/decrement additionally guarantees the target is evaluated once
//! and, in value position, that the pre/post value is observable — both via
//! temps staged by the common access path before control reaches here.

use super::Lowerer;
use crate::ast::{NodeIndex, UnaryOp};
use crate::resolution::{AccessorRole, MemberSymbol, TypeFlags};
use crate::writer::DeferredWrite;
use lunet_common::TranslationError;
use std::sync::Arc;

impl<'a> Lowerer<'a> {
    /// Emit the member position of an accessor property. The target text and
    /// separator are already in the buffer; `target_var`/`value_var` name the
    /// temps the common access path staged, if any.
    pub(super) fn lower_property_member(
        &mut self,
        target: NodeIndex,
        member: &Arc<MemberSymbol>,
        target_var: Option<String>,
        value_var: Option<String>,
        is_statement: bool,
        is_const_target: bool,
    ) -> Result<(), TranslationError> {
        if let Some(op) = self.unary() {
            return self.lower_property_unary(
                op,
                target,
                member,
                target_var,
                value_var,
                is_statement,
                is_const_target,
            );
        }
        if self.assignment().is_some() {
            return self.lower_property_assignment(target, member, target_var, is_const_target);
        }

        let getter = self.overloads.accessor_name(member, AccessorRole::Getter);
        self.write(&getter);
        self.write("()");
        Ok(())
    }

    fn lower_property_unary(
        &mut self,
        op: UnaryOp,
        target: NodeIndex,
        member: &Arc<MemberSymbol>,
        target_var: Option<String>,
        value_var: Option<String>,
        is_statement: bool,
        is_const_target: bool,
    ) -> Result<(), TranslationError> {
        let getter = self.overloads.accessor_name(member, AccessorRole::Getter);
        let setter = self.overloads.accessor_name(member, AccessorRole::Setter);
        let receiver = match &target_var {
            Some(t) => t.clone(),
            None => self.capture(|l| l.lower_grouped_target(target, is_const_target))?,
        };
        let sep = if member.is_static() { "." } else { ":" };
        let read = format!("{receiver}{sep}{getter}()");

        if is_statement {
            // Statement position needs no result value:
            //   a:setCount(a:getCount() + 1)
            let delta = self.stepped_value(op, member, &read);
            self.write(&setter);
            self.write("(");
            self.write(&delta);
            self.write(")");
        } else {
            // Value position; the common path opened the sequence and staged
            // the old value:
            //   (_t2 = a:getCount(), a:setCount(_t2 + 1), _t2)
            let old = value_var.clone().unwrap_or_else(|| read.clone());
            let delta = self.stepped_value(op, member, &old);
            self.write(&getter);
            self.write("(), ");
            self.write(&receiver);
            self.write(sep);
            self.write(&setter);
            self.write("(");
            self.write(&delta);
            self.write("), ");
            if op.is_prefix() {
                self.write(&read);
            } else {
                self.write(&old);
            }
            self.write(")");
        }

        if let Some(t) = target_var {
            self.temps.release(&t);
        }
        if let Some(v) = value_var {
            self.temps.release(&v);
        }
        Ok(())
    }

    /// `old` stepped by one, respecting nullable lifting and numeric types
    /// whose step is a method rather than an operator.
    fn stepped_value(&self, op: UnaryOp, member: &MemberSymbol, old: &str) -> String {
        let flags = member.value_type.flags;
        if flags.contains(TypeFlags::NULLABLE) {
            format!(
                "{}.{}(\"{}\", {old})",
                self.config.root,
                self.config.lift_one,
                op.lift_name()
            )
        } else if flags.contains(TypeFlags::LIFTED_NUMERIC) {
            format!("{old}:{}()", op.lift_name())
        } else {
            format!("{old} {} 1", op.operator_text())
        }
    }

    fn lower_property_assignment(
        &mut self,
        target: NodeIndex,
        member: &Arc<MemberSymbol>,
        target_var: Option<String>,
        is_const_target: bool,
    ) -> Result<(), TranslationError> {
        let setter = self.overloads.accessor_name(member, AccessorRole::Setter);
        let op = self.assignment().unwrap_or(crate::ast::AssignmentOp::Assign);

        if op.is_compound() {
            // a:setCount(a:getCount() + <rhs>), the rhs filled in later.
            let getter = self.overloads.accessor_name(member, AccessorRole::Getter);
            let receiver = match &target_var {
                Some(t) => t.clone(),
                None => self.capture(|l| l.lower_grouped_target(target, is_const_target))?,
            };
            let sep = if member.is_static() { "." } else { ":" };
            let prefix = format!("{setter}({receiver}{sep}{getter}() {} ", op.operator_text());
            let mut deferred = DeferredWrite::new(prefix, ")");
            if let Some(t) = target_var {
                deferred = deferred.releasing(t);
            }
            self.writer.push_deferred(deferred);
        } else {
            self.writer
                .push_deferred(DeferredWrite::new(format!("{setter}("), ")"));
        }
        Ok(())
    }
}
