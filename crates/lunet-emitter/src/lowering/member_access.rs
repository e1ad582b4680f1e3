//! Member-access lowering.
//!
//! Given a member-access node and its resolution, append Lua text that is
//! behaviorally equivalent to the source access. The decision procedure is
//! ordered: unresolved fallback, inline templates, constant folding, enum
//! literals, type references, method references, then the common
//! field/property/method/event path. Evaluation-order guarantees (single
//! evaluation of side-effecting targets) live in `property_access.rs`.

use super::Lowerer;
use crate::ast::{MemberAccessData, NodeIndex};
use crate::identifiers::to_lower_camel_case;
use crate::resolution::{
    AccessorRole, ConstValue, MemberKind, MemberResolution, MemberSymbol, ResolutionResult,
    TypeFlags,
};
use crate::template::TemplateExpansion;
use crate::writer::DeferredWrite;
use lunet_common::{Span, TranslationError};
use std::sync::Arc;
use tracing::trace;

/// Everything the common access path needs, gathered before dispatch.
pub(super) struct AccessEmit {
    pub idx: NodeIndex,
    pub target: NodeIndex,
    pub member_name: String,
    pub resolution: ResolutionResult,
    pub standalone: Option<ResolutionResult>,
    pub member: Option<Arc<MemberSymbol>>,
    pub target_res: ResolutionResult,
    pub is_const_target: bool,
    pub start_pos: usize,
}

impl<'a> Lowerer<'a> {
    pub(crate) fn lower_member_access(&mut self, idx: NodeIndex) -> Result<(), TranslationError> {
        let Some(access) = self.arena.get_member_access(idx) else {
            return Ok(());
        };
        let access = MemberAccessData {
            target: access.target,
            member_name: access.member_name.clone(),
        };
        let span = self.arena.get(idx).map_or(Span::empty(), |n| n.span);
        let start_pos = self.writer.len();

        let target_res = self.resolver.resolve(access.target);
        let is_const_target = is_constant_target(&target_res);

        // Resolution selection: when this node is the callee of an enclosing
        // invocation, the invocation's resolution usually carries the bound
        // member; the standalone resolution wins only when it is itself
        // invocation-shaped (a delegate-typed member being called).
        let parent = self.arena.parent_of(idx);
        let is_callee = self.arena.is_invocation_callee(idx);
        let standalone = if is_callee {
            Some(self.resolver.resolve(idx))
        } else {
            None
        };
        let mut resolution = match &standalone {
            Some(s) if s.is_invocation() => s.clone(),
            Some(_) => self.resolver.resolve(parent),
            None => self.resolver.resolve(idx),
        };
        trace!(member = %access.member_name, resolution = ?resolution, "member access");

        // Unresolved fallback: keep partially-resolved code translatable.
        if matches!(resolution, ResolutionResult::Error) {
            self.lower_grouped_target(access.target, is_const_target)?;
            self.write(".");
            let name = to_lower_camel_case(&access.member_name);
            self.write(&name);
            return Ok(());
        }

        // Method group: bind by re-resolving against the parent. A dynamic
        // parent invocation binds to the last candidate.
        if let ResolutionResult::MethodGroup(candidates) = &resolution {
            let candidates = candidates.clone();
            let parent_res = self.resolver.resolve(parent);
            resolution = match parent_res {
                ResolutionResult::Dynamic => match candidates.last() {
                    Some(method) => ResolutionResult::Member(MemberResolution {
                        member: Arc::clone(method),
                        target: Box::new(ResolutionResult::TypeRef(
                            method.declaring_type.clone(),
                        )),
                        is_compile_time_constant: false,
                    }),
                    None => ResolutionResult::Dynamic,
                },
                other => other,
            };
        }

        let member: Option<Arc<MemberSymbol>> =
            resolution.member_view().map(|v| Arc::clone(v.member));
        let member_is_ctc = resolution
            .member_view()
            .is_some_and(|v| v.is_compile_time_constant);
        let template = member.as_ref().and_then(|m| self.template_for(m));

        // Template carrying the receiver placeholder: the receiver is lowered
        // into an isolated buffer and substituted; the filled template either
        // becomes a deferred writer (invocation, awaiting arguments) or is
        // written in place. A templated method used as a bare reference has
        // no callable shape here.
        if let Some(tpl) = &template {
            if tpl.has_receiver() {
                let receiver =
                    self.capture(|l| l.lower_grouped_target(access.target, is_const_target))?;
                let expansion = tpl.expand(Some(&receiver));
                if resolution.is_invocation() {
                    self.push_template_deferred(expansion);
                } else if member.as_ref().is_some_and(|m| m.kind == MemberKind::Method) {
                    let full = member.as_ref().map(|m| m.full_name.clone()).unwrap_or_default();
                    return Err(TranslationError::invalid_template_usage(full, span));
                } else {
                    let text = expansion.into_text();
                    self.write(&text);
                }
                return Ok(());
            }
        }

        // Compile-time-constant field: fold the literal; the target is never
        // emitted. Enum members are const fields too but follow the enum
        // emission mode below.
        if let Some(m) = &member {
            if m.kind == MemberKind::Field
                && m.is_const()
                && !m.declaring_type.is_enum()
                && template.is_none()
            {
                let value = m.constant_value.clone().unwrap_or(ConstValue::Nil);
                self.write_script(&value);
                return Ok(());
            }
        }

        // Static member with a receiver-less template.
        if let (Some(tpl), Some(m)) = (&template, &member) {
            if m.is_static() {
                if resolution.is_invocation() {
                    let expansion = tpl.expand(None);
                    self.push_template_deferred(expansion);
                } else if m.kind == MemberKind::Method {
                    match tpl.callable_prefix() {
                        Some(prefix) => {
                            let prefix = prefix.to_string();
                            self.write(&prefix);
                        }
                        None => {
                            return Err(TranslationError::malformed_template(
                                m.full_name.clone(),
                                span,
                            ));
                        }
                    }
                } else {
                    // Templated static field/property referenced bare: no
                    // argument text exists, positional holes fill empty.
                    let text = tpl.fill_positional(None, &[]);
                    self.write(&text);
                }
                return Ok(());
            }
        }

        // Enum literal: table-driven mode plus per-member rename.
        if let Some(m) = &member {
            if member_is_ctc && m.declaring_type.is_enum() && self.lower_enum_literal(m) {
                return Ok(());
            }
        }

        // Bare type reference.
        if let ResolutionResult::TypeRef(ty) = &resolution {
            let name = ty.name.clone();
            self.write(&name);
            return Ok(());
        }

        // Method referenced as a first-class value.
        if let Some(m) = &member {
            if m.kind == MemberKind::Method && !resolution.is_invocation() && !is_callee {
                let m = Arc::clone(m);
                return self.lower_method_reference(access.target, &m, is_const_target);
            }
        }

        self.lower_common_access(AccessEmit {
            idx,
            target: access.target,
            member_name: access.member_name,
            resolution,
            standalone,
            member,
            target_res,
            is_const_target,
            start_pos,
        })
    }

    /// Properties, fields, events, and in-place method invocations: the
    /// target is emitted (with temps staged for side-effecting property
    /// targets), then the separator, then the member.
    fn lower_common_access(&mut self, emit: AccessEmit) -> Result<(), TranslationError> {
        let AccessEmit {
            idx,
            target,
            member_name,
            resolution,
            standalone,
            member,
            target_res,
            is_const_target,
            start_pos,
        } = emit;

        let accessor_property = member
            .as_ref()
            .is_some_and(|m| m.kind == MemberKind::Property && !m.is_field_backed());

        let mut is_statement = false;
        let mut target_var: Option<String> = None;
        let mut value_var: Option<String> = None;

        if accessor_property {
            let mut stage_target = false;
            if self.assignment().is_some_and(|op| op.is_compound()) {
                stage_target = true;
            } else if self.unary().is_some() {
                stage_target = true;
                is_statement = self.arena.is_statement_unary(idx);
                if member
                    .as_ref()
                    .is_some_and(|m| m.value_type.flags.contains(TypeFlags::NULLABLE))
                {
                    is_statement = false;
                }
                if !is_statement {
                    self.write("(");
                }
            }
            if stage_target && !target_res.is_side_effect_free_target() {
                let t = self.temps.allocate();
                tracing::debug!(temp = %t, member = %member_name, "staging side-effecting target");
                if is_statement || self.assignment().is_some() {
                    self.write("local ");
                }
                self.write(&t);
                self.write(" = ");
                target_var = Some(t);
            }
        }

        if accessor_property && self.unary().is_some() && !is_statement && target_var.is_none() {
            let v = self.temps.allocate();
            self.write(&v);
            self.write(" = ");
            value_var = Some(v);
        }

        // A method of the class currently being lowered invoked in place is
        // emitted without its (implicit) target.
        let is_invoke_in_cur_class = resolution.is_invocation()
            && member
                .as_ref()
                .is_some_and(|m| m.flags.contains(crate::resolution::MemberFlags::INTERNAL));

        if !is_invoke_in_cur_class {
            self.lower_grouped_target(target, is_const_target)?;
        }

        if let Some(t) = target_var.clone() {
            if self.unary().is_some() && !is_statement {
                self.write(", ");
                let v = self.temps.allocate();
                self.write(&v);
                self.write(" = ");
                self.write(&t);
                value_var = Some(v);
            } else {
                self.write(";\n");
                self.write(&t);
            }
        }

        let is_delegate_invocation = matches!(
            &resolution,
            ResolutionResult::Invocation(inv) if inv.is_delegate_invocation
        );

        // Instance accessor calls use the Lua method-call separator; fields,
        // field-backed properties, statics, and unresolved names use a dot.
        if !is_invoke_in_cur_class {
            let colon = member.as_ref().is_some_and(|m| {
                !m.is_static()
                    && ((m.kind == MemberKind::Method && !is_delegate_invocation)
                        || (m.kind == MemberKind::Property && !m.is_field_backed()))
            });
            self.write(if colon { ":" } else { "." });
        }

        let Some(m) = member else {
            // Dynamic targets keep the member name verbatim; everything else
            // memberless falls back to lower-camel.
            let name = if matches!(target_res, ResolutionResult::Dynamic) {
                member_name
            } else {
                to_lower_camel_case(&member_name)
            };
            self.write(&name);
            self.check_value_type_copy(&resolution, start_pos);
            return Ok(());
        };

        if let Some(tpl) = self.template_for(&m) {
            // Receiver-less instance template, emitted at the member position.
            if resolution.is_invocation()
                || (m.kind == MemberKind::Property && self.assignment().is_some())
            {
                let expansion = tpl.expand(None);
                self.push_template_deferred(expansion);
            } else {
                let text = tpl.expand(None).into_text();
                self.write(&text);
            }
        } else if m.kind == MemberKind::Property && !m.is_field_backed() {
            self.lower_property_member(
                target,
                &m,
                target_var,
                value_var,
                is_statement,
                is_const_target,
            )?;
        } else if m.kind == MemberKind::Property || m.kind == MemberKind::Field {
            // Field-backed property access and direct field access emit the
            // same shape: the overload-resolved name, no accessor call.
            // Passthrough enum members reach here and keep their name.
            if m.is_const() && !m.declaring_type.is_enum() {
                let value = m.constant_value.clone().unwrap_or(ConstValue::Nil);
                self.write_script(&value);
            } else {
                let name = self.overloads.overload_name(&m);
                self.write(&name);
            }
        } else if resolution.is_invocation() {
            self.lower_invoked_member_name(&m, &standalone, is_delegate_invocation, is_invoke_in_cur_class);
        } else if m.kind == MemberKind::Event {
            self.lower_event_member(&m);
        } else {
            let name = to_lower_camel_case(&m.name);
            self.write(&name);
        }

        self.check_value_type_copy(&resolution, start_pos);
        Ok(())
    }

    fn lower_invoked_member_name(
        &mut self,
        member: &Arc<MemberSymbol>,
        standalone: &Option<ResolutionResult>,
        is_delegate_invocation: bool,
        is_invoke_in_cur_class: bool,
    ) {
        // Invoking a delegate-typed member: the name comes from the member
        // the access itself resolved to, not the delegate's Invoke.
        if is_delegate_invocation {
            if let Some(ResolutionResult::Member(sm)) = standalone {
                if sm.member.full_name != member.full_name {
                    let name = self.overloads.overload_name(&sm.member);
                    self.write(&name);
                    return;
                }
            }
        }

        let mut name = self.overloads.overload_name(member);
        if is_invoke_in_cur_class && self.is_local_in_scope(&name) {
            let alias = self.unique_local_name(&name);
            self.record_alias(alias.clone(), name);
            name = alias;
        }
        self.write(&name);
    }

    fn lower_event_member(&mut self, member: &Arc<MemberSymbol>) {
        use crate::ast::AssignmentOp;
        match self.assignment() {
            Some(AssignmentOp::Add) => {
                let accessor = self.overloads.accessor_name(member, AccessorRole::Add);
                self.writer
                    .push_deferred(DeferredWrite::new(format!("{accessor}("), ")"));
            }
            Some(AssignmentOp::Subtract) => {
                let accessor = self.overloads.accessor_name(member, AccessorRole::Remove);
                self.writer
                    .push_deferred(DeferredWrite::new(format!("{accessor}("), ")"));
            }
            _ => {
                let name = to_lower_camel_case(&member.name);
                self.write(&name);
            }
        }
    }

    /// Delegate-bind wrapper for a method used as a first-class value.
    fn lower_method_reference(
        &mut self,
        target: NodeIndex,
        member: &Arc<MemberSymbol>,
        is_const_target: bool,
    ) -> Result<(), TranslationError> {
        let name = self.overloads.overload_name(member);
        if member.is_extension_method() {
            let root = self.config.root.clone();
            let bind = self.config.delegate_bind_scope.clone();
            self.write(&format!("{root}.{bind}("));
            self.with_clean_access_flags(|l| l.lower_expression(target))?;
            self.write(", ");
            let declaring = member.declaring_type.name.clone();
            self.write(&declaring);
            self.write(".");
            self.write(&name);
            self.write(")");
        } else if !member.is_static() {
            let root = self.config.root.clone();
            let bind = self.config.delegate_bind.clone();
            self.write(&format!("{root}.{bind}("));
            self.with_clean_access_flags(|l| l.lower_expression(target))?;
            self.write(", ");
            self.lower_grouped_target(target, is_const_target)?;
            self.write(".");
            self.write(&name);
            self.write(")");
        } else {
            // Static method: the bare overload name on its type.
            self.lower_grouped_target(target, is_const_target)?;
            self.write(".");
            self.write(&name);
        }
        Ok(())
    }

    /// Lower the target, parenthesizing constants and enum literals so a
    /// following accessor binds correctly once the constant is inlined.
    /// Context flags are cleared for the duration.
    pub(crate) fn lower_grouped_target(
        &mut self,
        target: NodeIndex,
        grouped: bool,
    ) -> Result<(), TranslationError> {
        self.with_clean_access_flags(|l| {
            if grouped {
                l.write("(");
            }
            l.lower_expression(target)?;
            if grouped {
                l.write(")");
            }
            Ok(())
        })
    }

    /// Emit an enum literal according to the enum's configured mode. Returns
    /// false for passthrough, which continues as ordinary member access.
    fn lower_enum_literal(&mut self, member: &Arc<MemberSymbol>) -> bool {
        use crate::config::EnumEmitMode;
        use crate::identifiers::{to_lowercase, to_uppercase};

        let mode = self.config.enums.mode_for(&member.declaring_type);
        match mode {
            EnumEmitMode::Passthrough => false,
            EnumEmitMode::Numeric => {
                let value = member.constant_value.clone().unwrap_or(ConstValue::Nil);
                self.write_script(&value);
                true
            }
            _ => {
                // A configured rename wins over the mode's casing.
                let name = match self.config.enums.rename_for(&member.full_name) {
                    Some(rename) => rename.to_string(),
                    None => match mode {
                        EnumEmitMode::LowerCamel => to_lower_camel_case(&member.name),
                        EnumEmitMode::Lowercase => to_lowercase(&member.name),
                        EnumEmitMode::Uppercase => to_uppercase(&member.name),
                        _ => member.name.clone(),
                    },
                };
                self.write_script(&ConstValue::Str(name));
                true
            }
        }
    }

    pub(super) fn push_template_deferred(&mut self, expansion: TemplateExpansion) {
        let deferred = if expansion.has_hole {
            DeferredWrite::new(expansion.prefix, expansion.suffix)
        } else {
            DeferredWrite::complete(expansion.into_text())
        };
        self.writer.push_deferred(deferred);
    }

    /// Defensive copy for mutable value types read through an aliasing path.
    fn check_value_type_copy(&mut self, resolution: &ResolutionResult, start: usize) {
        if !self.config.copy_value_types {
            return;
        }
        if self.assignment().is_some() || self.unary().is_some() {
            return;
        }
        if resolution.is_invocation() {
            return;
        }
        let Some(view) = resolution.member_view() else {
            return;
        };
        if !matches!(view.member.kind, MemberKind::Field | MemberKind::Property) {
            return;
        }
        if view.member.is_const() {
            return;
        }
        if view
            .member
            .value_type
            .flags
            .contains(TypeFlags::MUTABLE_VALUE)
        {
            let wrapper = format!("{}.{}(", self.config.root, self.config.value_copy);
            self.writer.insert_at(start, &wrapper);
            self.write(")");
        }
    }
}

fn is_constant_target(target_res: &ResolutionResult) -> bool {
    match target_res {
        ResolutionResult::Constant(_) => true,
        ResolutionResult::Member(m) => {
            (m.member.declaring_type.is_enum() && m.member.kind == MemberKind::Field)
                || m.is_compile_time_constant
        }
        _ => false,
    }
}
