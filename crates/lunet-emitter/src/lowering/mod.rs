//! The lowering engine.
//!
//! `Lowerer` walks expressions depth-first and appends Lua text to its
//! output writer. Member access is the interesting part (`member_access.rs`,
//! `property_access.rs`); the remaining expression kinds exist so targets,
//! arguments, and the surrounding assignment/increment constructs can be
//! lowered end to end.
//!
//! Two context flags — the assignment in progress and the unary accessor in
//! progress — are saved and restored around every recursive lowering of a
//! sub-expression, so a nested property read inside an outer write is never
//! mistaken for an assignment target. The helpers below make the restore
//! happen on every exit path, error or not.

mod default_value;
mod member_access;
mod property_access;

use crate::ast::{AssignmentOp, ExprArena, NodeIndex, NodeKind, UnaryOp};
use crate::config::EmitConfig;
use crate::resolution::{
    ConstValue, MemberKind, MemberSymbol, OverloadNameResolver, SemanticResolver,
};
use crate::template::InlineTemplate;
use crate::temp::TempAllocator;
use crate::writer::OutputWriter;
use lunet_common::TranslationError;
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use tracing::trace;

/// A one-time alias introduced when an emitted method name would be shadowed
/// by an in-scope local. The driver flushes these as `local alias = original`
/// ahead of the statement that needed them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasDecl {
    pub alias: String,
    pub original: String,
}

/// The member-access lowering engine.
pub struct Lowerer<'a> {
    pub(crate) arena: &'a ExprArena,
    pub(crate) resolver: &'a dyn SemanticResolver,
    pub(crate) overloads: &'a dyn OverloadNameResolver,
    pub(crate) config: &'a EmitConfig,
    pub(crate) writer: OutputWriter,
    pub(crate) temps: TempAllocator,
    templates: FxHashMap<String, Rc<InlineTemplate>>,
    assignment: Option<AssignmentOp>,
    unary: Option<UnaryOp>,
    locals: FxHashSet<String>,
    aliases: Vec<AliasDecl>,
}

impl<'a> Lowerer<'a> {
    pub fn new(
        arena: &'a ExprArena,
        resolver: &'a dyn SemanticResolver,
        overloads: &'a dyn OverloadNameResolver,
        config: &'a EmitConfig,
    ) -> Self {
        Lowerer {
            arena,
            resolver,
            overloads,
            config,
            writer: OutputWriter::new(),
            temps: TempAllocator::new(),
            templates: FxHashMap::default(),
            assignment: None,
            unary: None,
            locals: FxHashSet::default(),
            aliases: Vec::new(),
        }
    }

    /// Register a local name as in scope, for shadow detection.
    pub fn declare_local(&mut self, name: impl Into<String>) {
        self.locals.insert(name.into());
    }

    pub fn output(&self) -> &str {
        self.writer.output()
    }

    pub fn into_output(self) -> String {
        self.writer.into_output()
    }

    /// Aliases introduced so far, in introduction order.
    pub fn alias_decls(&self) -> &[AliasDecl] {
        &self.aliases
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Lower an expression statement, flushing any aliases it introduced
    /// ahead of the statement text.
    pub fn lower_statement(&mut self, idx: NodeIndex) -> Result<(), TranslationError> {
        let Some(stmt) = self.arena.get_expression_statement(idx) else {
            return self.lower_expression(idx);
        };
        let expression = stmt.expression;
        let alias_mark = self.aliases.len();
        let text = self.capture(|l| l.lower_expression(expression))?;
        for decl in self.aliases[alias_mark..].to_vec() {
            self.write("local ");
            self.write(&decl.alias);
            self.write(" = ");
            self.write(&decl.original);
            self.write("\n");
        }
        self.write(&text);
        Ok(())
    }

    // =========================================================================
    // Expression dispatch
    // =========================================================================

    pub fn lower_expression(&mut self, idx: NodeIndex) -> Result<(), TranslationError> {
        let Some(node) = self.arena.get(idx) else {
            return Ok(());
        };
        trace!(kind = ?node.kind, span = %node.span, "lowering expression");
        match node.kind {
            NodeKind::Identifier => {
                if let Some(ident) = self.arena.get_identifier(idx) {
                    let text = ident.text.clone();
                    self.write(&text);
                }
                Ok(())
            }
            NodeKind::This => {
                self.write("self");
                Ok(())
            }
            NodeKind::Literal => {
                if let Some(literal) = self.arena.get_literal(idx) {
                    let value = literal.value.clone();
                    self.write_script(&value);
                }
                Ok(())
            }
            NodeKind::MemberAccess => self.lower_member_access(idx),
            NodeKind::Invocation => self.lower_invocation(idx),
            NodeKind::Unary => self.lower_unary(idx),
            NodeKind::Assignment => self.lower_assignment(idx),
            NodeKind::DefaultValue => self.lower_default_value(idx),
            NodeKind::ExpressionStatement => self.lower_statement(idx),
        }
    }

    fn lower_invocation(&mut self, idx: NodeIndex) -> Result<(), TranslationError> {
        let Some(call) = self.arena.get_invocation(idx) else {
            return Ok(());
        };
        let callee = call.callee;
        let arguments = call.arguments.clone();

        // The callee may install a deferred writer (a filled template or a
        // property setter) instead of writing itself; the argument text then
        // completes it.
        let depth = self.writer.deferred_depth();
        self.lower_expression(callee)?;
        let args_text = self.capture(|l| {
            l.with_clean_access_flags(|l| {
                for (i, &arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        l.write(", ");
                    }
                    l.lower_expression(arg)?;
                }
                Ok(())
            })
        })?;
        if self.writer.deferred_depth() > depth {
            self.complete_deferred(&args_text);
        } else {
            self.write("(");
            self.write(&args_text);
            self.write(")");
        }
        Ok(())
    }

    fn lower_unary(&mut self, idx: NodeIndex) -> Result<(), TranslationError> {
        let Some(unary) = self.arena.get_unary(idx) else {
            return Ok(());
        };
        let op = unary.op;
        let operand = unary.operand;

        // Accessor-property operands build their own read-modify-write out
        // of getter and setter calls, so they react to the unary flag
        // themselves. Fields and field-backed properties are plain lvalues
        // and take the same path as locals below.
        let accessor_operand = self
            .arena
            .get(operand)
            .is_some_and(|n| n.kind == NodeKind::MemberAccess)
            && self
                .resolver
                .resolve(operand)
                .member_view()
                .is_some_and(|v| {
                    v.member.kind == MemberKind::Property && !v.member.is_field_backed()
                });
        if accessor_operand {
            return self.with_unary(op, |l| l.lower_expression(operand));
        }

        // Plain lvalues get the direct read-modify-write.
        let text = self.capture(|l| l.with_clean_access_flags(|l| l.lower_expression(operand)))?;
        let parent = self.arena.parent_of(idx);
        let is_statement = self
            .arena
            .get(parent)
            .is_some_and(|n| n.kind == NodeKind::ExpressionStatement);
        if is_statement {
            self.write(&format!("{text} = {text} {} 1", op.operator_text()));
        } else if op.is_prefix() {
            self.write(&format!("({text} = {text} {} 1, {text})", op.operator_text()));
        } else {
            let v = self.temps.allocate();
            self.write(&format!(
                "({v} = {text}, {text} = {text} {} 1, {v})",
                op.operator_text()
            ));
            self.temps.release(&v);
        }
        Ok(())
    }

    fn lower_assignment(&mut self, idx: NodeIndex) -> Result<(), TranslationError> {
        let Some(assign) = self.arena.get_assignment(idx) else {
            return Ok(());
        };
        let op = assign.op;
        let left = assign.left;
        let right = assign.right;

        let depth = self.writer.deferred_depth();
        let lhs_text = self.capture(|l| l.with_assignment(op, |l| l.lower_expression(left)))?;
        let rhs_text =
            self.capture(|l| l.with_clean_access_flags(|l| l.lower_expression(right)))?;

        if self.writer.deferred_depth() > depth {
            // A setter or event accessor is pending; the left side produced
            // the receiver text and a deferred call around the value.
            self.write(&lhs_text);
            self.complete_deferred(&rhs_text);
        } else if op.is_compound() {
            self.write(&lhs_text);
            self.write(" = ");
            self.write(&lhs_text);
            self.write(" ");
            self.write(op.operator_text());
            self.write(" ");
            self.write(&rhs_text);
        } else {
            self.write(&lhs_text);
            self.write(" = ");
            self.write(&rhs_text);
        }
        Ok(())
    }

    // =========================================================================
    // Writer and context helpers
    // =========================================================================

    pub(crate) fn write(&mut self, text: &str) {
        self.writer.write(text);
    }

    /// Write a constant as a Lua literal.
    pub(crate) fn write_script(&mut self, value: &ConstValue) {
        let literal = value.to_lua_literal();
        self.writer.write(&literal);
    }

    /// Lower a sub-fragment into an isolated buffer and return its text.
    /// The buffer is popped on every exit path.
    pub(crate) fn capture<F>(&mut self, f: F) -> Result<String, TranslationError>
    where
        F: FnOnce(&mut Self) -> Result<(), TranslationError>,
    {
        self.writer.push_buffer();
        let result = f(self);
        let text = self.writer.pop_buffer();
        result.map(|()| text)
    }

    /// Run `f` with both access-context flags cleared, restoring them
    /// afterwards regardless of outcome.
    pub(crate) fn with_clean_access_flags<T, F>(&mut self, f: F) -> Result<T, TranslationError>
    where
        F: FnOnce(&mut Self) -> Result<T, TranslationError>,
    {
        let saved = (self.assignment.take(), self.unary.take());
        let result = f(self);
        (self.assignment, self.unary) = saved;
        result
    }

    pub(crate) fn with_assignment<T, F>(
        &mut self,
        op: AssignmentOp,
        f: F,
    ) -> Result<T, TranslationError>
    where
        F: FnOnce(&mut Self) -> Result<T, TranslationError>,
    {
        let saved = self.assignment.replace(op);
        let result = f(self);
        self.assignment = saved;
        result
    }

    pub(crate) fn with_unary<T, F>(&mut self, op: UnaryOp, f: F) -> Result<T, TranslationError>
    where
        F: FnOnce(&mut Self) -> Result<T, TranslationError>,
    {
        let saved = self.unary.replace(op);
        let result = f(self);
        self.unary = saved;
        result
    }

    pub(crate) fn assignment(&self) -> Option<AssignmentOp> {
        self.assignment
    }

    pub(crate) fn unary(&self) -> Option<UnaryOp> {
        self.unary
    }

    pub(crate) fn is_local_in_scope(&self, name: &str) -> bool {
        self.locals.contains(name)
    }

    /// Derive a name not currently taken by a local, for shadow aliasing.
    pub(crate) fn unique_local_name(&self, base: &str) -> String {
        let mut n = 1usize;
        loop {
            let candidate = format!("{base}_{n}");
            if !self.locals.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub(crate) fn record_alias(&mut self, alias: String, original: String) {
        self.aliases.push(AliasDecl { alias, original });
    }

    /// Pop the innermost deferred write and complete it with `fill`.
    pub(crate) fn complete_deferred(&mut self, fill: &str) -> bool {
        let Some(deferred) = self.writer.pop_deferred() else {
            return false;
        };
        self.write(&deferred.prefix);
        if deferred.has_hole {
            self.write(fill);
        }
        self.write(&deferred.suffix);
        for temp in &deferred.release_temps {
            self.temps.release(temp);
        }
        true
    }

    /// Parsed inline template of a member, cached per member.
    pub(crate) fn template_for(&mut self, member: &MemberSymbol) -> Option<Rc<InlineTemplate>> {
        let text = member.inline_template.as_deref()?;
        if let Some(cached) = self.templates.get(&member.full_name) {
            return Some(Rc::clone(cached));
        }
        let parsed = Rc::new(InlineTemplate::parse(text));
        self.templates
            .insert(member.full_name.clone(), Rc::clone(&parsed));
        Some(parsed)
    }
}
