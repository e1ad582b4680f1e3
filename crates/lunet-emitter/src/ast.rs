//! Arena-allocated expression nodes.
//!
//! Nodes are addressed by `NodeIndex` and carry a parent link so the lowering
//! engine can ask structural questions (is this node the callee of an
//! enclosing invocation? is this increment a standalone statement?) without
//! walking the tree from the root.

use crate::resolution::{ConstValue, TypeRef};
use lunet_common::Span;

/// Index of a node inside an [`ExprArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    pub fn is_none(self) -> bool {
        self == NodeIndex::NONE
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Identifier,
    This,
    Literal,
    MemberAccess,
    Invocation,
    Unary,
    Assignment,
    ExpressionStatement,
    DefaultValue,
}

/// Prefix/postfix increment and decrement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    PreIncrement,
    PostIncrement,
    PreDecrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn is_increment(self) -> bool {
        matches!(self, UnaryOp::PreIncrement | UnaryOp::PostIncrement)
    }

    pub fn is_prefix(self) -> bool {
        matches!(self, UnaryOp::PreIncrement | UnaryOp::PreDecrement)
    }

    /// Name of the runtime lifting operation for this operator.
    pub fn lift_name(self) -> &'static str {
        if self.is_increment() { "inc" } else { "dec" }
    }

    /// The Lua arithmetic operator applied to the read value.
    pub fn operator_text(self) -> &'static str {
        if self.is_increment() { "+" } else { "-" }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentOp {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
}

impl AssignmentOp {
    pub fn is_compound(self) -> bool {
        self != AssignmentOp::Assign
    }

    /// The Lua binary operator this compound assignment combines with.
    pub fn operator_text(self) -> &'static str {
        match self {
            AssignmentOp::Assign => "=",
            AssignmentOp::Add => "+",
            AssignmentOp::Subtract => "-",
            AssignmentOp::Multiply => "*",
            AssignmentOp::Divide => "/",
            AssignmentOp::Modulo => "%",
            AssignmentOp::BitAnd => "&",
            AssignmentOp::BitOr => "|",
            AssignmentOp::BitXor => "~",
            AssignmentOp::ShiftLeft => "<<",
            AssignmentOp::ShiftRight => ">>",
        }
    }
}

#[derive(Clone, Debug)]
pub struct IdentifierData {
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct LiteralData {
    pub value: ConstValue,
}

#[derive(Clone, Debug)]
pub struct MemberAccessData {
    pub target: NodeIndex,
    pub member_name: String,
}

#[derive(Clone, Debug)]
pub struct InvocationData {
    pub callee: NodeIndex,
    pub arguments: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct UnaryData {
    pub op: UnaryOp,
    pub operand: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct AssignmentData {
    pub op: AssignmentOp,
    pub left: NodeIndex,
    pub right: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct DefaultValueData {
    pub ty: TypeRef,
}

#[derive(Clone, Debug)]
pub struct ExpressionStatementData {
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
enum NodeData {
    Identifier(IdentifierData),
    This,
    Literal(LiteralData),
    MemberAccess(MemberAccessData),
    Invocation(InvocationData),
    Unary(UnaryData),
    Assignment(AssignmentData),
    ExpressionStatement(ExpressionStatementData),
    DefaultValue(DefaultValueData),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: NodeIndex,
    data: NodeData,
}

/// Flat arena of expression nodes.
#[derive(Default)]
pub struct ExprArena {
    nodes: Vec<Node>,
}

impl ExprArena {
    pub fn new() -> Self {
        ExprArena { nodes: Vec::new() }
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get(idx.0 as usize)
    }

    pub fn parent_of(&self, idx: NodeIndex) -> NodeIndex {
        self.get(idx).map_or(NodeIndex::NONE, |n| n.parent)
    }

    fn push(&mut self, kind: NodeKind, span: Span, data: NodeData) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            parent: NodeIndex::NONE,
            data,
        });
        idx
    }

    fn set_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        if let Some(node) = self.nodes.get_mut(child.0 as usize) {
            node.parent = parent;
        }
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn push_identifier(&mut self, span: Span, text: impl Into<String>) -> NodeIndex {
        self.push(
            NodeKind::Identifier,
            span,
            NodeData::Identifier(IdentifierData { text: text.into() }),
        )
    }

    pub fn push_this(&mut self, span: Span) -> NodeIndex {
        self.push(NodeKind::This, span, NodeData::This)
    }

    pub fn push_literal(&mut self, span: Span, value: ConstValue) -> NodeIndex {
        self.push(NodeKind::Literal, span, NodeData::Literal(LiteralData { value }))
    }

    pub fn push_member_access(
        &mut self,
        span: Span,
        target: NodeIndex,
        member_name: impl Into<String>,
    ) -> NodeIndex {
        let idx = self.push(
            NodeKind::MemberAccess,
            span,
            NodeData::MemberAccess(MemberAccessData {
                target,
                member_name: member_name.into(),
            }),
        );
        self.set_parent(target, idx);
        idx
    }

    pub fn push_invocation(
        &mut self,
        span: Span,
        callee: NodeIndex,
        arguments: Vec<NodeIndex>,
    ) -> NodeIndex {
        let args = arguments.clone();
        let idx = self.push(
            NodeKind::Invocation,
            span,
            NodeData::Invocation(InvocationData { callee, arguments }),
        );
        self.set_parent(callee, idx);
        for arg in args {
            self.set_parent(arg, idx);
        }
        idx
    }

    pub fn push_unary(&mut self, span: Span, op: UnaryOp, operand: NodeIndex) -> NodeIndex {
        let idx = self.push(NodeKind::Unary, span, NodeData::Unary(UnaryData { op, operand }));
        self.set_parent(operand, idx);
        idx
    }

    pub fn push_assignment(
        &mut self,
        span: Span,
        op: AssignmentOp,
        left: NodeIndex,
        right: NodeIndex,
    ) -> NodeIndex {
        let idx = self.push(
            NodeKind::Assignment,
            span,
            NodeData::Assignment(AssignmentData { op, left, right }),
        );
        self.set_parent(left, idx);
        self.set_parent(right, idx);
        idx
    }

    pub fn push_expression_statement(&mut self, span: Span, expression: NodeIndex) -> NodeIndex {
        let idx = self.push(
            NodeKind::ExpressionStatement,
            span,
            NodeData::ExpressionStatement(ExpressionStatementData { expression }),
        );
        self.set_parent(expression, idx);
        idx
    }

    pub fn push_default_value(&mut self, span: Span, ty: TypeRef) -> NodeIndex {
        self.push(
            NodeKind::DefaultValue,
            span,
            NodeData::DefaultValue(DefaultValueData { ty }),
        )
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================

    pub fn get_identifier(&self, idx: NodeIndex) -> Option<&IdentifierData> {
        match &self.get(idx)?.data {
            NodeData::Identifier(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_literal(&self, idx: NodeIndex) -> Option<&LiteralData> {
        match &self.get(idx)?.data {
            NodeData::Literal(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_member_access(&self, idx: NodeIndex) -> Option<&MemberAccessData> {
        match &self.get(idx)?.data {
            NodeData::MemberAccess(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_invocation(&self, idx: NodeIndex) -> Option<&InvocationData> {
        match &self.get(idx)?.data {
            NodeData::Invocation(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_unary(&self, idx: NodeIndex) -> Option<&UnaryData> {
        match &self.get(idx)?.data {
            NodeData::Unary(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_assignment(&self, idx: NodeIndex) -> Option<&AssignmentData> {
        match &self.get(idx)?.data {
            NodeData::Assignment(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_expression_statement(&self, idx: NodeIndex) -> Option<&ExpressionStatementData> {
        match &self.get(idx)?.data {
            NodeData::ExpressionStatement(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_default_value(&self, idx: NodeIndex) -> Option<&DefaultValueData> {
        match &self.get(idx)?.data {
            NodeData::DefaultValue(data) => Some(data),
            _ => None,
        }
    }

    // =========================================================================
    // Structural queries
    // =========================================================================

    /// Whether `idx` is the callee of an enclosing invocation.
    pub fn is_invocation_callee(&self, idx: NodeIndex) -> bool {
        let parent = self.parent_of(idx);
        self.get_invocation(parent).is_some_and(|call| call.callee == idx)
    }

    /// Whether `idx` sits under an increment/decrement that is itself a
    /// standalone expression statement.
    pub fn is_statement_unary(&self, idx: NodeIndex) -> bool {
        let parent = self.parent_of(idx);
        if self.get_unary(parent).is_none() {
            return false;
        }
        let grandparent = self.parent_of(parent);
        self.get(grandparent)
            .is_some_and(|n| n.kind == NodeKind::ExpressionStatement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lunet_common::Span;

    #[test]
    fn test_parent_links() {
        let mut arena = ExprArena::new();
        let target = arena.push_identifier(Span::new(0, 1), "a");
        let access = arena.push_member_access(Span::new(0, 7), target, "Count");
        let call = arena.push_invocation(Span::new(0, 9), access, vec![]);

        assert_eq!(arena.parent_of(target), access);
        assert_eq!(arena.parent_of(access), call);
        assert!(arena.is_invocation_callee(access));
        assert!(!arena.is_invocation_callee(target));
    }

    #[test]
    fn test_statement_unary_detection() {
        let mut arena = ExprArena::new();
        let target = arena.push_identifier(Span::new(0, 1), "a");
        let access = arena.push_member_access(Span::new(0, 7), target, "Count");
        let unary = arena.push_unary(Span::new(0, 9), UnaryOp::PostIncrement, access);
        assert!(!arena.is_statement_unary(access));

        arena.push_expression_statement(Span::new(0, 10), unary);
        assert!(arena.is_statement_unary(access));
    }
}
