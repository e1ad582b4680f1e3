//! Member-access lowering for the Lua backend.
//!
//! This crate turns resolved member-access expressions — field reads,
//! property accesses, method references, enum literals, event subscriptions —
//! into Lua text that preserves the source language's evaluation-order and
//! accessor semantics. Semantic resolution and overload naming are supplied
//! by the caller through the [`resolution::SemanticResolver`] and
//! [`resolution::OverloadNameResolver`] traits; this crate is the pure
//! lowering stage in between.

pub mod ast;
pub mod config;
pub mod identifiers;
pub mod lowering;
pub mod resolution;
pub mod template;
pub mod temp;
pub mod writer;

pub use ast::{AssignmentOp, ExprArena, NodeIndex, NodeKind, UnaryOp};
pub use config::{EmitConfig, EnumEmitConfig, EnumEmitMode};
pub use lowering::{AliasDecl, Lowerer};
pub use resolution::{
    AccessorRole, ConstValue, InvocationResolution, MemberFlags, MemberKind, MemberResolution,
    MemberSymbol, OverloadNameResolver, ResolutionResult, SemanticResolver, TypeFlags, TypeRef,
};
pub use template::InlineTemplate;
