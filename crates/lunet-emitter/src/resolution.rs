//! Semantic resolution results and member symbols.
//!
//! The semantic resolver is an external collaborator: a pure, deterministic
//! function from an AST node to a [`ResolutionResult`]. The lowering engine
//! consumes its output and never mutates it.
//!
//! The result is a closed tagged variant rather than an open class
//! hierarchy, so the compiler rejects an incomplete case list.

use crate::ast::NodeIndex;
use bitflags::bitflags;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Constant values
// =============================================================================

/// A value known at translation time (literal, const field, enum member).
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConstValue {
    /// Render the value as a Lua literal.
    pub fn to_lua_literal(&self) -> String {
        match self {
            ConstValue::Nil => "nil".to_string(),
            ConstValue::Bool(b) => b.to_string(),
            ConstValue::Int(i) => i.to_string(),
            ConstValue::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{f:.1}")
                } else {
                    format!("{f}")
                }
            }
            ConstValue::Str(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for ch in s.chars() {
                    match ch {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\t' => out.push_str("\\t"),
                        _ => out.push(ch),
                    }
                }
                out.push('"');
                out
            }
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lua_literal())
    }
}

// =============================================================================
// Type references
// =============================================================================

bitflags! {
    /// Classification flags of a resolved type.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct TypeFlags: u16 {
        /// Reference type (classes, interfaces, delegates, strings).
        const REFERENCE = 1 << 0;
        /// The dynamic type; member names are preserved verbatim.
        const DYNAMIC = 1 << 1;
        /// An enum definition.
        const ENUM = 1 << 2;
        /// `Nullable<T>`; arithmetic routes through the lifting helper.
        const NULLABLE = 1 << 3;
        /// Externally boxed numeric (e.g. decimal); arithmetic uses methods.
        const LIFTED_NUMERIC = 1 << 4;
        /// Mutable value type; reads through aliasing paths are copied.
        const MUTABLE_VALUE = 1 << 5;
    }
}

/// A resolved type together with its lowered Lua name.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeRef {
    /// The type's emitted Lua identifier (already lowered).
    pub name: String,
    pub flags: TypeFlags,
}

impl TypeRef {
    pub fn new(name: impl Into<String>, flags: TypeFlags) -> Self {
        TypeRef {
            name: name.into(),
            flags,
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        TypeRef::new(name, TypeFlags::REFERENCE)
    }

    pub fn value(name: impl Into<String>) -> Self {
        TypeRef::new(name, TypeFlags::empty())
    }

    pub fn is_reference(&self) -> bool {
        self.flags.contains(TypeFlags::REFERENCE)
    }

    pub fn is_dynamic(&self) -> bool {
        self.flags.contains(TypeFlags::DYNAMIC)
    }

    pub fn is_enum(&self) -> bool {
        self.flags.contains(TypeFlags::ENUM)
    }
}

// =============================================================================
// Member symbols
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Event,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct MemberFlags: u16 {
        const STATIC = 1 << 0;
        const VIRTUAL_OR_OVERRIDE = 1 << 1;
        const EXTENSION_METHOD = 1 << 2;
        /// Consts and enum literals; foldable into emitted code.
        const COMPILE_TIME_CONST = 1 << 3;
        /// Auto-property emitted as a plain field, no accessor calls.
        const FIELD_BACKED = 1 << 4;
        /// Declared on the class currently being lowered.
        const INTERNAL = 1 << 5;
    }
}

/// A resolved member of a type.
#[derive(Clone, Debug)]
pub struct MemberSymbol {
    /// Source-language name.
    pub name: String,
    /// Fully-qualified name, used in error reports.
    pub full_name: String,
    pub kind: MemberKind,
    pub flags: MemberFlags,
    pub declaring_type: TypeRef,
    /// The member's value type (field/property type, method return type).
    pub value_type: TypeRef,
    /// Inline emission template, if the member is configured with one.
    pub inline_template: Option<String>,
    /// The folded value for compile-time constants.
    pub constant_value: Option<ConstValue>,
}

impl MemberSymbol {
    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    pub fn is_extension_method(&self) -> bool {
        self.flags.contains(MemberFlags::EXTENSION_METHOD)
    }

    pub fn is_const(&self) -> bool {
        self.flags.contains(MemberFlags::COMPILE_TIME_CONST)
    }

    pub fn is_field_backed(&self) -> bool {
        self.flags.contains(MemberFlags::FIELD_BACKED)
    }
}

// =============================================================================
// Resolution results
// =============================================================================

/// Resolution of a member access against its target.
#[derive(Clone, Debug)]
pub struct MemberResolution {
    pub member: Arc<MemberSymbol>,
    /// Resolution of the target sub-expression.
    pub target: Box<ResolutionResult>,
    pub is_compile_time_constant: bool,
}

/// Resolution of an invocation whose callee is a member access.
#[derive(Clone, Debug)]
pub struct InvocationResolution {
    pub member: Arc<MemberSymbol>,
    pub target: Box<ResolutionResult>,
    /// True when a delegate-typed value is being invoked rather than a method.
    pub is_delegate_invocation: bool,
}

/// What the semantic resolver knows about a node.
#[derive(Clone, Debug)]
pub enum ResolutionResult {
    /// The resolver produced no usable information.
    Error,
    /// A compile-time constant expression.
    Constant(ConstValue),
    /// A bare type reference.
    TypeRef(TypeRef),
    /// A member access.
    Member(MemberResolution),
    /// An unapplied method group (overload set).
    MethodGroup(Vec<Arc<MemberSymbol>>),
    /// An invocation of a member.
    Invocation(InvocationResolution),
    /// The dynamic type; names pass through verbatim.
    Dynamic,
    /// The `this` reference.
    This,
    /// A local variable or parameter.
    Local,
}

impl ResolutionResult {
    /// Member-shaped view over `Member` and `Invocation` results.
    pub fn member_view(&self) -> Option<MemberView<'_>> {
        match self {
            ResolutionResult::Member(m) => Some(MemberView {
                member: &m.member,
                target: &m.target,
                is_compile_time_constant: m.is_compile_time_constant,
            }),
            ResolutionResult::Invocation(inv) => Some(MemberView {
                member: &inv.member,
                target: &inv.target,
                is_compile_time_constant: false,
            }),
            _ => None,
        }
    }

    pub fn is_invocation(&self) -> bool {
        matches!(self, ResolutionResult::Invocation(_))
    }

    /// Whether a target with this resolution is free of side effects when
    /// re-evaluated: `this`, a type reference, a local, or a field reached
    /// through `this` or a local.
    pub fn is_side_effect_free_target(&self) -> bool {
        match self {
            ResolutionResult::This
            | ResolutionResult::TypeRef(_)
            | ResolutionResult::Local => true,
            ResolutionResult::Member(m) => {
                m.member.kind == MemberKind::Field
                    && matches!(
                        m.target.as_ref(),
                        ResolutionResult::This | ResolutionResult::Local
                    )
            }
            _ => false,
        }
    }
}

/// Borrowed member-shaped view of a resolution.
pub struct MemberView<'a> {
    pub member: &'a Arc<MemberSymbol>,
    pub target: &'a ResolutionResult,
    pub is_compile_time_constant: bool,
}

// =============================================================================
// External collaborators
// =============================================================================

/// The semantic resolver. Pure and deterministic; assumed correct.
pub trait SemanticResolver {
    fn resolve(&self, node: NodeIndex) -> ResolutionResult;
}

/// Which synthesized accessor of a member is being named.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessorRole {
    Getter,
    Setter,
    Add,
    Remove,
}

impl AccessorRole {
    fn prefix(self) -> &'static str {
        match self {
            AccessorRole::Getter => "get",
            AccessorRole::Setter => "set",
            AccessorRole::Add => "add",
            AccessorRole::Remove => "remove",
        }
    }
}

/// Maps member symbols to their unique emitted names, stable for the whole
/// compilation unit.
pub trait OverloadNameResolver {
    fn overload_name(&self, member: &MemberSymbol) -> String;

    /// Emitted name of a property/event accessor. The default prefixes the
    /// overload name, which matches the runtime's accessor naming scheme.
    fn accessor_name(&self, member: &MemberSymbol, role: AccessorRole) -> String {
        format!("{}{}", role.prefix(), self.overload_name(member))
    }
}
