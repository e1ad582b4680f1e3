//! Emission configuration.
//!
//! The engine consults no ambient state: enum emission modes, member
//! renames, and runtime helper names all live in a read-only `EmitConfig`
//! handed to the engine at construction.

use crate::resolution::TypeRef;
use rustc_hash::FxHashMap;
use serde::Deserialize;

/// How the literals of one enum type are emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnumEmitMode {
    /// Normal member access; the runtime holds the numeric values.
    #[default]
    Passthrough,
    /// Fold the underlying numeric constant into the output.
    Numeric,
    /// Fold the member name as a string, verbatim.
    Verbatim,
    /// Fold the member name as a lower-camel-case string.
    LowerCamel,
    /// Fold the member name as an all-lowercase string.
    Lowercase,
    /// Fold the member name as an all-uppercase string.
    Uppercase,
}

/// Per-enum emission modes plus per-member rename overrides.
///
/// Both lookups are table-driven; a rename wins over the mode's casing.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EnumEmitConfig {
    /// Enum type name (lowered) -> emission mode.
    pub modes: FxHashMap<String, EnumEmitMode>,
    /// Member fully-qualified name -> emitted name, verbatim.
    pub renames: FxHashMap<String, String>,
}

impl EnumEmitConfig {
    pub fn mode_for(&self, enum_type: &TypeRef) -> EnumEmitMode {
        self.modes.get(&enum_type.name).copied().unwrap_or_default()
    }

    pub fn rename_for(&self, member_full_name: &str) -> Option<&str> {
        self.renames.get(member_full_name).map(|s| s.as_str())
    }
}

/// Read-only configuration for the lowering engine.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    /// Name of the runtime support table.
    pub root: String,
    /// Runtime helper binding an instance method to its receiver.
    pub delegate_bind: String,
    /// Scope-bound bind variant used for extension methods.
    pub delegate_bind_scope: String,
    /// Runtime helper lifting unary arithmetic over nullable values.
    pub lift_one: String,
    /// Runtime helper copying a mutable value type on read.
    pub value_copy: String,
    /// Invocation appended to a type name to produce its default value.
    pub default_invoke: String,
    /// Whether mutable value types get defensive copies on aliasing reads.
    pub copy_value_types: bool,
    pub enums: EnumEmitConfig,
}

impl Default for EmitConfig {
    fn default() -> Self {
        EmitConfig {
            root: "System".to_string(),
            delegate_bind: "fn.bind".to_string(),
            delegate_bind_scope: "fn.bindScope".to_string(),
            lift_one: "Nullable.lift1".to_string(),
            value_copy: "clone".to_string(),
            default_invoke: "default()".to_string(),
            copy_value_types: true,
            enums: EnumEmitConfig::default(),
        }
    }
}

impl EmitConfig {
    /// Load a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
