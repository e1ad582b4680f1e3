//! Identifier casing conversions used by enum string modes and the
//! unresolved-member fallback.

/// Lower the first alphabetic character: `Count` -> `count`.
///
/// Already-lowered and non-alphabetic leading characters pass through
/// unchanged.
pub fn to_lower_camel_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let mut out = String::with_capacity(name.len());
            out.extend(first.to_lowercase());
            out.push_str(chars.as_str());
            out
        }
        _ => name.to_string(),
    }
}

pub fn to_lowercase(name: &str) -> String {
    name.to_lowercase()
}

pub fn to_uppercase(name: &str) -> String {
    name.to_uppercase()
}

/// Whether `text` is usable as a bare Lua identifier segment.
pub fn is_valid_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
