//! Structured inline templates.
//!
//! A member can carry a template string describing how an access to it is
//! spelled in Lua, e.g. `"math.abs({0})"` or `"{this}:getTicks()"`. The
//! string is parsed once into segments — literal runs, the receiver
//! placeholder `{this}`, and positional argument holes `{0}`, `{1}`, … — and
//! cached per member, so malformed placeholders surface when the template is
//! first seen instead of during every substitution.

use memchr::memchr;

pub const RECEIVER_PLACEHOLDER: &str = "this";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateSegment {
    Literal(String),
    /// `{this}` — replaced by the lowered receiver text.
    Receiver,
    /// `{N}` — replaced by positional argument text.
    Hole(usize),
}

/// A parsed inline template.
#[derive(Clone, Debug)]
pub struct InlineTemplate {
    raw: String,
    segments: Vec<TemplateSegment>,
    has_receiver: bool,
    hole_count: usize,
}

/// A template with the receiver substituted, split around its first argument
/// hole. When `has_hole` is false the whole expansion lives in `prefix`.
#[derive(Clone, Debug)]
pub struct TemplateExpansion {
    pub prefix: String,
    pub suffix: String,
    pub has_hole: bool,
}

impl TemplateExpansion {
    pub fn into_text(self) -> String {
        let mut text = self.prefix;
        text.push_str(&self.suffix);
        text
    }
}

impl InlineTemplate {
    pub fn parse(text: &str) -> InlineTemplate {
        let mut segments = Vec::new();
        let mut has_receiver = false;
        let mut hole_count = 0;
        let mut literal = String::new();
        let mut rest = text;

        while !rest.is_empty() {
            let Some(open) = memchr(b'{', rest.as_bytes()) else {
                literal.push_str(rest);
                break;
            };
            literal.push_str(&rest[..open]);
            rest = &rest[open..];

            let close = memchr(b'}', rest.as_bytes());
            let Some(close) = close else {
                // Unterminated brace: keep it literal.
                literal.push_str(rest);
                break;
            };
            let inner = &rest[1..close];
            if inner == RECEIVER_PLACEHOLDER {
                flush_literal(&mut segments, &mut literal);
                segments.push(TemplateSegment::Receiver);
                has_receiver = true;
            } else if let Ok(index) = inner.parse::<usize>() {
                flush_literal(&mut segments, &mut literal);
                segments.push(TemplateSegment::Hole(index));
                hole_count += 1;
            } else {
                // Unknown placeholder: keep the braces literally.
                literal.push_str(&rest[..=close]);
            }
            rest = &rest[close + 1..];
        }
        flush_literal(&mut segments, &mut literal);

        InlineTemplate {
            raw: text.to_string(),
            segments,
            has_receiver,
            hole_count,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn has_receiver(&self) -> bool {
        self.has_receiver
    }

    pub fn hole_count(&self) -> usize {
        self.hole_count
    }

    /// The leading callable name of an invocation-shaped template:
    /// `"math.abs({0})"` yields `math.abs`. A template that does not begin
    /// `name(...)` with a non-empty argument region has no prefix, which
    /// makes a bare reference to the templated method unexpressible.
    pub fn callable_prefix(&self) -> Option<&str> {
        let bytes = self.raw.as_bytes();
        let open = memchr(b'(', bytes)?;
        let name = &self.raw[..open];
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.')
        {
            return None;
        }
        // The parenthesized region must hold something beyond whitespace.
        let after = self.raw[open + 1..].trim_start();
        let close = after.rfind(')')?;
        if after[..close].trim().is_empty() {
            return None;
        }
        Some(name)
    }

    /// Substitute the receiver and split the result around the first argument
    /// hole so the remainder can be completed later by invocation lowering.
    pub fn expand(&self, receiver: Option<&str>) -> TemplateExpansion {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut seen_hole = false;
        for segment in &self.segments {
            let out = if seen_hole { &mut suffix } else { &mut prefix };
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Receiver => out.push_str(receiver.unwrap_or_default()),
                TemplateSegment::Hole(_) => {
                    if !seen_hole {
                        seen_hole = true;
                    }
                    // Exactly one hole remains for invocation-shaped
                    // templates; any further holes are dropped here and
                    // filled by the positional path instead.
                }
            }
        }
        TemplateExpansion {
            prefix,
            suffix,
            has_hole: seen_hole,
        }
    }

    /// Fill every placeholder at once: receiver plus positional arguments.
    /// Missing argument positions render as empty text.
    pub fn fill_positional(&self, receiver: Option<&str>, args: &[&str]) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Receiver => out.push_str(receiver.unwrap_or_default()),
                TemplateSegment::Hole(index) => {
                    if let Some(arg) = args.get(*index) {
                        out.push_str(arg);
                    }
                }
            }
        }
        out
    }
}

fn flush_literal(segments: &mut Vec<TemplateSegment>, literal: &mut String) {
    if !literal.is_empty() {
        segments.push(TemplateSegment::Literal(std::mem::take(literal)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let tpl = InlineTemplate::parse("{this}:getTicks({0})");
        assert!(tpl.has_receiver());
        assert_eq!(tpl.hole_count(), 1);
        assert_eq!(
            tpl.expand(Some("obj")).prefix,
            "obj:getTicks(".to_string()
        );
    }

    #[test]
    fn test_expand_without_hole() {
        let tpl = InlineTemplate::parse("{this}.length");
        let expansion = tpl.expand(Some("s"));
        assert!(!expansion.has_hole);
        assert_eq!(expansion.into_text(), "s.length");
    }

    #[test]
    fn test_callable_prefix() {
        let tpl = InlineTemplate::parse("math.abs({0})");
        assert_eq!(tpl.callable_prefix(), Some("math.abs"));
    }

    #[test]
    fn test_callable_prefix_rejects_empty_arguments() {
        assert_eq!(InlineTemplate::parse("math.huge()").callable_prefix(), None);
        assert_eq!(InlineTemplate::parse("{0} + 1").callable_prefix(), None);
    }

    #[test]
    fn test_unknown_placeholder_stays_literal() {
        let tpl = InlineTemplate::parse("bit.band({left}, 1)");
        let text = tpl.expand(None).into_text();
        assert_eq!(text, "bit.band({left}, 1)");
    }

    #[test]
    fn test_fill_positional() {
        let tpl = InlineTemplate::parse("string.format({0}, {1})");
        assert_eq!(
            tpl.fill_positional(None, &["\"%d\"", "x"]),
            "string.format(\"%d\", x)"
        );
    }
}
