//! Translation error types.
//!
//! Lowering distinguishes fatal conditions, which abort generation for the
//! current translation unit, from conditions the engine resolves locally by
//! policy (unresolved-member fallback, value-type defensive copies). Only the
//! fatal conditions are represented as error values; the rest never escape
//! the engine.

use crate::span::Span;
use serde::Serialize;
use std::fmt;

/// The kind of a fatal translation error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TranslationErrorKind {
    /// A templated method was referenced as a value instead of being invoked.
    InvalidTemplateUsage,
    /// A static-method template does not begin with a callable name, so a
    /// bare reference to it cannot be formed.
    MalformedTemplate,
}

impl TranslationErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            TranslationErrorKind::InvalidTemplateUsage => "invalid template usage",
            TranslationErrorKind::MalformedTemplate => "malformed template",
        }
    }
}

/// A fatal error raised during lowering.
///
/// Carries the offending member's fully-qualified name and source location so
/// the translation-unit driver can report it before dropping the unit's
/// output. No retry is useful: the condition is a static property of the
/// source.
#[derive(Clone, Debug, Serialize)]
pub struct TranslationError {
    pub kind: TranslationErrorKind,
    /// Fully-qualified name of the member the error is about.
    pub member: String,
    pub span: Span,
}

impl TranslationError {
    pub fn new(kind: TranslationErrorKind, member: impl Into<String>, span: Span) -> Self {
        TranslationError {
            kind,
            member: member.into(),
            span,
        }
    }

    pub fn invalid_template_usage(member: impl Into<String>, span: Span) -> Self {
        TranslationError::new(TranslationErrorKind::InvalidTemplateUsage, member, span)
    }

    pub fn malformed_template(member: impl Into<String>, span: Span) -> Self {
        TranslationError::new(TranslationErrorKind::MalformedTemplate, member, span)
    }
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TranslationErrorKind::InvalidTemplateUsage => write!(
                f,
                "the templated method ({}) cannot be used like a reference at {}",
                self.member, self.span
            ),
            TranslationErrorKind::MalformedTemplate => write!(
                f,
                "the template of ({}) has no leading callable name at {}",
                self.member, self.span
            ),
        }
    }
}

impl std::error::Error for TranslationError {}
