//! Common types and utilities for the lunet C#-to-Lua translator.
//!
//! This crate provides foundational types used across all lunet crates:
//! - Source spans (`Span`)
//! - Translation error types (`TranslationError`, `TranslationErrorKind`)
//! - Tracing subscriber setup for debugging lowering decisions

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Translation error taxonomy
pub mod diagnostics;
pub use diagnostics::{TranslationError, TranslationErrorKind};

// Opt-in tracing subscriber configuration
pub mod tracing_config;
pub use tracing_config::init_tracing;
