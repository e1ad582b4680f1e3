//! Tracing configuration for debugging lowering output.
//!
//! Supports three output formats controlled by `LUNET_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree` — easy to read
//!   when following a recursive lowering
//! - `json`: One JSON object per span/event — machine-readable
//!
//! ## Quick start
//!
//! ```bash
//! # Human-readable tree (recommended for debugging emitted Lua)
//! LUNET_LOG=debug LUNET_LOG_FORMAT=tree lunet file.cs
//!
//! # Fine-grained filtering
//! LUNET_LOG="lunet_emitter=trace" lunet file.cs
//! ```
//!
//! The subscriber is only initialised when `LUNET_LOG` (or `RUST_LOG`) is
//! set, so there is zero overhead in normal builds.

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

static INIT: OnceCell<()> = OnceCell::new();

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse from the `LUNET_LOG_FORMAT` environment variable.
    fn from_env() -> Self {
        match std::env::var("LUNET_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Build an `EnvFilter` from `LUNET_LOG`, falling back to `RUST_LOG`.
///
/// `LUNET_LOG` takes precedence when both are set. Values use the same
/// syntax as `RUST_LOG` (e.g. `debug`, `lunet_emitter=trace`).
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("LUNET_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        // RUST_LOG is set (caller already checked).  Use it as-is.
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `LUNET_LOG` nor `RUST_LOG` is set, keeping
/// startup cost at zero for normal usage. Safe to call more than once.
///
/// All output goes to stderr so it never interferes with the emitted Lua on
/// stdout.
pub fn init_tracing() {
    INIT.get_or_init(|| {
        // Only pay for tracing when explicitly requested.
        let has_lunet_log = std::env::var("LUNET_LOG").is_ok();
        let has_rust_log = std::env::var("RUST_LOG").is_ok();
        if !has_lunet_log && !has_rust_log {
            return;
        }

        let filter = build_filter();
        let format = LogFormat::from_env();

        match format {
            LogFormat::Tree => {
                let tree_layer = tracing_tree::HierarchicalLayer::default()
                    .with_indent_amount(2)
                    .with_indent_lines(true)
                    .with_deferred_spans(true)
                    .with_span_retrace(true)
                    .with_targets(true);

                Registry::default().with(filter).with(tree_layer).init();
            }
            LogFormat::Json => {
                let json_layer = fmt::layer().json().with_writer(std::io::stderr);

                Registry::default().with(filter).with(json_layer).init();
            }
            LogFormat::Text => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
    });
}
