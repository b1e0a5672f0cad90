//! Logging for the `liskov` binary.
//!
//! Nothing is installed unless `LISKOV_LOG` (or, failing that, `RUST_LOG`)
//! is set. The value is either an `EnvFilter` directive list or one of the
//! presets below, which name the targets this workspace actually emits on:
//!
//! | Preset | Expands to | Shows |
//! |---|---|---|
//! | `verdicts` | `liskov_solver::substitution=debug` | every recorded verdict |
//! | `solver` | `liskov_solver=trace` | cache hits, cycle assumptions, instantiation |
//! | `queries` | `liskov::query_json=trace` | one start/end record per query |
//! | `cli` | `liskov::cli=info` | file loading and run summaries |
//!
//! Presets combine with commas (`verdicts,cli`) and mix with raw directives.
//! `LISKOV_LOG_FORMAT` picks `text` (default), `tree` (`tracing-tree`) or
//! `json`. Everything is written to stderr so reports on stdout stay clean:
//!
//! ```bash
//! LISKOV_LOG=verdicts liskov run -u demos/collections.json
//! LISKOV_LOG=solver LISKOV_LOG_FORMAT=tree liskov check -u demos/collections.json 'List<Dog>' 'ICollection<>'
//! LISKOV_LOG=queries LISKOV_LOG_FORMAT=json LISKOV_QUERY_RUN_ID=ci-42 liskov run -u demos/collections.json
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

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
    /// Parse from the `LISKOV_LOG_FORMAT` environment variable.
    fn from_env() -> Self {
        Self::parse(&std::env::var("LISKOV_LOG_FORMAT").unwrap_or_default())
    }

    /// Unrecognised values fall back to [`LogFormat::Text`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Expand preset names in a comma-separated directive list.
///
/// Unknown entries pass through untouched, so plain `RUST_LOG` syntax
/// (`debug`, `liskov_solver::universe=trace`) keeps working.
pub fn expand_directives(value: &str) -> String {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry {
            "verdicts" => "liskov_solver::substitution=debug",
            "solver" => "liskov_solver=trace",
            "queries" => "liskov::query_json=trace",
            "cli" => "liskov::cli=info",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// The directives to install: `LISKOV_LOG` wins over `RUST_LOG`, and
/// neither being set leaves tracing off.
pub fn select_directives(liskov_log: Option<&str>, rust_log: Option<&str>) -> Option<String> {
    liskov_log
        .map(expand_directives)
        .or_else(|| rust_log.map(str::to_string))
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `LISKOV_LOG` nor `RUST_LOG` is set.
pub fn init_tracing() {
    let liskov_log = std::env::var("LISKOV_LOG").ok();
    let rust_log = std::env::var("RUST_LOG").ok();
    let Some(directives) = select_directives(liskov_log.as_deref(), rust_log.as_deref()) else {
        return;
    };

    let filter = EnvFilter::builder().parse_lossy(directives);
    let format = LogFormat::from_env();

    match format {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
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
}

#[cfg(test)]
#[path = "tests/tracing_config_tests.rs"]
mod tests;
