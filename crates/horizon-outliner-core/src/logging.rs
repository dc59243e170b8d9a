//! Logging and debugging facilities for Horizon Outliner.
//!
//! This module provides:
//! - Target and span names for filtering the outliner's `tracing` output
//! - Performance tracing hooks for profiling rebuilds and fetches
//! - Formatting options shared by the text dumps of realized item trees
//!
//! # Tracing Integration
//!
//! Horizon Outliner uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_outliner::fetch=debug")
//!     .init();
//! ```

/// Span names used throughout Horizon Outliner for tracing.
pub mod span_names {
    /// Incremental realization of children.
    pub const FETCH: &str = "horizon_outliner::fetch";
    /// Filter proxy re-evaluation.
    pub const FILTER: &str = "horizon_outliner::filter";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_outliner_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_outliner_core::signal";
    /// Lazy child realization (fetch strategies, item tree).
    pub const FETCH: &str = "horizon_outliner::fetch";
    /// Item construction and variant dispatch.
    pub const FACTORY: &str = "horizon_outliner::factory";
    /// Tree model protocol (indexing, edits, rebuilds).
    pub const MODEL: &str = "horizon_outliner::model";
    /// Filter proxy model.
    pub const FILTER: &str = "horizon_outliner::filter";
    /// Configuration loading.
    pub const CONFIG: &str = "horizon_outliner::config";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact dash-prefixed representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show type labels.
    pub show_types: bool,
    /// Whether to show per-dimension fetch counters.
    pub show_counters: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_types: true,
            show_counters: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_counters: true,
            ..Default::default()
        }
    }

    /// Options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_types: false,
            show_counters: false,
            ..Default::default()
        }
    }

    /// Builds the line prefix for a node at `depth`.
    ///
    /// `ancestors_last[i]` tells whether the ancestor at depth `i + 1` was the
    /// last of its siblings, which decides whether a vertical rule continues
    /// through that column.
    pub fn prefix(&self, ancestors_last: &[bool], is_last: bool) -> String {
        let (branch, tee, corner) = match self.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for &last in ancestors_last {
            if last || branch.is_empty() {
                prefix.push(' ');
            } else {
                prefix.push_str(branch);
            }
            for _ in 0..self.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_outliner::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
