//! Logging facilities for Horizon DataView.
//!
//! Horizon DataView uses the `tracing` crate for instrumentation. Nothing is
//! printed unless the embedding application installs a subscriber:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! tracing_subscriber::fmt()
//!     .with_env_filter(EnvFilter::new("horizon_dataview::sort=debug"))
//!     .init();
//! ```
//!
//! Every subsystem logs under one of the [`targets`] so that column
//! bookkeeping, sorting and width recomputation can be filtered separately.

/// Span names used throughout Horizon DataView for tracing.
pub mod span_names {
    /// Deferred best-width recomputation (idle flush).
    pub const WIDTH_FLUSH: &str = "horizon_dataview::width_flush";
    /// Restoring a saved column layout.
    pub const LAYOUT_RESTORE: &str = "horizon_dataview::layout_restore";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_dataview_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_dataview_core::signal";
    /// Column registry: insert, remove, move, clear.
    pub const COLUMNS: &str = "horizon_dataview::columns";
    /// Sort state changes.
    pub const SORT: &str = "horizon_dataview::sort";
    /// Best-width cache invalidation and flushing.
    pub const WIDTH_CACHE: &str = "horizon_dataview::width_cache";
    /// Saving and restoring column layouts.
    pub const LAYOUT: &str = "horizon_dataview::layout";
    /// Configuration loading.
    pub const CONFIG: &str = "horizon_dataview::config";
}

/// A guard that records how long an operation took.
///
/// Enter a `PerfSpan` at the top of a potentially expensive operation; the
/// span closes when the guard is dropped. Subscribers that record span
/// timings (for example `tracing-subscriber` with `FmtSpan::CLOSE`) will then
/// report the elapsed time.
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_dataview::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
