//! Core systems for Horizon DataView.
//!
//! This crate provides the small foundation shared by the data view crates:
//!
//! - **Signal/Slot System**: Type-safe notifications from a view to the
//!   embedding application
//! - **Logging**: Stable `tracing` targets and span helpers
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_dataview_core::Signal;
//!
//! let column_reordered = Signal::<(usize, usize)>::new();
//!
//! column_reordered.connect(|&(from, to)| {
//!     println!("Column moved from {} to {}", from, to);
//! });
//!
//! column_reordered.emit((0, 3));
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal, SignalBlocker};
