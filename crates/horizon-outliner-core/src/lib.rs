//! Core systems for Horizon Outliner.
//!
//! This crate provides the foundational pieces shared by the outliner engine:
//!
//! - **Signal/Slot System**: Change notifications from models to views
//! - **Thread Affinity**: Debug checks that the engine stays on its owner thread
//! - **Logging**: `tracing` targets, perf spans and tree dump formatting options
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_outliner_core::Signal;
//!
//! let data_changed = Signal::<usize>::new();
//! let conn_id = data_changed.connect(|row| {
//!     println!("row {row} changed");
//! });
//!
//! data_changed.emit(3);
//! data_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;
pub mod thread_check;

pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
