//! Model/View protocol for the outliner.
//!
//! This module provides the types a view uses to walk a hierarchical model
//! without knowing how the model stores its items:
//!
//! - `ModelIndex`: Identifies an item's position in a model
//! - `ItemRole`: Specifies what type of data to access
//! - `ItemData`: Type-erased container for item data
//! - `ItemModel`: The trait that models implement, including the lazy
//!   `can_fetch_more` / `fetch_more` pair
//! - `ModelSignals`: Signals for change notifications
//! - `FilterProxyModel`: Name filter layered over any `ItemModel`
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Model    │────>│   Signals   │────>│    View     │
//! │ (ItemModel) │     │             │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!       │                                       │
//!       │         ┌─────────────┐               │
//!       └────────>│ ModelIndex  │<──────────────┘
//!                 │  ItemRole   │
//!                 │  ItemData   │
//!                 └─────────────┘
//! ```
//!
//! Views query models using `ModelIndex` and `ItemRole` to get `ItemData`.
//! Models emit signals when data changes, which views listen to for updates.

mod filter_model;
mod index;
mod role;
mod traits;

pub use filter_model::FilterProxyModel;
pub use index::ModelIndex;
pub use role::{CheckState, Color, ItemData, ItemRole, TextAlignment, HIDEABLE_ROLE};
pub use traits::{ItemFlags, ItemModel, ModelSignals, Orientation};
