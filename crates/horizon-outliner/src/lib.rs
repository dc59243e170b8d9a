//! Horizon Outliner - a lazily expanding, virtualized scene outliner engine.
//!
//! The engine presents a heterogeneous object hierarchy (scene nodes, their
//! sub-properties, and prims of hosted foreign documents) as a tree model
//! a view can walk. Children are realized on demand, one page at a time, so
//! scenes with hundreds of thousands of objects stay cheap to display.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_outliner::model::{ItemModel, ModelIndex};
//! use horizon_outliner::outliner::{MemoryScene, OutlinerModel};
//!
//! let scene = Arc::new(MemoryScene::new());
//! let root = scene.root();
//! for i in 0..250 {
//!     scene.add_node(&root, &format!("Box{i:03}"), "Box");
//! }
//!
//! let model = OutlinerModel::new(scene.clone(), root);
//! let scene_root = model.index(0, 0, &ModelIndex::invalid());
//! while model.can_fetch_more(&scene_root) {
//!     model.fetch_more(&scene_root);
//! }
//! assert_eq!(model.row_count(&scene_root), 250);
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod outliner;

pub use config::{FilterConfig, ModelContext, OutlinerConfig, DEFAULT_PAGE_SIZE};
pub use error::{ConfigError, ConfigResult, StoreError, StoreResult};

pub use horizon_outliner_core::{
    ConnectionId, PerfSpan, Signal, ThreadAffinity, TreeFormatOptions, TreeStyle,
};
