//! The lazily realized outliner tree.
//!
//! # Layers
//!
//! - [`BackingStore`]: where objects and their attributes live
//! - [`FetchStrategy`]: how many children an object has along one
//!   [`Dimension`] and how to pull the next batch of them
//! - [`ItemFactory`] and [`DispatchTable`]: wrap objects into items of the
//!   right [`VariantKind`] with the right strategies bound
//! - [`OutlinerModel`]: exposes the realized tree through
//!   [`ItemModel`](crate::model::ItemModel)
//!
//! Nothing below an item is materialized until a view asks for it through
//! `fetch_more`, and then only one page at a time.

mod backing;
mod debug;
mod factory;
mod item;
mod memory;
mod model;
mod strategy;
mod variant;

pub use backing::{BackingStore, ObjectKind, ObjectRef, PropertyValue};
pub use debug::OutlinerTreeDebug;
pub use factory::{DispatchTable, ItemFactory};
pub use item::{Item, ItemId, ItemTree, StrategyBinding};
pub use memory::{MemoryScene, SCENE_ROOT_NAME};
pub use model::{Column, OutlinerModel, StructuralChange};
pub use strategy::{
    Batch, Dimension, DirectChildren, FetchState, FetchStrategy, ForeignChildren,
    StrategyRegistry, SubProperties,
};
pub use variant::{Capabilities, ItemVariant, VariantKind, DELETED_LABEL, UNTYPED_PRIM_LABEL};
