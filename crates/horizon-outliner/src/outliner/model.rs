//! The outliner tree model.
//!
//! [`OutlinerModel`] adapts the realized [`ItemTree`] to the [`ItemModel`]
//! protocol. Views see only realized rows; `has_children` and
//! `can_fetch_more` report what could still be realized, and `fetch_more`
//! realizes one page at a time.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_outliner::model::{ItemModel, ItemRole, ModelIndex};
//! use horizon_outliner::outliner::{MemoryScene, OutlinerModel};
//!
//! let scene = Arc::new(MemoryScene::new());
//! let root = scene.root();
//! scene.add_node(&root, "Teapot001", "Teapot");
//!
//! let model = OutlinerModel::new(scene.clone(), root);
//! let scene_root = model.index(0, 0, &ModelIndex::invalid());
//! assert_eq!(model.row_count(&scene_root), 0);
//! assert!(model.can_fetch_more(&scene_root));
//!
//! model.fetch_more(&scene_root);
//! let teapot = model.index(0, 0, &scene_root);
//! assert_eq!(model.display_text(&teapot).as_deref(), Some("Teapot001"));
//! ```

use std::sync::Arc;

use horizon_outliner_core::{PerfSpan, ThreadAffinity, TreeFormatOptions};
use parking_lot::{RwLock, RwLockReadGuard};

use crate::config::{ModelContext, OutlinerConfig};
use crate::error::StoreError;
use crate::model::{
    CheckState, Color, ItemData, ItemFlags, ItemModel, ItemRole, ModelIndex, ModelSignals,
    Orientation, TextAlignment, HIDEABLE_ROLE,
};

use super::backing::{BackingStore, ObjectRef, PropertyValue};
use super::debug::OutlinerTreeDebug;
use super::factory::{DispatchTable, ItemFactory};
use super::item::{Item, ItemId, ItemTree};
use super::strategy::{Dimension, FetchState, StrategyRegistry};
use super::variant::{VariantKind, DELETED_LABEL};

/// The fixed column schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Object name.
    Name = 0,
    /// Visibility checkbox.
    Visibility = 1,
    /// Class or type label.
    Type = 2,
    /// Value, path or controller value.
    Value = 3,
}

impl Column {
    /// Number of columns.
    pub const COUNT: usize = 4;

    /// All columns in order.
    pub const ALL: [Column; Column::COUNT] = [Column::Name, Column::Visibility, Column::Type, Column::Value];

    /// The column at a position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The column's position.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header label.
    pub fn label(self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::Visibility => "Vis",
            Column::Type => "Type",
            Column::Value => "Value",
        }
    }
}

/// External structural notifications. Each one rebuilds the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralChange {
    /// A scene node was created.
    NodeCreated,
    /// A scene node was deleted.
    NodeDeleted,
    /// Scene nodes were cloned.
    NodesCloned,
    /// A scene file was opened.
    SceneOpened,
    /// A new empty scene was started.
    SceneNew,
    /// The scene was reset.
    SceneReset,
    /// A foreign document was opened.
    DocumentOpened,
    /// A foreign document was closed.
    DocumentClosed,
}

impl From<PropertyValue> for ItemData {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Bool(b) => ItemData::Bool(b),
            PropertyValue::Int(n) => ItemData::Int(n),
            PropertyValue::Float(n) => ItemData::Float(n),
            PropertyValue::Text(s) => ItemData::String(s),
        }
    }
}

fn property_value_from(data: ItemData) -> Option<PropertyValue> {
    match data {
        ItemData::Bool(b) => Some(PropertyValue::Bool(b)),
        ItemData::Int(n) => Some(PropertyValue::Int(n)),
        ItemData::Float(n) => Some(PropertyValue::Float(n)),
        ItemData::String(s) => Some(PropertyValue::Text(s)),
        ItemData::CheckState(s) => Some(PropertyValue::Bool(s.is_checked())),
        _ => None,
    }
}

/// Tree model over a lazily realized outliner.
///
/// The model is owned by the thread that drives the view. Interior locks are
/// released before any signal is emitted, so slots may call back into the
/// model.
pub struct OutlinerModel {
    tree: RwLock<ItemTree>,
    scene_root: RwLock<ObjectRef>,
    config: RwLock<OutlinerConfig>,
    signals: ModelSignals,
    affinity: ThreadAffinity,
}

impl OutlinerModel {
    /// Creates a model with the default configuration.
    pub fn new(store: Arc<dyn BackingStore>, scene_root: ObjectRef) -> Self {
        Self::with_config(store, scene_root, OutlinerConfig::default())
    }

    /// Creates a model with the standard dispatch table and strategies.
    pub fn with_config(store: Arc<dyn BackingStore>, scene_root: ObjectRef, config: OutlinerConfig) -> Self {
        Self::from_parts(
            store,
            scene_root,
            config,
            DispatchTable::standard(),
            StrategyRegistry::standard(),
        )
    }

    /// Creates a model from explicit parts.
    pub fn from_parts(
        store: Arc<dyn BackingStore>,
        scene_root: ObjectRef,
        config: OutlinerConfig,
        table: DispatchTable,
        registry: StrategyRegistry,
    ) -> Self {
        let factory = Arc::new(ItemFactory::new(table, Arc::new(registry)));
        let tree = ItemTree::new(store, factory, config.context, scene_root.clone());
        tracing::debug!(
            target: "horizon_outliner::model",
            %scene_root,
            page_size = config.page_size,
            "outliner model created"
        );
        Self {
            tree: RwLock::new(tree),
            scene_root: RwLock::new(scene_root),
            config: RwLock::new(config),
            signals: ModelSignals::new(),
            affinity: ThreadAffinity::current(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> OutlinerConfig {
        self.config.read().clone()
    }

    /// The active context policy.
    pub fn context(&self) -> ModelContext {
        self.config.read().context
    }

    /// Rows realized per `fetch_more` call.
    pub fn page_size(&self) -> usize {
        self.config.read().page_size.max(1)
    }

    /// Changes the page size used by later fetches.
    pub fn set_page_size(&self, page_size: usize) {
        self.config.write().page_size = page_size.max(1);
    }

    /// Swaps the context policy and rebuilds.
    pub fn set_context(&self, context: ModelContext) {
        self.config.write().context = context;
        self.rebuild();
    }

    /// Toggles the sub-property dimension and rebuilds.
    pub fn set_include_sub_properties(&self, include: bool) {
        let context = self.context().with_sub_properties(include);
        self.set_context(context);
    }

    /// Points the model at another scene root and rebuilds.
    pub fn set_scene_root(&self, scene_root: ObjectRef) {
        *self.scene_root.write() = scene_root;
        self.rebuild();
    }

    /// Discards every realized item and starts again from a fresh root.
    ///
    /// Every index issued before the call becomes stale.
    #[tracing::instrument(skip(self), target = "horizon_outliner::model", level = "debug")]
    pub fn rebuild(&self) {
        self.affinity.debug_assert_same_thread();
        let _perf = PerfSpan::new("rebuild");
        let scene_root = self.scene_root.read().clone();
        let context = self.context();
        self.signals.emit_reset(|| {
            let mut tree = self.tree.write();
            let discarded = tree.len();
            tree.reset(scene_root, context);
            tracing::debug!(target: "horizon_outliner::model", discarded, "item tree rebuilt");
        });
    }

    /// Reacts to an external structural notification.
    pub fn notify_structure_changed(&self, change: StructuralChange) {
        tracing::info!(target: "horizon_outliner::model", ?change, "structure changed, rebuilding");
        self.rebuild();
    }

    /// The backing object behind an index.
    pub fn object_at(&self, index: &ModelIndex) -> Option<ObjectRef> {
        let tree = self.tree.read();
        self.resolve_item(&tree, index)?.object().cloned()
    }

    /// Every realized index (column 0), depth-first.
    pub fn iter_realized(&self) -> Vec<ModelIndex> {
        let tree = self.tree.read();
        tree.iter_depth_first()
            .into_iter()
            .map(|id| Self::index_for(&tree, id))
            .collect()
    }

    /// Progress along one dimension of the item at `index`.
    pub fn fetch_state(&self, index: &ModelIndex, dimension: Dimension) -> Option<FetchState> {
        let tree = self.tree.read();
        self.resolve_item(&tree, index)?.fetch_state(tree.store(), dimension)
    }

    /// Progress over all dimensions of the item at `index`.
    pub fn item_fetch_state(&self, index: &ModelIndex) -> Option<FetchState> {
        let tree = self.tree.read();
        let item = self.resolve_item(&tree, index)?;
        item.object()?;
        Some(item.overall_fetch_state(tree.store()))
    }

    /// Backing positions consumed along one dimension of the item at `index`.
    pub fn realized_count(&self, index: &ModelIndex, dimension: Dimension) -> Option<usize> {
        let tree = self.tree.read();
        Some(self.resolve_item(&tree, index)?.binding(dimension)?.realized())
    }

    /// Number of realized items, the invisible root excluded.
    pub fn realized_item_count(&self) -> usize {
        self.tree.read().len()
    }

    /// The variant of the item at `index`.
    pub fn variant_at(&self, index: &ModelIndex) -> Option<VariantKind> {
        let tree = self.tree.read();
        Some(self.resolve_item(&tree, index)?.variant().kind)
    }

    /// Renders the realized tree as text.
    pub fn debug_tree(&self, options: TreeFormatOptions) -> String {
        OutlinerTreeDebug::new(self).with_options(options).to_string()
    }

    pub(crate) fn tree(&self) -> RwLockReadGuard<'_, ItemTree> {
        self.tree.read()
    }

    fn resolve_id(&self, tree: &ItemTree, index: &ModelIndex) -> Option<ItemId> {
        if !index.is_valid() {
            return None;
        }
        let id = ItemId::from_internal_id(index.internal_id());
        tree.contains(id).then_some(id)
    }

    fn resolve_item<'t>(&self, tree: &'t ItemTree, index: &ModelIndex) -> Option<&'t Item> {
        tree.get(self.resolve_id(tree, index)?)
    }

    /// Invalid parents address the root sentinel.
    fn resolve_parent(&self, tree: &ItemTree, parent: &ModelIndex) -> Option<ItemId> {
        if parent.is_valid() {
            self.resolve_id(tree, parent)
        } else {
            Some(tree.root())
        }
    }

    /// Like `resolve_parent`, but only column 0 cells own children.
    fn resolve_branch(&self, tree: &ItemTree, parent: &ModelIndex) -> Option<ItemId> {
        if parent.is_valid() && parent.column() > 0 {
            return None;
        }
        self.resolve_parent(tree, parent)
    }

    fn index_for(tree: &ItemTree, id: ItemId) -> ModelIndex {
        let Some(item) = tree.get(id) else {
            return ModelIndex::invalid();
        };
        let parent_index = match item.parent() {
            Some(parent) if parent != tree.root() => Self::index_for(tree, parent),
            _ => ModelIndex::invalid(),
        };
        ModelIndex::with_internal_id(item.row(), 0, parent_index, id.to_internal_id())
    }

    fn item_data(&self, item: &Item, store: &dyn BackingStore, column: Column, role: ItemRole) -> ItemData {
        let Some(object) = item.object() else {
            return ItemData::None;
        };
        if !store.exists(object) {
            return match (column, role) {
                (Column::Name, ItemRole::Display) => ItemData::from(DELETED_LABEL),
                _ => ItemData::None,
            };
        }

        let variant = item.variant();
        let capabilities = variant.capabilities;
        let sub_property = variant.kind == VariantKind::SubProperty;

        match role {
            ItemRole::Display | ItemRole::Edit => match column {
                Column::Name => variant.display_name(store, object).into(),
                Column::Type => variant.type_label(store, object).into(),
                Column::Value => variant.value(store, object).into(),
                Column::Visibility if role == ItemRole::Edit && capabilities.can_hide => variant
                    .is_hidden(store, object)
                    .map(|hidden| !hidden)
                    .into(),
                Column::Visibility => ItemData::None,
            },
            ItemRole::ToolTip => variant.tool_tip(store, object).into(),
            ItemRole::CheckState => match column {
                Column::Visibility if capabilities.can_hide => variant
                    .is_hidden(store, object)
                    .map(|hidden| CheckState::from(!hidden))
                    .into(),
                Column::Value if capabilities.value_checkable => variant
                    .value(store, object)
                    .and_then(|v| v.as_bool())
                    .map(CheckState::from)
                    .into(),
                _ => ItemData::None,
            },
            ItemRole::ForegroundColor => {
                if sub_property && column == Column::Name && item.has_children(store) {
                    return Color::LIGHT_GRAY.into();
                }
                let hidden = variant.is_hidden(store, object).unwrap_or(false);
                match (capabilities.foreign, hidden) {
                    (true, false) => Color::CYAN.into(),
                    (true, true) => Color::CYAN.darker(200).into(),
                    (false, true) => Color::DARK_GRAY.into(),
                    (false, false) => ItemData::None,
                }
            }
            ItemRole::BackgroundColor => {
                if column == Column::Value && variant.is_animated(store, object) {
                    Color::RED.into()
                } else {
                    ItemData::None
                }
            }
            ItemRole::TextAlignment => {
                if sub_property && column == Column::Name && !item.has_children(store) {
                    TextAlignment::Right.into()
                } else {
                    ItemData::None
                }
            }
            HIDEABLE_ROLE => capabilities.can_hide.into(),
            ItemRole::User(_) => ItemData::None,
        }
    }
}

impl ItemModel for OutlinerModel {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        let tree = self.tree.read();
        self.resolve_branch(&tree, parent)
            .and_then(|id| tree.get(id))
            .map_or(0, Item::row_count_realized)
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        Column::COUNT
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        let Some(column) = Column::from_index(index.column()) else {
            return ItemData::None;
        };
        let tree = self.tree.read();
        match self.resolve_item(&tree, index) {
            Some(item) => self.item_data(item, tree.store(), column, role),
            None => ItemData::None,
        }
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= Column::COUNT {
            return ModelIndex::invalid();
        }
        let tree = self.tree.read();
        let Some(child) = self
            .resolve_parent(&tree, parent)
            .and_then(|id| tree.child(id, row))
        else {
            return ModelIndex::invalid();
        };
        ModelIndex::with_internal_id(row, column, parent.sibling_at_column(0), child.to_internal_id())
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        let tree = self.tree.read();
        match self.resolve_item(&tree, index).and_then(Item::parent) {
            Some(parent) if parent != tree.root() => Self::index_for(&tree, parent),
            _ => ModelIndex::invalid(),
        }
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn set_data(&self, index: &ModelIndex, value: ItemData, role: ItemRole) -> bool {
        self.affinity.debug_assert_same_thread();
        let Some(column) = Column::from_index(index.column()) else {
            return false;
        };

        let result = {
            let tree = self.tree.read();
            let Some(item) = self.resolve_item(&tree, index) else {
                return false;
            };
            let Some(object) = item.object() else {
                return false;
            };
            let store = tree.store();
            let variant = item.variant();

            match (column, role) {
                (Column::Visibility, ItemRole::CheckState | ItemRole::Edit) => match value.to_flag() {
                    Some(visible) => variant.set_hidden(store, object, !visible),
                    None => Err(StoreError::rejected("visibility expects a boolean")),
                },
                (Column::Value, ItemRole::Edit) => match property_value_from(value) {
                    Some(value) => variant.set_value(store, object, value),
                    None => Err(StoreError::rejected("unsupported value type")),
                },
                (Column::Value, ItemRole::CheckState) if variant.capabilities.value_checkable => {
                    match value.to_flag() {
                        Some(flag) => variant.set_value(store, object, PropertyValue::Bool(flag)),
                        None => Err(StoreError::rejected("check state expects a boolean")),
                    }
                }
                _ => return false,
            }
        };

        match result {
            Ok(()) => {
                self.signals.emit_data_changed_single(index.clone(), vec![role]);
                true
            }
            Err(err) => {
                tracing::warn!(
                    target: "horizon_outliner::model",
                    row = index.row(),
                    column = column.label(),
                    error = %err,
                    "edit refused"
                );
                false
            }
        }
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        let Some(column) = Column::from_index(index.column()) else {
            return ItemFlags::disabled();
        };
        let tree = self.tree.read();
        let Some(item) = self.resolve_item(&tree, index) else {
            return ItemFlags::disabled();
        };
        let capabilities = item.variant().capabilities;
        let flags = ItemFlags::new().with_never_has_children(item.bindings().is_empty());
        match column {
            Column::Value => flags
                .with_editable(capabilities.value_editable)
                .with_checkable(capabilities.value_checkable),
            Column::Visibility if capabilities.can_hide => {
                flags.with_editable(true).with_checkable(true)
            }
            _ => flags,
        }
    }

    fn has_children(&self, parent: &ModelIndex) -> bool {
        let tree = self.tree.read();
        self.resolve_branch(&tree, parent)
            .and_then(|id| tree.get(id))
            .is_some_and(|item| item.has_children(tree.store()))
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        match (orientation, role, Column::from_index(section)) {
            (Orientation::Horizontal, ItemRole::Display, Some(column)) => column.label().into(),
            _ => ItemData::None,
        }
    }

    fn can_fetch_more(&self, parent: &ModelIndex) -> bool {
        let tree = self.tree.read();
        self.resolve_branch(&tree, parent)
            .and_then(|id| tree.get(id))
            .is_some_and(|item| item.can_fetch_more(tree.store()))
    }

    #[tracing::instrument(skip_all, target = "horizon_outliner::fetch", level = "debug")]
    fn fetch_more(&self, parent: &ModelIndex) {
        self.affinity.debug_assert_same_thread();
        let page = self.page_size();
        let (first, added) = {
            let mut tree = self.tree.write();
            let Some(id) = self.resolve_parent(&tree, parent) else {
                return;
            };
            let first = tree.get(id).map_or(0, Item::row_count_realized);
            (first, tree.fetch_more(id, page))
        };

        tracing::debug!(target: "horizon_outliner::fetch", first, added, page, "fetched rows");
        if added > 0 {
            self.signals
                .rows_inserted
                .emit((parent.sibling_at_column(0), first, first + added - 1));
        }
    }
}

static_assertions::assert_impl_all!(OutlinerModel: Send, Sync);
