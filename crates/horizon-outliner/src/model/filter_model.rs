//! Name filter over a hierarchical model.
//!
//! `FilterProxyModel` hides rows whose column-0 display text does not contain
//! a pattern (case-insensitive). It never touches the source model: row
//! mappings are computed per parent the first time that parent is queried,
//! over the rows the source has realized so far, and dropped whenever the
//! source reports a change.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use horizon_outliner_core::ConnectionId;
use parking_lot::RwLock;

use crate::config::FilterConfig;

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};
use super::traits::{ItemFlags, ItemModel, ModelSignals, Orientation};

/// Row mapping for one source parent.
#[derive(Debug, Default)]
struct RowMapping {
    /// Mapping from proxy row to source row.
    proxy_to_source: Vec<usize>,
    /// Mapping from source row to proxy row (None if filtered out).
    source_to_proxy: Vec<Option<usize>>,
}

impl RowMapping {
    fn proxy_row_count(&self) -> usize {
        self.proxy_to_source.len()
    }

    fn map_to_source(&self, proxy_row: usize) -> Option<usize> {
        self.proxy_to_source.get(proxy_row).copied()
    }

    fn map_from_source(&self, source_row: usize) -> Option<usize> {
        self.source_to_proxy.get(source_row).and_then(|&x| x)
    }
}

struct SourceConnections {
    rows_inserted: ConnectionId,
    rows_removed: ConnectionId,
    data_changed: ConnectionId,
    layout_changed: ConnectionId,
    model_reset: ConnectionId,
}

/// A case-insensitive substring filter on the Name column.
///
/// Created behind an `Arc` so the source's signals can reach it. Every
/// structural or data notification from the source drops the cached
/// mappings and is re-emitted as `layout_changed` (or `model_reset`).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_outliner::model::{FilterProxyModel, ItemModel, ModelIndex};
/// use horizon_outliner::outliner::{MemoryScene, OutlinerModel};
///
/// let scene = Arc::new(MemoryScene::new());
/// scene.add_node(&scene.root(), "Teapot001", "Teapot");
/// scene.add_node(&scene.root(), "Box001", "Box");
///
/// let model = Arc::new(OutlinerModel::new(scene.clone(), scene.root()));
/// let proxy = FilterProxyModel::new(model.clone());
/// let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
/// proxy.fetch_more(&scene_root);
///
/// proxy.set_filter_text("TEAPOT");
/// let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
/// assert_eq!(proxy.row_count(&scene_root), 1);
/// ```
pub struct FilterProxyModel<S: ItemModel + 'static> {
    source: Arc<S>,
    /// Lowercased pattern; empty accepts everything.
    pattern: RwLock<String>,
    recursive: RwLock<bool>,
    /// Keyed by the column-0 source parent.
    mappings: RwLock<HashMap<ModelIndex, RowMapping>>,
    signals: ModelSignals,
    connections: SourceConnections,
}

impl<S: ItemModel + 'static> FilterProxyModel<S> {
    /// Wraps `source` with an empty pattern in recursive mode.
    pub fn new(source: Arc<S>) -> Arc<Self> {
        Self::with_config(source, &FilterConfig::default())
    }

    /// Wraps `source` using the given filter settings.
    pub fn with_config(source: Arc<S>, config: &FilterConfig) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let signals = source.signals();

            let w = weak.clone();
            let rows_inserted = signals.rows_inserted.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.invalidate();
                }
            });
            let w = weak.clone();
            let rows_removed = signals.rows_removed.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.invalidate();
                }
            });
            let w = weak.clone();
            let data_changed = signals.data_changed.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.invalidate();
                }
            });
            let w = weak.clone();
            let layout_changed = signals.layout_changed.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.invalidate();
                }
            });
            let w = weak.clone();
            let model_reset = signals.model_reset.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.reset();
                }
            });

            Self {
                source: source.clone(),
                pattern: RwLock::new(String::new()),
                recursive: RwLock::new(config.recursive),
                mappings: RwLock::new(HashMap::new()),
                signals: ModelSignals::new(),
                connections: SourceConnections {
                    rows_inserted,
                    rows_removed,
                    data_changed,
                    layout_changed,
                    model_reset,
                },
            }
        })
    }

    /// Returns a reference to the source model.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// The current pattern, lowercased.
    pub fn filter_text(&self) -> String {
        self.pattern.read().clone()
    }

    /// Sets the pattern. An empty pattern shows every realized row.
    pub fn set_filter_text(&self, text: &str) {
        let pattern = text.to_lowercase();
        if *self.pattern.read() == pattern {
            return;
        }
        *self.pattern.write() = pattern;
        self.invalidate();
    }

    /// Returns `true` if ancestors of matching rows are kept.
    pub fn is_recursive(&self) -> bool {
        *self.recursive.read()
    }

    /// Keeps (or stops keeping) ancestors of matching rows.
    pub fn set_recursive(&self, recursive: bool) {
        *self.recursive.write() = recursive;
        self.invalidate();
    }

    /// Drops every cached mapping and notifies views.
    pub fn invalidate(&self) {
        tracing::debug!(target: "horizon_outliner::filter", "filter invalidated");
        self.signals.emit_layout_changed(|| {
            self.mappings.write().clear();
        });
    }

    fn reset(&self) {
        tracing::debug!(target: "horizon_outliner::filter", "source reset");
        self.signals.emit_reset(|| {
            self.mappings.write().clear();
        });
    }

    /// Maps a proxy index to a source index.
    pub fn map_to_source(&self, proxy_index: &ModelIndex) -> ModelIndex {
        if !proxy_index.is_valid() {
            return ModelIndex::invalid();
        }
        let proxy_parent = proxy_index.parent();
        let source_parent = self.map_to_source(&proxy_parent);
        if proxy_parent.is_valid() && !source_parent.is_valid() {
            return ModelIndex::invalid();
        }
        match self.with_mapping(&source_parent, |m| m.map_to_source(proxy_index.row())) {
            Some(source_row) => self.source.index(source_row, proxy_index.column(), &source_parent),
            None => ModelIndex::invalid(),
        }
    }

    /// Maps a source index to a proxy index. Filtered rows map to invalid.
    pub fn map_from_source(&self, source_index: &ModelIndex) -> ModelIndex {
        if !source_index.is_valid() {
            return ModelIndex::invalid();
        }
        let source_parent = self.source.parent(source_index);
        let proxy_parent = self.map_from_source(&source_parent);
        if source_parent.is_valid() && !proxy_parent.is_valid() {
            return ModelIndex::invalid();
        }
        match self.with_mapping(&source_parent, |m| m.map_from_source(source_index.row())) {
            Some(proxy_row) => ModelIndex::with_internal_id(
                proxy_row,
                source_index.column(),
                proxy_parent,
                source_index.internal_id(),
            ),
            None => ModelIndex::invalid(),
        }
    }

    /// Maps a proxy parent; `None` if it no longer resolves.
    fn source_parent_of(&self, proxy_parent: &ModelIndex) -> Option<ModelIndex> {
        if !proxy_parent.is_valid() {
            return Some(ModelIndex::invalid());
        }
        let source = self.map_to_source(&proxy_parent.sibling_at_column(0));
        source.is_valid().then_some(source)
    }

    fn with_mapping<R>(&self, source_parent: &ModelIndex, f: impl FnOnce(&RowMapping) -> R) -> R {
        let key = source_parent.sibling_at_column(0);
        if let Some(mapping) = self.mappings.read().get(&key) {
            return f(mapping);
        }
        // Built without holding the lock: the filter queries the source.
        let mapping = self.build_mapping(&key);
        let mut mappings = self.mappings.write();
        f(mappings.entry(key).or_insert(mapping))
    }

    fn build_mapping(&self, source_parent: &ModelIndex) -> RowMapping {
        let count = self.source.row_count(source_parent);
        let pattern = self.pattern.read().clone();
        let recursive = self.is_recursive();

        let mut mapping = RowMapping {
            proxy_to_source: Vec::new(),
            source_to_proxy: vec![None; count],
        };
        for row in 0..count {
            let index = self.source.index(row, 0, source_parent);
            if self.accepts(&index, &pattern, recursive) {
                mapping.source_to_proxy[row] = Some(mapping.proxy_to_source.len());
                mapping.proxy_to_source.push(row);
            }
        }
        tracing::trace!(
            target: "horizon_outliner::filter",
            source_rows = count,
            accepted = mapping.proxy_row_count(),
            "row mapping built"
        );
        mapping
    }

    fn accepts(&self, index: &ModelIndex, pattern: &str, recursive: bool) -> bool {
        if pattern.is_empty() || self.name_matches(index, pattern) {
            return true;
        }
        recursive
            && (0..self.source.row_count(index))
                .any(|row| self.accepts(&self.source.index(row, 0, index), pattern, true))
    }

    fn name_matches(&self, index: &ModelIndex, pattern: &str) -> bool {
        self.source
            .data(index, ItemRole::Display)
            .as_string()
            .is_some_and(|name| name.to_lowercase().contains(pattern))
    }
}

impl<S: ItemModel + 'static> Drop for FilterProxyModel<S> {
    fn drop(&mut self) {
        let signals = self.source.signals();
        signals.rows_inserted.disconnect(self.connections.rows_inserted);
        signals.rows_removed.disconnect(self.connections.rows_removed);
        signals.data_changed.disconnect(self.connections.data_changed);
        signals.layout_changed.disconnect(self.connections.layout_changed);
        signals.model_reset.disconnect(self.connections.model_reset);
    }
}

/// Cells past column 0 never own rows.
fn is_cell(parent: &ModelIndex) -> bool {
    parent.is_valid() && parent.column() > 0
}

impl<S: ItemModel + 'static> ItemModel for FilterProxyModel<S> {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if is_cell(parent) {
            return 0;
        }
        match self.source_parent_of(parent) {
            Some(source_parent) => self.with_mapping(&source_parent, RowMapping::proxy_row_count),
            None => 0,
        }
    }

    fn column_count(&self, parent: &ModelIndex) -> usize {
        self.source.column_count(&self.map_to_source(parent))
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        let source_index = self.map_to_source(index);
        if !source_index.is_valid() {
            return ItemData::None;
        }
        self.source.data(&source_index, role)
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        let Some(source_parent) = self.source_parent_of(parent) else {
            return ModelIndex::invalid();
        };
        let Some(source_row) = self.with_mapping(&source_parent, |m| m.map_to_source(row)) else {
            return ModelIndex::invalid();
        };
        let source_index = self.source.index(source_row, column, &source_parent);
        if !source_index.is_valid() {
            return ModelIndex::invalid();
        }
        ModelIndex::with_internal_id(row, column, parent.sibling_at_column(0), source_index.internal_id())
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        index.parent()
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn set_data(&self, index: &ModelIndex, value: ItemData, role: ItemRole) -> bool {
        let source_index = self.map_to_source(index);
        source_index.is_valid() && self.source.set_data(&source_index, value, role)
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        let source_index = self.map_to_source(index);
        if !source_index.is_valid() {
            return ItemFlags::disabled();
        }
        self.source.flags(&source_index)
    }

    fn has_children(&self, parent: &ModelIndex) -> bool {
        !is_cell(parent)
            && self
                .source_parent_of(parent)
                .is_some_and(|source_parent| self.source.has_children(&source_parent))
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        self.source.header_data(section, orientation, role)
    }

    fn can_fetch_more(&self, parent: &ModelIndex) -> bool {
        !is_cell(parent)
            && self
                .source_parent_of(parent)
                .is_some_and(|source_parent| self.source.can_fetch_more(&source_parent))
    }

    fn fetch_more(&self, parent: &ModelIndex) {
        if let Some(source_parent) = self.source_parent_of(parent) {
            self.source.fetch_more(&source_parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outliner::{BackingStore, Column, MemoryScene, OutlinerModel};
    use parking_lot::Mutex;

    fn fixture() -> (Arc<MemoryScene>, Arc<OutlinerModel>) {
        let scene = Arc::new(MemoryScene::new());
        let root = scene.root();
        let lights = scene.add_node(&root, "Lights", "Dummy");
        scene.add_node(&lights, "KeyLight", "Omnilight");
        scene.add_node(&lights, "FillLight", "Omnilight");
        scene.add_node(&root, "Teapot001", "Teapot");
        scene.add_node(&root, "Box001", "Box");
        let model = Arc::new(OutlinerModel::new(scene.clone(), root));
        (scene, model)
    }

    fn expand_all(model: &OutlinerModel) {
        let scene_root = model.index(0, 0, &ModelIndex::invalid());
        model.fetch_more(&scene_root);
        for row in 0..model.row_count(&scene_root) {
            let child = model.index(row, 0, &scene_root);
            while model.can_fetch_more(&child) {
                model.fetch_more(&child);
            }
        }
    }

    fn names<M: ItemModel>(model: &M, parent: &ModelIndex) -> Vec<String> {
        (0..model.row_count(parent))
            .filter_map(|row| model.display_text(&model.index(row, 0, parent)))
            .collect()
    }

    #[test]
    fn test_empty_pattern_passes_everything() {
        let (_scene, model) = fixture();
        expand_all(&model);
        let proxy = FilterProxyModel::new(model.clone());

        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        assert_eq!(names(proxy.as_ref(), &scene_root), vec!["Lights", "Teapot001", "Box001"]);
        assert_eq!(proxy.column_count(&scene_root), model.column_count(&ModelIndex::invalid()));
    }

    #[test]
    fn test_case_insensitive_match() {
        let (_scene, model) = fixture();
        expand_all(&model);
        let proxy = FilterProxyModel::new(model.clone());
        proxy.set_filter_text("BOX");
        assert_eq!(proxy.filter_text(), "box");

        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        assert_eq!(names(proxy.as_ref(), &scene_root), vec!["Box001"]);
    }

    #[test]
    fn test_recursive_keeps_ancestors() {
        let (_scene, model) = fixture();
        expand_all(&model);
        let proxy = FilterProxyModel::new(model.clone());
        proxy.set_filter_text("fill");

        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        assert_eq!(names(proxy.as_ref(), &scene_root), vec!["Lights"]);
        let lights = proxy.index(0, 0, &scene_root);
        assert_eq!(names(proxy.as_ref(), &lights), vec!["FillLight"]);

        proxy.set_recursive(false);
        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        assert!(!scene_root.is_valid());
    }

    #[test]
    fn test_map_round_trip() {
        let (_scene, model) = fixture();
        expand_all(&model);
        let proxy = FilterProxyModel::new(model.clone());
        proxy.set_filter_text("light");

        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        let lights = proxy.index(0, 0, &scene_root);
        let key = proxy.index(0, 2, &lights);
        let source = proxy.map_to_source(&key);
        assert_eq!(model.display_text(&source.sibling_at_column(0)).as_deref(), Some("KeyLight"));
        assert_eq!(proxy.map_from_source(&source), key);

        let source_root = model.index(0, 0, &ModelIndex::invalid());
        let teapot = model.index(1, 0, &source_root);
        assert!(!proxy.map_from_source(&teapot).is_valid());
    }

    #[test]
    fn test_only_realized_rows_are_filtered() {
        let (_scene, model) = fixture();
        let proxy = FilterProxyModel::new(model.clone());
        proxy.set_filter_text("teapot");

        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        assert!(!scene_root.is_valid());
        assert_eq!(model.realized_item_count(), 1);
    }

    #[test]
    fn test_fetch_through_proxy_invalidates() {
        let (_scene, model) = fixture();
        let proxy = FilterProxyModel::new(model.clone());
        let layouts = Arc::new(Mutex::new(0));
        let count = layouts.clone();
        proxy.signals().layout_changed.connect(move |_| *count.lock() += 1);

        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        assert_eq!(proxy.row_count(&scene_root), 0);
        assert!(proxy.can_fetch_more(&scene_root));
        proxy.fetch_more(&scene_root);

        assert_eq!(*layouts.lock(), 1);
        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        assert_eq!(proxy.row_count(&scene_root), 3);
        assert!(proxy.has_children(&proxy.index(0, 0, &scene_root)));
    }

    #[test]
    fn test_set_data_delegates() {
        let (scene, model) = fixture();
        expand_all(&model);
        let proxy = FilterProxyModel::new(model.clone());
        proxy.set_filter_text("teapot");

        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        let vis = proxy.index(0, 1, &scene_root);
        assert!(proxy.flags(&vis).checkable);
        assert!(proxy.set_data(&vis, ItemData::Bool(false), ItemRole::CheckState));

        let teapot = model.object_at(&proxy.map_to_source(&vis)).unwrap();
        assert_eq!(scene.is_hidden(&teapot), Some(true));
    }

    fn count_layouts<M: ItemModel>(model: &M) -> Arc<Mutex<usize>> {
        let layouts = Arc::new(Mutex::new(0));
        let count = layouts.clone();
        model.signals().layout_changed.connect(move |_| *count.lock() += 1);
        layouts
    }

    #[test]
    fn test_source_edit_rebuilds_mapping() {
        let (scene, model) = fixture();
        expand_all(&model);
        let proxy = FilterProxyModel::new(model.clone());
        proxy.set_filter_text("teapot");
        let layouts = count_layouts(proxy.as_ref());

        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        assert_eq!(names(proxy.as_ref(), &scene_root), vec!["Teapot001"]);

        // Renamed behind the model's back: the cached mapping is still used.
        let source_root = model.index(0, 0, &ModelIndex::invalid());
        let teapot = model.index(1, 0, &source_root);
        scene.rename(&model.object_at(&teapot).unwrap(), "Kettle");
        assert_eq!(proxy.row_count(&scene_root), 1);

        let vis = teapot.sibling_at_column(Column::Visibility.index());
        assert!(model.set_data(&vis, ItemData::Bool(false), ItemRole::CheckState));
        assert_eq!(*layouts.lock(), 1);
        assert!(!proxy.index(0, 0, &ModelIndex::invalid()).is_valid());
    }

    #[test]
    fn test_source_removals_and_layout_changes_rebuild_mapping() {
        let (scene, model) = fixture();
        expand_all(&model);
        let proxy = FilterProxyModel::new(model.clone());
        proxy.set_filter_text("box");
        let layouts = count_layouts(proxy.as_ref());

        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        assert_eq!(names(proxy.as_ref(), &scene_root), vec!["Box001"]);

        let source_root = model.index(0, 0, &ModelIndex::invalid());
        let teapot = model.object_at(&model.index(1, 0, &source_root)).unwrap();
        scene.rename(&teapot, "Box002");
        model.signals().rows_removed.emit((source_root.clone(), 2, 2));
        assert_eq!(*layouts.lock(), 1);
        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        assert_eq!(names(proxy.as_ref(), &scene_root), vec!["Box002", "Box001"]);

        let box001 = model.object_at(&model.index(2, 0, &source_root)).unwrap();
        scene.rename(&box001, "Sphere001");
        model.signals().layout_changed.emit(());
        assert_eq!(*layouts.lock(), 2);
        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        assert_eq!(names(proxy.as_ref(), &scene_root), vec!["Box002"]);
    }

    #[test]
    fn test_cells_past_name_column_have_no_rows() {
        let (_scene, model) = fixture();
        expand_all(&model);
        let proxy = FilterProxyModel::new(model.clone());
        proxy.set_filter_text("light");

        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        let lights = proxy.index(0, 0, &scene_root);
        assert_eq!(proxy.row_count(&lights), 2);

        let type_cell = lights.sibling_at_column(Column::Type.index());
        assert_eq!(proxy.row_count(&type_cell), 0);
        assert!(!proxy.has_children(&type_cell));
        assert!(!proxy.can_fetch_more(&type_cell));
    }

    #[test]
    fn test_source_reset_propagates() {
        let (_scene, model) = fixture();
        expand_all(&model);
        let proxy = FilterProxyModel::new(model.clone());
        let resets = Arc::new(Mutex::new(0));
        let count = resets.clone();
        proxy.signals().model_reset.connect(move |_| *count.lock() += 1);

        model.rebuild();
        assert_eq!(*resets.lock(), 1);
        let scene_root = proxy.index(0, 0, &ModelIndex::invalid());
        assert_eq!(proxy.row_count(&scene_root), 0);
    }

    #[test]
    fn test_drop_disconnects_from_source() {
        let (_scene, model) = fixture();
        let before = model.signals().rows_inserted.connection_count();
        let proxy = FilterProxyModel::new(model.clone());
        assert_eq!(model.signals().rows_inserted.connection_count(), before + 1);
        drop(proxy);
        assert_eq!(model.signals().rows_inserted.connection_count(), before);
    }
}
