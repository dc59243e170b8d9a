//! Core traits for the model protocol.
//!
//! This module defines the indexable, notifiable tree protocol that models
//! expose to views and proxy models.

use horizon_outliner_core::Signal;

use super::index::ModelIndex;
use super::role::{CheckState, ItemData, ItemRole};

/// Flags indicating what operations are allowed on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    /// Item can be selected.
    pub selectable: bool,
    /// Cell can be edited.
    pub editable: bool,
    /// Cell has a checkbox.
    pub checkable: bool,
    /// Item is enabled (can interact).
    pub enabled: bool,
    /// Item will never have children (lets views skip the expander).
    pub never_has_children: bool,
}

impl ItemFlags {
    /// Creates flags with all defaults (selectable and enabled only).
    pub fn new() -> Self {
        Self {
            selectable: true,
            enabled: true,
            ..Default::default()
        }
    }

    /// Creates flags for a disabled item.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Sets the editable flag.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Sets the checkable flag.
    pub fn with_checkable(mut self, checkable: bool) -> Self {
        self.checkable = checkable;
        self
    }

    /// Sets the never-has-children flag.
    pub fn with_never_has_children(mut self, leaf: bool) -> Self {
        self.never_has_children = leaf;
        self
    }
}

/// The tree protocol views use to query and edit a model.
///
/// # Lazy Population
///
/// `row_count` reports only rows the model has materialized. A parent may
/// still answer `has_children() == true` with zero rows; the view then calls
/// [`fetch_more`](ItemModel::fetch_more) while
/// [`can_fetch_more`](ItemModel::can_fetch_more) holds, and the model
/// announces the new rows through `rows_inserted`.
pub trait ItemModel: Send + Sync {
    /// Returns the number of (materialized) rows under the given parent.
    fn row_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the number of columns for children of the given parent.
    fn column_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the data stored under the given role for the cell at index.
    ///
    /// Returns `ItemData::None` for invalid indices and unsupported roles.
    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData;

    /// Creates a model index for the given row and column under parent.
    ///
    /// Returns `ModelIndex::invalid()` if the position is out of bounds.
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex;

    /// Returns the parent of the given index, invalid for top-level items.
    fn parent(&self, index: &ModelIndex) -> ModelIndex;

    /// Returns the signals for this model.
    fn signals(&self) -> &ModelSignals;

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Sets the data for the given cell and role.
    ///
    /// Returns `true` if the data was successfully set. Implementations emit
    /// `data_changed` after a successful modification and nothing otherwise.
    /// The default implementation returns `false` (read-only).
    fn set_data(&self, _index: &ModelIndex, _value: ItemData, _role: ItemRole) -> bool {
        false
    }

    /// Returns the flags for the cell at the given index.
    fn flags(&self, _index: &ModelIndex) -> ItemFlags {
        ItemFlags::new()
    }

    /// Returns `true` if the item at parent has, or could fetch, any children.
    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    /// Returns header data for the given section.
    fn header_data(&self, _section: usize, _orientation: Orientation, _role: ItemRole) -> ItemData {
        ItemData::None
    }

    /// Returns `true` if more rows can be fetched for the given parent.
    fn can_fetch_more(&self, _parent: &ModelIndex) -> bool {
        false
    }

    /// Fetches more rows for the given parent.
    fn fetch_more(&self, _parent: &ModelIndex) {}

    // -------------------------------------------------------------------------
    // Convenience methods
    // -------------------------------------------------------------------------

    /// Returns the display text for a cell (convenience for `data(index, Display)`).
    fn display_text(&self, index: &ModelIndex) -> Option<String> {
        self.data(index, ItemRole::Display).into_string()
    }

    /// Returns the check state for a cell.
    fn check_state(&self, index: &ModelIndex) -> Option<CheckState> {
        self.data(index, ItemRole::CheckState).as_check_state()
    }

    /// Creates a sibling index at the given row and column, validated against the model.
    fn sibling(&self, index: &ModelIndex, row: usize, column: usize) -> ModelIndex {
        if !index.is_valid() {
            return ModelIndex::invalid();
        }
        self.index(row, column, &index.parent())
    }
}

/// Header orientation for `header_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Horizontal header (column headers).
    Horizontal,
    /// Vertical header (row headers).
    Vertical,
}

/// Collection of signals emitted by item models.
///
/// - **Row changes**: `rows_inserted` / `rows_removed` after the rows changed
/// - **Data changes**: `data_changed` for value modifications
/// - **Re-mapping**: `layout_*` when rows were re-filtered or re-ordered
/// - **Rebuilds**: `model_*_reset` when every previous index became stale
pub struct ModelSignals {
    /// Emitted after rows have been inserted.
    /// Args: (parent index, first row, last row)
    pub rows_inserted: Signal<(ModelIndex, usize, usize)>,

    /// Emitted after rows have been removed.
    /// Args: (parent index, first row, last row)
    pub rows_removed: Signal<(ModelIndex, usize, usize)>,

    /// Emitted when data in existing cells changes.
    /// Args: (top-left index, bottom-right index, changed roles)
    pub data_changed: Signal<(ModelIndex, ModelIndex, Vec<ItemRole>)>,

    /// Emitted before a layout change (e.g., re-filtering).
    pub layout_about_to_change: Signal<()>,

    /// Emitted after a layout change.
    pub layout_changed: Signal<()>,

    /// Emitted before the model is reset.
    pub model_about_to_reset: Signal<()>,

    /// Emitted after the model has been reset.
    pub model_reset: Signal<()>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSignals {
    /// Creates a new set of model signals.
    pub fn new() -> Self {
        Self {
            rows_inserted: Signal::new(),
            rows_removed: Signal::new(),
            data_changed: Signal::new(),
            layout_about_to_change: Signal::new(),
            layout_changed: Signal::new(),
            model_about_to_reset: Signal::new(),
            model_reset: Signal::new(),
        }
    }

    /// Emits the data_changed signal for a single cell.
    pub fn emit_data_changed_single(&self, index: ModelIndex, roles: Vec<ItemRole>) {
        self.data_changed.emit((index.clone(), index, roles));
    }

    /// Emits signals for a model reset.
    ///
    /// Calls the provided function between the about_to_reset and reset signals.
    pub fn emit_reset<F>(&self, reset_fn: F)
    where
        F: FnOnce(),
    {
        self.model_about_to_reset.emit(());
        reset_fn();
        self.model_reset.emit(());
    }

    /// Emits signals for a layout change.
    ///
    /// Calls the provided function between the about_to_change and changed signals.
    pub fn emit_layout_changed<F>(&self, change_fn: F)
    where
        F: FnOnce(),
    {
        self.layout_about_to_change.emit(());
        change_fn();
        self.layout_changed.emit(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_item_flags() {
        let flags = ItemFlags::new();
        assert!(flags.selectable);
        assert!(flags.enabled);
        assert!(!flags.editable);
        assert!(!flags.checkable);

        let toggle = ItemFlags::new().with_editable(true).with_checkable(true);
        assert!(toggle.editable && toggle.checkable);
        assert!(!ItemFlags::disabled().enabled);
    }

    #[test]
    fn test_model_signals_creation() {
        let signals = ModelSignals::new();
        assert_eq!(signals.rows_inserted.connection_count(), 0);
        assert_eq!(signals.data_changed.connection_count(), 0);
    }

    #[test]
    fn test_emit_data_changed_single() {
        let signals = ModelSignals::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let recv = received.clone();
        signals.data_changed.connect(move |(top_left, bottom_right, roles)| {
            recv.lock().push((top_left.row(), bottom_right.row(), roles.clone()));
        });

        let index = ModelIndex::with_internal_id(4, 1, ModelIndex::invalid(), 9);
        signals.emit_data_changed_single(index, vec![ItemRole::Display]);

        assert_eq!(*received.lock(), vec![(4, 4, vec![ItemRole::Display])]);
    }

    #[test]
    fn test_emit_reset() {
        let signals = ModelSignals::new();
        let counter = Arc::new(Mutex::new(0));

        let c1 = counter.clone();
        signals.model_about_to_reset.connect(move |_| {
            *c1.lock() += 1;
        });

        let c2 = counter.clone();
        signals.model_reset.connect(move |_| {
            *c2.lock() += 10;
        });

        signals.emit_reset(|| {});
        assert_eq!(*counter.lock(), 11);
    }
}
