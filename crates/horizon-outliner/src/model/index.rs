//! Model index for addressing items in hierarchical models.
//!
//! The `ModelIndex` type is the transient handle views use to reference
//! items within an `ItemModel`. It carries row, column and the parent chain,
//! plus an internal ID the model uses to find its own item in O(1).

use std::hash::{Hash, Hasher};

/// Represents a position within an `ItemModel`.
///
/// # Index Validity
///
/// Model indices should be used immediately and not stored long-term.
/// Row numbers stay meaningful only until sibling rows are inserted or removed,
/// and no index survives a model rebuild: the internal ID of an index taken
/// before a rebuild resolves to nothing afterwards.
#[derive(Clone)]
pub struct ModelIndex {
    /// The row within the parent.
    row: usize,
    /// The column within the parent.
    column: usize,
    /// The parent index. `None` indicates a top-level item.
    parent: Option<Box<ModelIndex>>,
    /// Model-specific identifier of the addressed item.
    internal_id: u64,
    /// Whether this index is valid.
    valid: bool,
}

impl Default for ModelIndex {
    fn default() -> Self {
        Self::invalid()
    }
}

impl ModelIndex {
    /// Creates an invalid (null) model index.
    ///
    /// An invalid index is used to represent:
    /// - The invisible root of the model (as a parent reference)
    /// - A non-existent or out-of-bounds item
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            parent: None,
            internal_id: 0,
            valid: false,
        }
    }

    /// Creates a new valid model index with a model-specific internal ID.
    ///
    /// # Arguments
    ///
    /// * `row` - The row within the parent
    /// * `column` - The column within the parent
    /// * `parent` - The parent index, or `ModelIndex::invalid()` for top-level items
    /// * `internal_id` - Identifier the model uses to locate its item
    #[inline]
    pub fn with_internal_id(
        row: usize,
        column: usize,
        parent: ModelIndex,
        internal_id: u64,
    ) -> Self {
        Self {
            row,
            column,
            parent: if parent.is_valid() {
                Some(Box::new(parent))
            } else {
                None
            },
            internal_id,
            valid: true,
        }
    }

    /// Returns `true` if this is a valid index.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the row of this index within its parent.
    ///
    /// Returns 0 for invalid indices.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the column of this index within its parent.
    ///
    /// Returns 0 for invalid indices.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns the parent index, or an invalid index for top-level items.
    #[inline]
    pub fn parent(&self) -> ModelIndex {
        match &self.parent {
            Some(parent) => (**parent).clone(),
            None => ModelIndex::invalid(),
        }
    }

    /// Returns `true` if this index has a valid parent.
    #[inline]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Returns the internal ID associated with this index.
    #[inline]
    pub fn internal_id(&self) -> u64 {
        self.internal_id
    }

    /// Returns the index of the same item in another column.
    ///
    /// Returns an invalid index if this index is invalid.
    #[inline]
    pub fn sibling_at_column(&self, column: usize) -> ModelIndex {
        if !self.is_valid() {
            return ModelIndex::invalid();
        }
        Self {
            column,
            ..self.clone()
        }
    }

    /// Returns the depth of this index in the tree hierarchy.
    ///
    /// Top-level items have depth 0. Returns 0 for invalid indices.
    pub fn depth(&self) -> usize {
        if !self.is_valid() {
            return 0;
        }
        let mut depth = 0;
        let mut current = self.parent.as_deref();
        while let Some(parent) = current {
            depth += 1;
            current = parent.parent.as_deref();
        }
        depth
    }

    /// Returns the chain of ancestors from this index up to (but not including) the root.
    ///
    /// The first element is the immediate parent, the last is the top-level ancestor.
    pub fn ancestors(&self) -> Vec<ModelIndex> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while current.is_valid() {
            let next = current.parent();
            ancestors.push(current);
            current = next;
        }
        ancestors
    }

    /// Checks if this index is a descendant of the given ancestor.
    pub fn is_descendant_of(&self, ancestor: &ModelIndex) -> bool {
        if !self.is_valid() || !ancestor.is_valid() {
            return false;
        }
        self.ancestors().iter().any(|a| a == ancestor)
    }
}

impl std::fmt::Debug for ModelIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            f.debug_struct("ModelIndex")
                .field("row", &self.row)
                .field("column", &self.column)
                .field("depth", &self.depth())
                .field("internal_id", &self.internal_id)
                .finish()
        } else {
            write!(f, "ModelIndex(invalid)")
        }
    }
}

impl PartialEq for ModelIndex {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => true,
            (true, true) => {
                self.row == other.row
                    && self.column == other.column
                    && self.internal_id == other.internal_id
                    && self.parent == other.parent
            }
            _ => false,
        }
    }
}

impl Eq for ModelIndex {}

impl Hash for ModelIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.valid.hash(state);
        if self.valid {
            self.row.hash(state);
            self.column.hash(state);
            // Parent is implied by the internal ID
            self.internal_id.hash(state);
        }
    }
}
