//! Text dumps of the realized item tree.
//!
//! ```
//! use std::sync::Arc;
//! use horizon_outliner::model::{ItemModel, ModelIndex};
//! use horizon_outliner::outliner::{MemoryScene, OutlinerModel, OutlinerTreeDebug};
//!
//! let scene = Arc::new(MemoryScene::new());
//! scene.add_node(&scene.root(), "Box001", "Box");
//! let model = OutlinerModel::new(scene.clone(), scene.root());
//! model.fetch_more(&model.index(0, 0, &ModelIndex::invalid()));
//!
//! println!("{}", OutlinerTreeDebug::new(&model));
//! ```

use std::fmt;

use horizon_outliner_core::TreeFormatOptions;

use super::item::{ItemId, ItemTree};
use super::model::OutlinerModel;

/// Formats the realized part of an [`OutlinerModel`].
///
/// Only realized items are printed. With `show_counters`, each line also
/// shows `realized/virtual` per active dimension.
pub struct OutlinerTreeDebug<'a> {
    model: &'a OutlinerModel,
    options: TreeFormatOptions,
}

impl<'a> OutlinerTreeDebug<'a> {
    /// Creates a formatter with default options.
    pub fn new(model: &'a OutlinerModel) -> Self {
        Self {
            model,
            options: TreeFormatOptions::default(),
        }
    }

    /// Replaces the format options.
    pub fn with_options(mut self, options: TreeFormatOptions) -> Self {
        self.options = options;
        self
    }

    fn write_subtree(
        &self,
        f: &mut fmt::Formatter<'_>,
        tree: &ItemTree,
        id: ItemId,
        ancestors_last: &mut Vec<bool>,
        is_last: bool,
    ) -> fmt::Result {
        if let Some(max) = self.options.max_depth
            && ancestors_last.len() > max
        {
            return Ok(());
        }
        let Some(item) = tree.get(id) else {
            return Ok(());
        };
        let store = tree.store();

        f.write_str(&self.options.prefix(ancestors_last, is_last))?;
        match item.object() {
            Some(object) => {
                let variant = item.variant();
                f.write_str(&variant.display_name(store, object))?;
                if self.options.show_types
                    && let Some(type_label) = variant.type_label(store, object)
                {
                    write!(f, " [{type_label}]")?;
                }
                if self.options.show_counters && !item.bindings().is_empty() {
                    f.write_str(" {")?;
                    for (i, binding) in item.bindings().iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(
                            f,
                            "{} {}/{}",
                            binding.dimension().label(),
                            binding.realized(),
                            binding.strategy().virtual_count(store, object)
                        )?;
                    }
                    f.write_str("}")?;
                }
            }
            None => f.write_str("(root)")?,
        }
        writeln!(f)?;

        let children = item.children();
        ancestors_last.push(is_last);
        for (i, child) in children.iter().enumerate() {
            self.write_subtree(f, tree, *child, ancestors_last, i + 1 == children.len())?;
        }
        ancestors_last.pop();
        Ok(())
    }
}

impl fmt::Display for OutlinerTreeDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.model.tree();
        writeln!(f, "Outliner ({} realized items):", tree.len())?;

        let Some(root) = tree.get(tree.root()) else {
            return Ok(());
        };
        if root.children().is_empty() {
            return writeln!(f, "  (empty)");
        }
        let mut ancestors_last = Vec::new();
        let count = root.children().len();
        for (i, child) in root.children().iter().enumerate() {
            self.write_subtree(f, &tree, *child, &mut ancestors_last, i + 1 == count)?;
        }
        Ok(())
    }
}
