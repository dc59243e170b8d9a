//! Item construction.
//!
//! The [`DispatchTable`] maps the closed [`ObjectKind`] set onto variants and
//! is handed to the [`ItemFactory`] explicitly, so two models can use
//! different tables side by side.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ModelContext;

use super::backing::{BackingStore, ObjectKind, ObjectRef};
use super::item::{Item, ItemId, StrategyBinding};
use super::strategy::StrategyRegistry;
use super::variant::{ItemVariant, VariantKind};

/// Kind-to-variant mapping. Unmapped kinds resolve to [`VariantKind::Generic`].
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: HashMap<ObjectKind, VariantKind>,
}

impl DispatchTable {
    /// An empty table: everything wraps as generic.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard mapping for every known kind. `Unknown` stays unmapped.
    pub fn standard() -> Self {
        Self::new()
            .with(ObjectKind::SceneNode, VariantKind::SceneNode)
            .with(ObjectKind::DocumentHost, VariantKind::DocumentHost)
            .with(ObjectKind::ForeignNode, VariantKind::ForeignNode)
            .with(ObjectKind::SubProperty, VariantKind::SubProperty)
    }

    /// Adds or replaces a mapping.
    pub fn with(mut self, kind: ObjectKind, variant: VariantKind) -> Self {
        self.entries.insert(kind, variant);
        self
    }

    /// Removes a mapping.
    pub fn without(mut self, kind: ObjectKind) -> Self {
        self.entries.remove(&kind);
        self
    }

    /// The variant for a kind.
    pub fn resolve(&self, kind: ObjectKind) -> VariantKind {
        self.entries.get(&kind).copied().unwrap_or(VariantKind::Generic)
    }

    /// Returns `true` if the kind has an explicit entry.
    pub fn contains(&self, kind: ObjectKind) -> bool {
        self.entries.contains_key(&kind)
    }
}

/// Wraps backing objects into items.
#[derive(Debug, Clone)]
pub struct ItemFactory {
    table: DispatchTable,
    registry: Arc<StrategyRegistry>,
}

impl ItemFactory {
    /// Creates a factory from a dispatch table and a strategy registry.
    pub fn new(table: DispatchTable, registry: Arc<StrategyRegistry>) -> Self {
        Self { table, registry }
    }

    /// The dispatch table.
    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// The strategy registry.
    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Wraps `object` as a child of `parent` at `row`.
    ///
    /// Binds, in registry order, every strategy whose dimension the variant
    /// declares and the context allows.
    pub fn wrap(
        &self,
        store: &dyn BackingStore,
        object: ObjectRef,
        parent: Option<ItemId>,
        row: usize,
        context: &ModelContext,
    ) -> Item {
        let kind = store.kind_of(&object);
        let variant_kind = self.table.resolve(kind);
        if !self.table.contains(kind) {
            tracing::debug!(
                target: "horizon_outliner::factory",
                ?kind,
                %object,
                "no dispatch entry, wrapping as generic"
            );
        }

        let dimensions = variant_kind.dimensions();
        let bindings = self
            .registry
            .iter()
            .filter(|s| dimensions.contains(&s.dimension()) && context.allows(s.dimension()))
            .map(|s| StrategyBinding::new(s.clone()))
            .collect();
        let variant = ItemVariant::new(variant_kind, store, &object);

        tracing::trace!(
            target: "horizon_outliner::factory",
            %object,
            variant = variant_kind.label(),
            "wrapped item"
        );
        Item::new(Some(object), parent, row, variant, bindings)
    }
}
