//! Fetch strategies: one per dimension of "children".
//!
//! A strategy knows how many children an object has along its dimension and
//! how to pull the next few of them from the backing store. It holds no
//! per-item state; the realized counter lives in the item's
//! [`StrategyBinding`](super::item::StrategyBinding).

use std::fmt;
use std::sync::Arc;

use super::backing::{BackingStore, ObjectRef};

/// A dimension along which an object can have children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Scene-graph children.
    Direct,
    /// Parameters and controllers.
    SubProperty,
    /// Prims of a hosted foreign document.
    Foreign,
}

impl Dimension {
    /// Short label used in debug output.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Direct => "direct",
            Dimension::SubProperty => "sub",
            Dimension::Foreign => "foreign",
        }
    }
}

/// Progress of one (item, strategy) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Nothing realized yet.
    Unfetched,
    /// Some, but not all, children realized.
    PartiallyFetched,
    /// Every child the store reported has been realized.
    FullyFetched,
}

impl FetchState {
    /// Derives the state from a realized counter and the current virtual count.
    pub fn from_counts(realized: usize, virtual_count: usize) -> Self {
        if realized == 0 {
            FetchState::Unfetched
        } else if realized < virtual_count {
            FetchState::PartiallyFetched
        } else {
            FetchState::FullyFetched
        }
    }
}

/// Objects pulled by one [`FetchStrategy::realize_batch`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    /// Children to wrap, in order.
    pub objects: Vec<ObjectRef>,
    /// Positions consumed, including children that could not be retrieved.
    pub consumed: usize,
}

/// Rule for one dimension of children and its incremental realization.
pub trait FetchStrategy: Send + Sync + fmt::Debug {
    /// Strategy name, for logs and debug output.
    fn name(&self) -> &'static str;

    /// The dimension this strategy enumerates.
    fn dimension(&self) -> Dimension;

    /// True number of children. Never materializes anything.
    fn virtual_count(&self, store: &dyn BackingStore, object: &ObjectRef) -> usize;

    /// The child at `position` along this dimension.
    fn child_at(&self, store: &dyn BackingStore, object: &ObjectRef, position: usize) -> Option<ObjectRef>;

    /// Children not realized yet, clamped at zero when the store shrank.
    fn remaining(&self, store: &dyn BackingStore, object: &ObjectRef, realized: usize) -> usize {
        self.virtual_count(store, object).saturating_sub(realized)
    }

    /// Pulls up to `n` children starting after the `realized` already consumed.
    ///
    /// Children that cannot be retrieved are skipped but still counted in
    /// [`Batch::consumed`], so a retry never revisits them.
    fn realize_batch(
        &self,
        store: &dyn BackingStore,
        object: &ObjectRef,
        realized: usize,
        n: usize,
    ) -> Batch {
        let take = n.min(self.remaining(store, object, realized));
        let mut batch = Batch {
            objects: Vec::with_capacity(take),
            consumed: take,
        };
        for position in realized..realized + take {
            match self.child_at(store, object, position) {
                Some(child) if store.exists(&child) => batch.objects.push(child),
                _ => {
                    tracing::debug!(
                        target: "horizon_outliner::fetch",
                        strategy = self.name(),
                        %object,
                        position,
                        "child could not be retrieved, skipping"
                    );
                }
            }
        }
        batch
    }
}

/// Scene-graph children of a node.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectChildren;

impl FetchStrategy for DirectChildren {
    fn name(&self) -> &'static str {
        "direct-children"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Direct
    }

    fn virtual_count(&self, store: &dyn BackingStore, object: &ObjectRef) -> usize {
        store.child_count_of(object)
    }

    fn child_at(&self, store: &dyn BackingStore, object: &ObjectRef, position: usize) -> Option<ObjectRef> {
        store.child_at(object, position)
    }
}

/// Sub-properties of an object, in declaration order.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubProperties;

impl FetchStrategy for SubProperties {
    fn name(&self) -> &'static str {
        "sub-properties"
    }

    fn dimension(&self) -> Dimension {
        Dimension::SubProperty
    }

    fn virtual_count(&self, store: &dyn BackingStore, object: &ObjectRef) -> usize {
        store.sub_property_count_of(object)
    }

    fn child_at(&self, store: &dyn BackingStore, object: &ObjectRef, position: usize) -> Option<ObjectRef> {
        store.sub_property_at(object, position)
    }
}

/// Prims of a hosted foreign document, in document order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForeignChildren;

impl FetchStrategy for ForeignChildren {
    fn name(&self) -> &'static str {
        "foreign-children"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Foreign
    }

    fn virtual_count(&self, store: &dyn BackingStore, object: &ObjectRef) -> usize {
        store.foreign_child_count_of(object)
    }

    fn child_at(&self, store: &dyn BackingStore, object: &ObjectRef, position: usize) -> Option<ObjectRef> {
        store.foreign_child_at(object, position)
    }
}

/// Ordered set of strategies. Registration order is evaluation order.
#[derive(Debug, Default, Clone)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn FetchStrategy>>,
}

impl StrategyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The three built-in strategies: direct, then sub-property, then foreign.
    pub fn standard() -> Self {
        Self::new()
            .with(DirectChildren)
            .with(SubProperties)
            .with(ForeignChildren)
    }

    /// Appends a strategy.
    ///
    /// A later registration for a dimension that is already covered replaces
    /// the earlier one in place, keeping its position.
    pub fn with(mut self, strategy: impl FetchStrategy + 'static) -> Self {
        self.register(Arc::new(strategy));
        self
    }

    /// Appends or replaces a strategy.
    pub fn register(&mut self, strategy: Arc<dyn FetchStrategy>) {
        match self
            .strategies
            .iter_mut()
            .find(|existing| existing.dimension() == strategy.dimension())
        {
            Some(existing) => *existing = strategy,
            None => self.strategies.push(strategy),
        }
    }

    /// Strategies in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn FetchStrategy>> {
        self.strategies.iter()
    }

    /// The strategy for a dimension.
    pub fn get(&self, dimension: Dimension) -> Option<&Arc<dyn FetchStrategy>> {
        self.strategies.iter().find(|s| s.dimension() == dimension)
    }

    /// Number of registered strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outliner::memory::MemoryScene;

    #[test]
    fn test_fetch_state_from_counts() {
        assert_eq!(FetchState::from_counts(0, 250), FetchState::Unfetched);
        assert_eq!(FetchState::from_counts(0, 0), FetchState::Unfetched);
        assert_eq!(FetchState::from_counts(100, 250), FetchState::PartiallyFetched);
        assert_eq!(FetchState::from_counts(250, 250), FetchState::FullyFetched);
        // Store shrank underneath us.
        assert_eq!(FetchState::from_counts(5, 3), FetchState::FullyFetched);
    }

    #[test]
    fn test_standard_registry_order() {
        let registry = StrategyRegistry::standard();
        let dims: Vec<_> = registry.iter().map(|s| s.dimension()).collect();
        assert_eq!(dims, vec![Dimension::Direct, Dimension::SubProperty, Dimension::Foreign]);
    }

    #[test]
    fn test_register_replaces_same_dimension() {
        #[derive(Debug)]
        struct NoChildren;
        impl FetchStrategy for NoChildren {
            fn name(&self) -> &'static str {
                "none"
            }
            fn dimension(&self) -> Dimension {
                Dimension::SubProperty
            }
            fn virtual_count(&self, _: &dyn BackingStore, _: &ObjectRef) -> usize {
                0
            }
            fn child_at(&self, _: &dyn BackingStore, _: &ObjectRef, _: usize) -> Option<ObjectRef> {
                None
            }
        }

        let registry = StrategyRegistry::standard().with(NoChildren);
        assert_eq!(registry.len(), 3);
        let names: Vec<_> = registry.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["direct-children", "none", "foreign-children"]);
    }

    #[test]
    fn test_remaining_saturates() {
        let scene = MemoryScene::new();
        let root = scene.root();
        scene.add_node(&root, "a", "Box");
        assert_eq!(DirectChildren.remaining(&scene, &root, 0), 1);
        assert_eq!(DirectChildren.remaining(&scene, &root, 4), 0);
    }

    #[test]
    fn test_realize_batch_resumes() {
        let scene = MemoryScene::new();
        let root = scene.root();
        for i in 0..5 {
            scene.add_node(&root, &format!("n{i}"), "Box");
        }

        let first = DirectChildren.realize_batch(&scene, &root, 0, 3);
        assert_eq!(first.consumed, 3);
        assert_eq!(first.objects.len(), 3);

        let second = DirectChildren.realize_batch(&scene, &root, 3, 10);
        assert_eq!(second.consumed, 2);
        let names: Vec<_> = second
            .objects
            .iter()
            .filter_map(|o| scene.display_name_of(o))
            .collect();
        assert_eq!(names, vec!["n3", "n4"]);
    }

    #[test]
    fn test_realize_batch_skips_unretrievable() {
        let scene = MemoryScene::new();
        let root = scene.root();
        scene.add_node(&root, "a", "Box");
        scene.insert_unresolvable_child(&root);
        scene.add_node(&root, "c", "Box");

        let batch = DirectChildren.realize_batch(&scene, &root, 0, 10);
        assert_eq!(batch.consumed, 3);
        assert_eq!(batch.objects.len(), 2);
    }
}
