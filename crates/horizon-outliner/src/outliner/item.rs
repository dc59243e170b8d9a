//! Realized items and the arena that owns them.
//!
//! [`ItemTree`] stores every realized [`Item`] in a `SlotMap`. Parents own
//! their children through the `children` id list; the `parent` id is only a
//! back-reference. Clearing the arena on rebuild bumps every slot's version,
//! so ids handed out before a rebuild never resolve again.

use std::sync::Arc;

use slotmap::{new_key_type, Key, KeyData, SlotMap};

use crate::config::ModelContext;

use super::backing::{BackingStore, ObjectRef};
use super::factory::ItemFactory;
use super::strategy::{Dimension, FetchState, FetchStrategy};
use super::variant::ItemVariant;

new_key_type! {
    /// Identifier of a realized item.
    pub struct ItemId;
}

impl ItemId {
    /// Encodes the id for a model index.
    pub fn to_internal_id(self) -> u64 {
        self.data().as_ffi()
    }

    /// Decodes an id stored in a model index.
    pub fn from_internal_id(value: u64) -> Self {
        ItemId::from(KeyData::from_ffi(value))
    }
}

/// One strategy bound to one item, with the item's progress along it.
#[derive(Debug, Clone)]
pub struct StrategyBinding {
    strategy: Arc<dyn FetchStrategy>,
    realized: usize,
}

impl StrategyBinding {
    /// Binds a strategy with nothing realized.
    pub fn new(strategy: Arc<dyn FetchStrategy>) -> Self {
        Self {
            strategy,
            realized: 0,
        }
    }

    /// The bound strategy.
    pub fn strategy(&self) -> &Arc<dyn FetchStrategy> {
        &self.strategy
    }

    /// The strategy's dimension.
    pub fn dimension(&self) -> Dimension {
        self.strategy.dimension()
    }

    /// Backing positions consumed so far.
    pub fn realized(&self) -> usize {
        self.realized
    }
}

/// A realized node of the outliner.
#[derive(Debug, Clone)]
pub struct Item {
    object: Option<ObjectRef>,
    parent: Option<ItemId>,
    row: usize,
    children: Vec<ItemId>,
    bindings: Vec<StrategyBinding>,
    variant: ItemVariant,
}

impl Item {
    /// Creates an item. `object` is `None` only for the root sentinel.
    pub fn new(
        object: Option<ObjectRef>,
        parent: Option<ItemId>,
        row: usize,
        variant: ItemVariant,
        bindings: Vec<StrategyBinding>,
    ) -> Self {
        Self {
            object,
            parent,
            row,
            children: Vec::new(),
            bindings,
            variant,
        }
    }

    /// The backing object.
    pub fn object(&self) -> Option<&ObjectRef> {
        self.object.as_ref()
    }

    /// The parent item, `None` for the root sentinel.
    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    /// Position among the parent's children.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Realized children, in realization order.
    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    /// The row count reported to views.
    pub fn row_count_realized(&self) -> usize {
        self.children.len()
    }

    /// Active strategies in evaluation order.
    pub fn bindings(&self) -> &[StrategyBinding] {
        &self.bindings
    }

    /// The binding for a dimension, if active.
    pub fn binding(&self, dimension: Dimension) -> Option<&StrategyBinding> {
        self.bindings.iter().find(|b| b.dimension() == dimension)
    }

    /// The item's variant.
    pub fn variant(&self) -> &ItemVariant {
        &self.variant
    }

    /// Sum of virtual counts over active strategies.
    pub fn child_count(&self, store: &dyn BackingStore) -> usize {
        let Some(object) = &self.object else {
            return self.children.len();
        };
        self.bindings
            .iter()
            .map(|b| b.strategy.virtual_count(store, object))
            .sum()
    }

    /// Returns `true` if any active strategy reports children.
    pub fn has_children(&self, store: &dyn BackingStore) -> bool {
        let Some(object) = &self.object else {
            return !self.children.is_empty();
        };
        self.bindings
            .iter()
            .any(|b| b.strategy.virtual_count(store, object) > 0)
    }

    /// Children not realized yet, summed over active strategies.
    pub fn remaining(&self, store: &dyn BackingStore) -> usize {
        let Some(object) = &self.object else {
            return 0;
        };
        self.bindings
            .iter()
            .map(|b| b.strategy.remaining(store, object, b.realized))
            .sum()
    }

    /// Returns `true` if a fetch would realize anything.
    pub fn can_fetch_more(&self, store: &dyn BackingStore) -> bool {
        self.remaining(store) > 0
    }

    /// Progress along one dimension, `None` if the dimension is inactive.
    pub fn fetch_state(&self, store: &dyn BackingStore, dimension: Dimension) -> Option<FetchState> {
        let binding = self.binding(dimension)?;
        let object = self.object.as_ref()?;
        Some(FetchState::from_counts(
            binding.realized,
            binding.strategy.virtual_count(store, object),
        ))
    }

    /// Progress over all active dimensions.
    pub fn overall_fetch_state(&self, store: &dyn BackingStore) -> FetchState {
        let realized = self.bindings.iter().map(|b| b.realized).sum();
        FetchState::from_counts(realized, self.child_count(store))
    }
}

/// Arena of realized items under one root sentinel.
pub struct ItemTree {
    items: SlotMap<ItemId, Item>,
    root: ItemId,
    store: Arc<dyn BackingStore>,
    factory: Arc<ItemFactory>,
    context: ModelContext,
}

impl ItemTree {
    /// Creates a tree whose root sentinel holds `scene_root` as its only child.
    pub fn new(
        store: Arc<dyn BackingStore>,
        factory: Arc<ItemFactory>,
        context: ModelContext,
        scene_root: ObjectRef,
    ) -> Self {
        let mut items = SlotMap::with_key();
        let root = items.insert(Item::new(None, None, 0, ItemVariant::ROOT, Vec::new()));
        let mut tree = Self {
            items,
            root,
            store,
            factory,
            context,
        };
        tree.attach_scene_root(scene_root);
        tree
    }

    fn attach_scene_root(&mut self, scene_root: ObjectRef) {
        let child = self
            .factory
            .wrap(self.store.as_ref(), scene_root, Some(self.root), 0, &self.context);
        let id = self.items.insert(child);
        self.items[self.root].children.push(id);
    }

    /// Discards every item and starts over from a new root sentinel.
    ///
    /// All previously issued ids become stale.
    pub fn reset(&mut self, scene_root: ObjectRef, context: ModelContext) {
        self.items.clear();
        self.context = context;
        self.root = self
            .items
            .insert(Item::new(None, None, 0, ItemVariant::ROOT, Vec::new()));
        self.attach_scene_root(scene_root);
    }

    /// The root sentinel.
    pub fn root(&self) -> ItemId {
        self.root
    }

    /// The backing store items read from.
    pub fn store(&self) -> &dyn BackingStore {
        self.store.as_ref()
    }

    /// The context policy items were wrapped with.
    pub fn context(&self) -> &ModelContext {
        &self.context
    }

    /// Looks up an item.
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    /// Returns `true` if `id` belongs to the current generation.
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Number of realized items, the root sentinel excluded.
    pub fn len(&self) -> usize {
        self.items.len() - 1
    }

    /// Returns `true` if only the root sentinel exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The realized child at `row`.
    pub fn child(&self, parent: ItemId, row: usize) -> Option<ItemId> {
        self.items.get(parent)?.children.get(row).copied()
    }

    /// Realizes up to `budget` children of `id`.
    ///
    /// Strategies are visited in order; each takes what it can and hands the
    /// rest of the budget to the next. Returns the number of rows appended,
    /// which may be less than the positions consumed when children could not
    /// be retrieved.
    #[tracing::instrument(skip(self), target = "horizon_outliner::fetch", level = "debug")]
    pub fn fetch_more(&mut self, id: ItemId, budget: usize) -> usize {
        let Some(item) = self.items.get(id) else {
            return 0;
        };
        let Some(object) = item.object.clone() else {
            return 0;
        };
        let strategies: Vec<_> = item.bindings.iter().map(|b| b.strategy.clone()).collect();

        let mut budget = budget;
        let mut added = 0;
        for (slot, strategy) in strategies.iter().enumerate() {
            if budget == 0 {
                break;
            }
            let realized = self.items[id].bindings[slot].realized;
            let batch = strategy.realize_batch(self.store.as_ref(), &object, realized, budget);
            if batch.consumed == 0 {
                continue;
            }

            for child_object in batch.objects {
                let row = self.items[id].children.len();
                let child = self
                    .factory
                    .wrap(self.store.as_ref(), child_object, Some(id), row, &self.context);
                let child_id = self.items.insert(child);
                self.items[id].children.push(child_id);
                added += 1;
            }

            self.items[id].bindings[slot].realized += batch.consumed;
            budget -= batch.consumed;

            tracing::trace!(
                target: "horizon_outliner::fetch",
                strategy = strategy.name(),
                consumed = batch.consumed,
                realized = self.items[id].bindings[slot].realized,
                "strategy batch realized"
            );
        }
        added
    }

    /// Every realized item below the root sentinel, depth-first.
    pub fn iter_depth_first(&self) -> Vec<ItemId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<ItemId> = self.items[self.root].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(item) = self.items.get(id) {
                stack.extend(item.children.iter().rev().copied());
            }
        }
        out
    }
}

impl std::fmt::Debug for ItemTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemTree")
            .field("items", &self.len())
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outliner::backing::PropertyValue;
    use crate::outliner::factory::DispatchTable;
    use crate::outliner::memory::MemoryScene;
    use crate::outliner::strategy::StrategyRegistry;

    fn tree_for(scene: Arc<MemoryScene>, context: ModelContext) -> ItemTree {
        let root = scene.root();
        let factory = Arc::new(ItemFactory::new(
            DispatchTable::standard(),
            Arc::new(StrategyRegistry::standard()),
        ));
        ItemTree::new(scene, factory, context, root)
    }

    fn all_dimensions() -> ModelContext {
        ModelContext::default().with_sub_properties(true)
    }

    #[test]
    fn test_root_sentinel_holds_scene_root() {
        let scene = Arc::new(MemoryScene::new());
        let tree = tree_for(scene.clone(), ModelContext::default());

        let root = tree.get(tree.root()).unwrap();
        assert!(root.object().is_none());
        assert_eq!(root.row_count_realized(), 1);
        assert!(root.bindings().is_empty());

        let scene_root = tree.get(tree.child(tree.root(), 0).unwrap()).unwrap();
        assert_eq!(scene_root.object(), Some(&scene.root()));
        assert_eq!(scene_root.parent(), Some(tree.root()));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_fetch_more_spills_budget_across_strategies() {
        let scene = Arc::new(MemoryScene::new());
        let node = scene.add_node(&scene.root(), "Box001", "Box");
        scene.add_node(&node, "a", "Sphere");
        scene.add_node(&node, "b", "Sphere");
        for name in ["length", "width", "height"] {
            scene.add_sub_property(&node, name, PropertyValue::Float(1.0));
        }

        let mut tree = tree_for(scene.clone(), all_dimensions());
        let scene_root = tree.child(tree.root(), 0).unwrap();
        tree.fetch_more(scene_root, 100);
        let box_id = tree.child(scene_root, 0).unwrap();

        let added = tree.fetch_more(box_id, 10);
        assert_eq!(added, 5);
        let item = tree.get(box_id).unwrap();
        let names: Vec<_> = item
            .children()
            .iter()
            .map(|&c| scene.display_name_of(tree.get(c).unwrap().object().unwrap()).unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b", "length", "width", "height"]);

        for (row, &child) in item.children().iter().enumerate() {
            let child = tree.get(child).unwrap();
            assert_eq!(child.row(), row);
            assert_eq!(child.parent(), Some(box_id));
        }
    }

    #[test]
    fn test_fetch_more_resumes_without_duplicates() {
        let scene = Arc::new(MemoryScene::new());
        let root = scene.root();
        for i in 0..7 {
            scene.add_node(&root, &format!("n{i}"), "Box");
        }
        let mut tree = tree_for(scene.clone(), ModelContext::default());
        let scene_root = tree.child(tree.root(), 0).unwrap();

        assert_eq!(tree.fetch_more(scene_root, 3), 3);
        assert_eq!(tree.fetch_more(scene_root, 3), 3);
        assert_eq!(tree.fetch_more(scene_root, 3), 1);
        assert_eq!(tree.fetch_more(scene_root, 3), 0);

        let item = tree.get(scene_root).unwrap();
        let mut objects: Vec<_> = item
            .children()
            .iter()
            .map(|&c| tree.get(c).unwrap().object().unwrap().clone())
            .collect();
        objects.dedup();
        assert_eq!(objects.len(), 7);
        assert_eq!(item.overall_fetch_state(tree.store()), FetchState::FullyFetched);
    }

    #[test]
    fn test_disabled_dimension_is_not_bound() {
        let scene = Arc::new(MemoryScene::new());
        scene.add_sub_property(&scene.root(), "ambient", PropertyValue::Float(0.5));
        let tree = tree_for(scene, ModelContext::default());
        let scene_root = tree.get(tree.child(tree.root(), 0).unwrap()).unwrap();

        assert!(scene_root.binding(Dimension::Direct).is_some());
        assert!(scene_root.binding(Dimension::SubProperty).is_none());
        assert!(!scene_root.has_children(tree.store()));
        assert!(!scene_root.can_fetch_more(tree.store()));
    }

    #[test]
    fn test_stale_child_is_skipped_but_counted() {
        let scene = Arc::new(MemoryScene::new());
        let root = scene.root();
        scene.add_node(&root, "a", "Box");
        scene.insert_unresolvable_child(&root);
        scene.add_node(&root, "c", "Box");

        let mut tree = tree_for(scene, ModelContext::default());
        let scene_root = tree.child(tree.root(), 0).unwrap();
        assert_eq!(tree.fetch_more(scene_root, 100), 2);

        let item = tree.get(scene_root).unwrap();
        assert_eq!(item.binding(Dimension::Direct).unwrap().realized(), 3);
        assert!(!item.can_fetch_more(tree.store()));
    }

    #[test]
    fn test_remaining_saturates_after_external_delete() {
        let scene = Arc::new(MemoryScene::new());
        let root = scene.root();
        let a = scene.add_node(&root, "a", "Box");
        scene.add_node(&root, "b", "Box");

        let mut tree = tree_for(scene.clone(), ModelContext::default());
        let scene_root = tree.child(tree.root(), 0).unwrap();
        tree.fetch_more(scene_root, 100);
        scene.delete_node(&a);

        let item = tree.get(scene_root).unwrap();
        assert_eq!(item.remaining(tree.store()), 0);
        assert_eq!(item.row_count_realized(), 2);
        assert_eq!(tree.fetch_more(scene_root, 100), 0);
    }

    #[test]
    fn test_reset_invalidates_ids() {
        let scene = Arc::new(MemoryScene::new());
        scene.add_node(&scene.root(), "a", "Box");
        let mut tree = tree_for(scene.clone(), ModelContext::default());
        let old_root = tree.root();
        let old_scene_root = tree.child(old_root, 0).unwrap();
        tree.fetch_more(old_scene_root, 100);
        assert_eq!(tree.len(), 2);

        tree.reset(scene.root(), ModelContext::default());
        assert!(!tree.contains(old_root));
        assert!(!tree.contains(old_scene_root));
        assert!(tree.get(ItemId::from_internal_id(old_scene_root.to_internal_id())).is_none());
        assert_eq!(tree.len(), 1);

        let scene_root = tree.get(tree.child(tree.root(), 0).unwrap()).unwrap();
        assert_eq!(scene_root.overall_fetch_state(tree.store()), FetchState::Unfetched);
    }

    #[test]
    fn test_iter_depth_first() {
        let scene = Arc::new(MemoryScene::new());
        let root = scene.root();
        let a = scene.add_node(&root, "a", "Dummy");
        scene.add_node(&a, "a1", "Box");
        scene.add_node(&root, "b", "Box");

        let mut tree = tree_for(scene.clone(), ModelContext::default());
        let scene_root = tree.child(tree.root(), 0).unwrap();
        tree.fetch_more(scene_root, 100);
        let a_id = tree.child(scene_root, 0).unwrap();
        tree.fetch_more(a_id, 100);

        let names: Vec<_> = tree
            .iter_depth_first()
            .into_iter()
            .map(|id| scene.display_name_of(tree.get(id).unwrap().object().unwrap()).unwrap())
            .collect();
        assert_eq!(names, vec!["Scene Root", "a", "a1", "b"]);
    }
}
