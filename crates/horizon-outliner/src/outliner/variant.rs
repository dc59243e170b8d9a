//! Item variants: per-kind display and edit semantics.
//!
//! Each realized item is one [`VariantKind`]. The variant decides which child
//! dimensions the item exposes and how its name, type, value and visibility
//! are read from (and written to) the backing store. Anything that does not
//! change during the item's life is captured once in [`Capabilities`].

use crate::error::{StoreError, StoreResult};

use super::backing::{BackingStore, ObjectRef, PropertyValue};
use super::strategy::Dimension;

/// Display name reported for objects that no longer exist.
pub const DELETED_LABEL: &str = "<deleted>";

/// Type label for untyped foreign prims.
pub const UNTYPED_PRIM_LABEL: &str = "Def";

/// The closed set of item variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// Synthetic sentinel above the scene root.
    Root,
    /// Native scene node.
    SceneNode,
    /// Scene node embedding a foreign document.
    DocumentHost,
    /// Prim of a foreign document.
    ForeignNode,
    /// Parameter or controller of an object.
    SubProperty,
    /// Fallback for kinds without a dispatch entry.
    Generic,
}

impl VariantKind {
    /// Child dimensions this variant may expose, before context filtering.
    pub fn dimensions(self) -> &'static [Dimension] {
        match self {
            VariantKind::Root => &[],
            VariantKind::SceneNode | VariantKind::Generic => {
                &[Dimension::Direct, Dimension::SubProperty]
            }
            VariantKind::DocumentHost => &[Dimension::Direct, Dimension::SubProperty, Dimension::Foreign],
            VariantKind::ForeignNode => &[Dimension::Foreign],
            VariantKind::SubProperty => &[Dimension::SubProperty],
        }
    }

    /// Short label for debug output.
    pub fn label(self) -> &'static str {
        match self {
            VariantKind::Root => "root",
            VariantKind::SceneNode => "node",
            VariantKind::DocumentHost => "host",
            VariantKind::ForeignNode => "prim",
            VariantKind::SubProperty => "subprop",
            VariantKind::Generic => "generic",
        }
    }
}

/// Per-item facts computed once at wrap time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Visibility can be toggled.
    pub can_hide: bool,
    /// Item belongs to a foreign document.
    pub foreign: bool,
    /// The value column accepts edits.
    pub value_editable: bool,
    /// The value column is a boolean checkbox.
    pub value_checkable: bool,
}

impl Capabilities {
    /// Probes the store once for the facts of a freshly wrapped object.
    pub fn detect(kind: VariantKind, store: &dyn BackingStore, object: &ObjectRef) -> Self {
        match kind {
            VariantKind::Root => Self::default(),
            VariantKind::SceneNode | VariantKind::DocumentHost | VariantKind::Generic => Self {
                can_hide: !store.is_scene_root(object),
                ..Self::default()
            },
            VariantKind::ForeignNode => Self {
                can_hide: true,
                foreign: true,
                ..Self::default()
            },
            VariantKind::SubProperty => Self {
                value_editable: true,
                value_checkable: store
                    .property_value(object)
                    .is_some_and(|v| v.as_bool().is_some()),
                ..Self::default()
            },
        }
    }
}

/// A variant together with its wrap-time capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemVariant {
    /// Which variant this is.
    pub kind: VariantKind,
    /// Wrap-time capabilities.
    pub capabilities: Capabilities,
}

impl ItemVariant {
    /// The sentinel variant.
    pub const ROOT: ItemVariant = ItemVariant {
        kind: VariantKind::Root,
        capabilities: Capabilities {
            can_hide: false,
            foreign: false,
            value_editable: false,
            value_checkable: false,
        },
    };

    /// Builds a variant and detects its capabilities.
    pub fn new(kind: VariantKind, store: &dyn BackingStore, object: &ObjectRef) -> Self {
        Self {
            kind,
            capabilities: Capabilities::detect(kind, store, object),
        }
    }

    /// The name shown in the Name column.
    pub fn display_name(&self, store: &dyn BackingStore, object: &ObjectRef) -> String {
        if !store.exists(object) {
            return DELETED_LABEL.to_string();
        }
        store
            .display_name_of(object)
            .unwrap_or_else(|| DELETED_LABEL.to_string())
    }

    /// The label shown in the Type column.
    pub fn type_label(&self, store: &dyn BackingStore, object: &ObjectRef) -> Option<String> {
        if !store.exists(object) {
            return None;
        }
        match self.kind {
            VariantKind::Root => None,
            VariantKind::ForeignNode => {
                let type_name = store.type_name_of(object).unwrap_or_default();
                if type_name.is_empty() {
                    Some(UNTYPED_PRIM_LABEL.to_string())
                } else {
                    Some(type_name)
                }
            }
            VariantKind::SubProperty => store
                .type_name_of(object)
                .or_else(|| store.property_value(object).map(|v| v.type_name().to_string())),
            _ => store.type_name_of(object),
        }
    }

    /// The content of the Value column.
    pub fn value(&self, store: &dyn BackingStore, object: &ObjectRef) -> Option<PropertyValue> {
        if !store.exists(object) {
            return None;
        }
        match self.kind {
            VariantKind::DocumentHost => store.document_path_of(object).map(PropertyValue::Text),
            VariantKind::ForeignNode => store.foreign_path_of(object).map(PropertyValue::Text),
            VariantKind::SubProperty => store.property_value(object),
            VariantKind::Root | VariantKind::SceneNode | VariantKind::Generic => None,
        }
    }

    /// Current visibility, `None` if not applicable or gone.
    pub fn is_hidden(&self, store: &dyn BackingStore, object: &ObjectRef) -> Option<bool> {
        if !store.exists(object) {
            return None;
        }
        match self.kind {
            VariantKind::Root => None,
            VariantKind::SubProperty => Some(false),
            VariantKind::SceneNode | VariantKind::DocumentHost | VariantKind::Generic
                if store.is_scene_root(object) =>
            {
                Some(false)
            }
            _ => store.is_hidden(object),
        }
    }

    /// Returns `true` if the value cell should flag animation.
    pub fn is_animated(&self, store: &dyn BackingStore, object: &ObjectRef) -> bool {
        self.kind == VariantKind::SubProperty && store.exists(object) && store.is_animated(object)
    }

    /// Hover text. Only foreign prims carry one.
    pub fn tool_tip(&self, store: &dyn BackingStore, object: &ObjectRef) -> Option<String> {
        if self.kind != VariantKind::ForeignNode || !store.exists(object) {
            return None;
        }
        let path = store.foreign_path_of(object).unwrap_or_default();
        let type_label = self.type_label(store, object).unwrap_or_default();
        let mut tip = format!("Prim Path: {path}\nType: {type_label}");
        let references = store.foreign_references_of(object);
        if !references.is_empty() {
            tip.push_str("\nHas Authored References:");
            for asset in references {
                tip.push_str("\nPrepend asset path: ");
                tip.push_str(&asset);
            }
        }
        Some(tip)
    }

    /// Changes visibility through the store.
    pub fn set_hidden(&self, store: &dyn BackingStore, object: &ObjectRef, hidden: bool) -> StoreResult<()> {
        if !store.exists(object) {
            return Err(StoreError::Gone);
        }
        if !self.capabilities.can_hide {
            return Err(StoreError::Unsupported);
        }
        store.set_hidden(object, hidden)
    }

    /// Writes the Value column through the store.
    pub fn set_value(&self, store: &dyn BackingStore, object: &ObjectRef, value: PropertyValue) -> StoreResult<()> {
        if !store.exists(object) {
            return Err(StoreError::Gone);
        }
        if !self.capabilities.value_editable {
            return Err(StoreError::Unsupported);
        }
        store.set_property_value(object, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outliner::memory::MemoryScene;

    #[test]
    fn test_scene_root_cannot_hide() {
        let scene = MemoryScene::new();
        let root = scene.root();
        let node = scene.add_node(&root, "Box001", "Box");

        let root_variant = ItemVariant::new(VariantKind::SceneNode, &scene, &root);
        let node_variant = ItemVariant::new(VariantKind::SceneNode, &scene, &node);
        assert!(!root_variant.capabilities.can_hide);
        assert!(node_variant.capabilities.can_hide);
        assert_eq!(root_variant.is_hidden(&scene, &root), Some(false));
        assert_eq!(
            root_variant.set_hidden(&scene, &root, true),
            Err(StoreError::Unsupported)
        );
    }

    #[test]
    fn test_untyped_prim_label() {
        let scene = MemoryScene::new();
        let doc = scene.add_document("/assets/set.usda");
        let prim = scene.add_prim(doc, "/World", "");
        let variant = ItemVariant::new(VariantKind::ForeignNode, &scene, &prim);
        assert_eq!(variant.type_label(&scene, &prim).as_deref(), Some("Def"));
        assert_eq!(
            variant.value(&scene, &prim),
            Some(PropertyValue::Text("/World".into()))
        );
        assert!(variant.capabilities.foreign);
    }

    #[test]
    fn test_prim_tool_tip_lists_references() {
        let scene = MemoryScene::new();
        let doc = scene.add_document("/assets/set.usda");
        let prim = scene.add_prim(doc, "/World", "Xform");
        scene.add_prim_reference(&prim, "/assets/chair.usd");

        let variant = ItemVariant::new(VariantKind::ForeignNode, &scene, &prim);
        let tip = variant.tool_tip(&scene, &prim).unwrap();
        assert_eq!(
            tip,
            "Prim Path: /World\nType: Xform\nHas Authored References:\nPrepend asset path: /assets/chair.usd"
        );
    }

    #[test]
    fn test_sub_property_type_falls_back_to_value_type() {
        let scene = MemoryScene::new();
        let root = scene.root();
        let node = scene.add_node(&root, "Box001", "Box");
        let width = scene.add_sub_property(&node, "width", PropertyValue::Float(10.0));
        let keyed = scene.add_controlled_sub_property(&node, "height", PropertyValue::Float(2.0), "Bezier_Float");
        let flag = scene.add_sub_property(&node, "realWorldMapSize", PropertyValue::Bool(true));

        let variant = ItemVariant::new(VariantKind::SubProperty, &scene, &width);
        assert_eq!(variant.type_label(&scene, &width).as_deref(), Some("Float"));
        assert_eq!(variant.is_hidden(&scene, &width), Some(false));
        assert!(variant.capabilities.value_editable);
        assert!(!variant.capabilities.value_checkable);

        let keyed_variant = ItemVariant::new(VariantKind::SubProperty, &scene, &keyed);
        assert_eq!(keyed_variant.type_label(&scene, &keyed).as_deref(), Some("Bezier_Float"));

        let flag_variant = ItemVariant::new(VariantKind::SubProperty, &scene, &flag);
        assert!(flag_variant.capabilities.value_checkable);
    }

    #[test]
    fn test_gone_object() {
        let scene = MemoryScene::new();
        let root = scene.root();
        let node = scene.add_node(&root, "Teapot001", "Teapot");
        let variant = ItemVariant::new(VariantKind::SceneNode, &scene, &node);
        scene.delete_node(&node);

        assert_eq!(variant.display_name(&scene, &node), DELETED_LABEL);
        assert_eq!(variant.type_label(&scene, &node), None);
        assert_eq!(variant.is_hidden(&scene, &node), None);
        assert_eq!(variant.set_hidden(&scene, &node, true), Err(StoreError::Gone));
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(VariantKind::ForeignNode.dimensions(), &[Dimension::Foreign]);
        assert!(VariantKind::Root.dimensions().is_empty());
        assert_eq!(
            VariantKind::Generic.dimensions(),
            VariantKind::SceneNode.dimensions()
        );
    }
}
