//! An in-memory backing store.
//!
//! `MemoryScene` holds a scene graph of nodes, their sub-properties, and any
//! number of foreign documents made of prims. It implements [`BackingStore`]
//! and is what the demo and the tests drive the outliner with.
//!
//! ```
//! use horizon_outliner::outliner::{BackingStore, MemoryScene, PropertyValue};
//!
//! let scene = MemoryScene::new();
//! let root = scene.root();
//! let teapot = scene.add_node(&root, "Teapot001", "Teapot");
//! scene.add_sub_property(&teapot, "radius", PropertyValue::Float(25.0));
//!
//! assert_eq!(scene.child_count_of(&root), 1);
//! assert_eq!(scene.sub_property_count_of(&teapot), 1);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};

use super::backing::{BackingStore, ObjectKind, ObjectRef, PropertyValue};

/// Name of the scene root node.
pub const SCENE_ROOT_NAME: &str = "Scene Root";

const PSEUDO_ROOT: &str = "/";

#[derive(Debug, Clone)]
struct Node {
    name: String,
    class: String,
    kind: ObjectKind,
    parent: Option<u64>,
    children: Vec<u64>,
    sub_properties: Vec<u64>,
    hidden: bool,
    document: Option<u64>,
}

#[derive(Debug, Clone)]
struct SubProperty {
    name: String,
    owner: ObjectRef,
    value: Option<PropertyValue>,
    controller: Option<String>,
    animated: bool,
    sub_properties: Vec<u64>,
    rejection: Option<String>,
}

#[derive(Debug, Clone)]
struct Prim {
    name: String,
    type_name: String,
    children: Vec<Arc<str>>,
    invisible: bool,
    references: Vec<String>,
}

#[derive(Debug, Clone)]
struct Document {
    file_path: String,
    prims: HashMap<Arc<str>, Prim>,
}

#[derive(Debug, Default)]
struct SceneData {
    next_handle: u64,
    root: u64,
    nodes: HashMap<u64, Node>,
    sub_properties: HashMap<u64, SubProperty>,
    documents: HashMap<u64, Document>,
}

impl SceneData {
    fn allocate(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn prim(&self, object: &ObjectRef) -> Option<&Prim> {
        match object {
            ObjectRef::Foreign { document, path } => {
                self.documents.get(document).and_then(|doc| doc.prims.get(path))
            }
            _ => None,
        }
    }

    fn prim_mut(&mut self, object: &ObjectRef) -> Option<&mut Prim> {
        match object {
            ObjectRef::Foreign { document, path } => self
                .documents
                .get_mut(document)
                .and_then(|doc| doc.prims.get_mut(path)),
            _ => None,
        }
    }

    fn sub_property_list(&self, object: &ObjectRef) -> Option<&Vec<u64>> {
        match object {
            ObjectRef::Scene(handle) => self.nodes.get(handle).map(|n| &n.sub_properties),
            ObjectRef::SubProperty(handle) => {
                self.sub_properties.get(handle).map(|s| &s.sub_properties)
            }
            ObjectRef::Foreign { .. } => None,
        }
    }

    fn sub_property_list_mut(&mut self, object: &ObjectRef) -> Option<&mut Vec<u64>> {
        match object {
            ObjectRef::Scene(handle) => self.nodes.get_mut(handle).map(|n| &mut n.sub_properties),
            ObjectRef::SubProperty(handle) => self
                .sub_properties
                .get_mut(handle)
                .map(|s| &mut s.sub_properties),
            ObjectRef::Foreign { .. } => None,
        }
    }

    fn remove_sub_properties(&mut self, handles: Vec<u64>) {
        for handle in handles {
            if let Some(removed) = self.sub_properties.remove(&handle) {
                self.remove_sub_properties(removed.sub_properties);
            }
        }
    }

    fn remove_node_tree(&mut self, handle: u64) {
        if let Some(node) = self.nodes.remove(&handle) {
            self.remove_sub_properties(node.sub_properties);
            for child in node.children {
                self.remove_node_tree(child);
            }
        }
    }

    /// Visibility as computed through the prim's ancestors.
    fn prim_hidden(&self, document: u64, path: &str) -> Option<bool> {
        let doc = self.documents.get(&document)?;
        doc.prims.get(path)?;
        let mut current = Some(path);
        while let Some(p) = current {
            if doc.prims.get(p).is_some_and(|prim| prim.invisible) {
                return Some(true);
            }
            current = parent_path(p);
        }
        Some(false)
    }
}

fn parent_path(path: &str) -> Option<&str> {
    if path == PSEUDO_ROOT {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(PSEUDO_ROOT),
        Some(i) => Some(&path[..i]),
        None => None,
    }
}

fn leaf_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// In-memory scene with sub-properties and hosted foreign documents.
#[derive(Debug)]
pub struct MemoryScene {
    data: RwLock<SceneData>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// Creates a scene holding only its root node.
    pub fn new() -> Self {
        let mut data = SceneData::default();
        let root = data.allocate();
        data.root = root;
        data.nodes.insert(
            root,
            Node {
                name: SCENE_ROOT_NAME.to_string(),
                class: "RootNode".to_string(),
                kind: ObjectKind::SceneNode,
                parent: None,
                children: Vec::new(),
                sub_properties: Vec::new(),
                hidden: false,
                document: None,
            },
        );
        Self {
            data: RwLock::new(data),
        }
    }

    /// The scene root node.
    pub fn root(&self) -> ObjectRef {
        ObjectRef::Scene(self.data.read().root)
    }

    /// Adds an ordinary scene node under `parent`.
    pub fn add_node(&self, parent: &ObjectRef, name: &str, class: &str) -> ObjectRef {
        self.add_object(parent, name, class, ObjectKind::SceneNode)
    }

    /// Adds a scene node of an arbitrary kind under `parent`.
    ///
    /// Nodes whose parent is not a live scene node are created detached.
    pub fn add_object(&self, parent: &ObjectRef, name: &str, class: &str, kind: ObjectKind) -> ObjectRef {
        let mut data = self.data.write();
        let handle = data.allocate();
        let parent_handle = match parent {
            ObjectRef::Scene(p) => data.nodes.get_mut(p).map(|node| {
                node.children.push(handle);
                *p
            }),
            _ => None,
        };
        data.nodes.insert(
            handle,
            Node {
                name: name.to_string(),
                class: class.to_string(),
                kind,
                parent: parent_handle,
                children: Vec::new(),
                sub_properties: Vec::new(),
                hidden: false,
                document: None,
            },
        );
        ObjectRef::Scene(handle)
    }

    /// Registers a foreign document and returns its identifier.
    pub fn add_document(&self, file_path: &str) -> u64 {
        let mut data = self.data.write();
        let id = data.allocate();
        let mut prims = HashMap::new();
        prims.insert(
            Arc::from(PSEUDO_ROOT),
            Prim {
                name: PSEUDO_ROOT.to_string(),
                type_name: String::new(),
                children: Vec::new(),
                invisible: false,
                references: Vec::new(),
            },
        );
        data.documents.insert(
            id,
            Document {
                file_path: file_path.to_string(),
                prims,
            },
        );
        id
    }

    /// Adds a scene node that hosts `document`.
    pub fn add_document_host(&self, parent: &ObjectRef, name: &str, document: u64) -> ObjectRef {
        let host = self.add_object(parent, name, "UsdStageObject", ObjectKind::DocumentHost);
        if let ObjectRef::Scene(handle) = &host
            && let Some(node) = self.data.write().nodes.get_mut(handle)
        {
            node.document = Some(document);
        }
        host
    }

    /// Defines a prim at `path`, creating untyped ancestors as needed.
    ///
    /// Redefining an existing prim only updates its type.
    pub fn add_prim(&self, document: u64, path: &str, type_name: &str) -> ObjectRef {
        let mut data = self.data.write();
        if let Some(doc) = data.documents.get_mut(&document) {
            define_prim(doc, path, type_name);
        }
        ObjectRef::foreign(document, path)
    }

    /// Prepends a reference arc on a prim.
    pub fn add_prim_reference(&self, prim: &ObjectRef, asset_path: &str) {
        if let Some(prim) = self.data.write().prim_mut(prim) {
            prim.references.push(asset_path.to_string());
        }
    }

    /// Sets the prim's own visibility attribute without touching ancestors.
    pub fn set_prim_invisible(&self, prim: &ObjectRef, invisible: bool) {
        if let Some(prim) = self.data.write().prim_mut(prim) {
            prim.invisible = invisible;
        }
    }

    /// Removes a prim and its descendants.
    pub fn remove_prim(&self, prim: &ObjectRef) {
        let ObjectRef::Foreign { document, path } = prim else {
            return;
        };
        let mut data = self.data.write();
        let Some(doc) = data.documents.get_mut(document) else {
            return;
        };
        let prefix = format!("{path}/");
        doc.prims
            .retain(|p, _| p.as_ref() != path.as_ref() && !p.starts_with(&prefix));
        if let Some(parent) = parent_path(path)
            && let Some(parent) = doc.prims.get_mut(parent)
        {
            parent.children.retain(|c| c != path);
        }
    }

    /// Closes a document. Its prims become gone; hosts report no foreign children.
    pub fn close_document(&self, document: u64) {
        self.data.write().documents.remove(&document);
    }

    /// Adds a sub-property to a node or to another sub-property.
    pub fn add_sub_property(&self, owner: &ObjectRef, name: &str, value: PropertyValue) -> ObjectRef {
        self.insert_sub_property(owner, name, Some(value), None)
    }

    /// Adds a sub-property driven by a controller of class `controller`.
    pub fn add_controlled_sub_property(
        &self,
        owner: &ObjectRef,
        name: &str,
        value: PropertyValue,
        controller: &str,
    ) -> ObjectRef {
        self.insert_sub_property(owner, name, Some(value), Some(controller.to_string()))
    }

    /// Adds a value-less sub-property that only groups other sub-properties.
    pub fn add_sub_property_group(&self, owner: &ObjectRef, name: &str) -> ObjectRef {
        self.insert_sub_property(owner, name, None, None)
    }

    fn insert_sub_property(
        &self,
        owner: &ObjectRef,
        name: &str,
        value: Option<PropertyValue>,
        controller: Option<String>,
    ) -> ObjectRef {
        let mut data = self.data.write();
        let handle = data.allocate();
        if let Some(list) = data.sub_property_list_mut(owner) {
            list.push(handle);
        }
        data.sub_properties.insert(
            handle,
            SubProperty {
                name: name.to_string(),
                owner: owner.clone(),
                value,
                controller,
                animated: false,
                sub_properties: Vec::new(),
                rejection: None,
            },
        );
        ObjectRef::SubProperty(handle)
    }

    /// Marks a sub-property as carrying animation keys.
    pub fn set_animated(&self, sub_property: &ObjectRef, animated: bool) {
        if let ObjectRef::SubProperty(handle) = sub_property
            && let Some(prop) = self.data.write().sub_properties.get_mut(handle)
        {
            prop.animated = animated;
        }
    }

    /// Makes value writes to a sub-property fail with `message`.
    pub fn reject_writes(&self, sub_property: &ObjectRef, message: &str) {
        if let ObjectRef::SubProperty(handle) = sub_property
            && let Some(prop) = self.data.write().sub_properties.get_mut(handle)
        {
            prop.rejection = Some(message.to_string());
        }
    }

    /// Deletes a node, its descendants and their sub-properties.
    ///
    /// Handles held elsewhere become stale; nothing is notified.
    pub fn delete_node(&self, node: &ObjectRef) {
        let ObjectRef::Scene(handle) = node else {
            return;
        };
        let mut data = self.data.write();
        if *handle == data.root {
            return;
        }
        if let Some(parent) = data.nodes.get(handle).and_then(|n| n.parent)
            && let Some(parent) = data.nodes.get_mut(&parent)
        {
            parent.children.retain(|c| c != handle);
        }
        data.remove_node_tree(*handle);
    }

    /// Deletes a sub-property and everything nested in it.
    pub fn delete_sub_property(&self, sub_property: &ObjectRef) {
        let ObjectRef::SubProperty(handle) = sub_property else {
            return;
        };
        let mut data = self.data.write();
        if let Some(owner) = data.sub_properties.get(handle).map(|s| s.owner.clone())
            && let Some(list) = data.sub_property_list_mut(&owner)
        {
            list.retain(|c| c != handle);
        }
        data.remove_sub_properties(vec![*handle]);
    }

    /// Lists a child handle under `parent` that resolves to no object.
    ///
    /// Simulates a store whose child count runs ahead of what it can deliver.
    pub fn insert_unresolvable_child(&self, parent: &ObjectRef) {
        let mut data = self.data.write();
        let handle = data.allocate();
        if let ObjectRef::Scene(p) = parent
            && let Some(node) = data.nodes.get_mut(p)
        {
            node.children.push(handle);
        }
    }

    /// Renames a node.
    pub fn rename(&self, node: &ObjectRef, name: &str) {
        if let ObjectRef::Scene(handle) = node
            && let Some(node) = self.data.write().nodes.get_mut(handle)
        {
            node.name = name.to_string();
        }
    }
}

fn define_prim(doc: &mut Document, path: &str, type_name: &str) {
    if let Some(existing) = doc.prims.get_mut(path) {
        existing.type_name = type_name.to_string();
        return;
    }
    let Some(parent) = parent_path(path) else {
        return;
    };
    if !doc.prims.contains_key(parent) {
        define_prim(doc, parent, "");
    }
    let key: Arc<str> = Arc::from(path);
    if let Some(parent) = doc.prims.get_mut(parent) {
        parent.children.push(key.clone());
    }
    doc.prims.insert(
        key,
        Prim {
            name: leaf_name(path).to_string(),
            type_name: type_name.to_string(),
            children: Vec::new(),
            invisible: false,
            references: Vec::new(),
        },
    );
}

impl BackingStore for MemoryScene {
    fn exists(&self, object: &ObjectRef) -> bool {
        let data = self.data.read();
        match object {
            ObjectRef::Scene(handle) => data.nodes.contains_key(handle),
            ObjectRef::SubProperty(handle) => data.sub_properties.contains_key(handle),
            ObjectRef::Foreign { .. } => data.prim(object).is_some(),
        }
    }

    fn kind_of(&self, object: &ObjectRef) -> ObjectKind {
        let data = self.data.read();
        match object {
            ObjectRef::Scene(handle) => data.nodes.get(handle).map_or(ObjectKind::Unknown, |n| n.kind),
            ObjectRef::SubProperty(handle) if data.sub_properties.contains_key(handle) => {
                ObjectKind::SubProperty
            }
            ObjectRef::Foreign { .. } if data.prim(object).is_some() => ObjectKind::ForeignNode,
            _ => ObjectKind::Unknown,
        }
    }

    fn display_name_of(&self, object: &ObjectRef) -> Option<String> {
        let data = self.data.read();
        match object {
            ObjectRef::Scene(handle) => data.nodes.get(handle).map(|n| n.name.clone()),
            ObjectRef::SubProperty(handle) => data.sub_properties.get(handle).map(|s| s.name.clone()),
            ObjectRef::Foreign { .. } => data.prim(object).map(|p| p.name.clone()),
        }
    }

    fn type_name_of(&self, object: &ObjectRef) -> Option<String> {
        let data = self.data.read();
        match object {
            ObjectRef::Scene(handle) => data.nodes.get(handle).map(|n| n.class.clone()),
            ObjectRef::SubProperty(handle) => {
                data.sub_properties.get(handle).and_then(|s| s.controller.clone())
            }
            ObjectRef::Foreign { .. } => data.prim(object).map(|p| p.type_name.clone()),
        }
    }

    fn is_scene_root(&self, object: &ObjectRef) -> bool {
        matches!(object, ObjectRef::Scene(handle) if *handle == self.data.read().root)
    }

    fn child_count_of(&self, object: &ObjectRef) -> usize {
        match object {
            ObjectRef::Scene(handle) => self
                .data
                .read()
                .nodes
                .get(handle)
                .map_or(0, |n| n.children.len()),
            _ => 0,
        }
    }

    fn child_at(&self, object: &ObjectRef, index: usize) -> Option<ObjectRef> {
        let data = self.data.read();
        match object {
            ObjectRef::Scene(handle) => {
                let child = *data.nodes.get(handle)?.children.get(index)?;
                data.nodes.contains_key(&child).then_some(ObjectRef::Scene(child))
            }
            _ => None,
        }
    }

    fn sub_property_count_of(&self, object: &ObjectRef) -> usize {
        self.data.read().sub_property_list(object).map_or(0, Vec::len)
    }

    fn sub_property_at(&self, object: &ObjectRef, index: usize) -> Option<ObjectRef> {
        let data = self.data.read();
        let handle = *data.sub_property_list(object)?.get(index)?;
        data.sub_properties
            .contains_key(&handle)
            .then_some(ObjectRef::SubProperty(handle))
    }

    fn foreign_child_count_of(&self, object: &ObjectRef) -> usize {
        let data = self.data.read();
        match object {
            ObjectRef::Scene(handle) => data
                .nodes
                .get(handle)
                .and_then(|n| n.document)
                .and_then(|doc| data.documents.get(&doc))
                .and_then(|doc| doc.prims.get(PSEUDO_ROOT))
                .map_or(0, |root| root.children.len()),
            ObjectRef::Foreign { .. } => data.prim(object).map_or(0, |p| p.children.len()),
            ObjectRef::SubProperty(_) => 0,
        }
    }

    fn foreign_child_at(&self, object: &ObjectRef, index: usize) -> Option<ObjectRef> {
        let data = self.data.read();
        match object {
            ObjectRef::Scene(handle) => {
                let document = data.nodes.get(handle)?.document?;
                let root = data.documents.get(&document)?.prims.get(PSEUDO_ROOT)?;
                let path = root.children.get(index)?;
                Some(ObjectRef::Foreign {
                    document,
                    path: path.clone(),
                })
            }
            ObjectRef::Foreign { document, .. } => {
                let path = data.prim(object)?.children.get(index)?;
                Some(ObjectRef::Foreign {
                    document: *document,
                    path: path.clone(),
                })
            }
            ObjectRef::SubProperty(_) => None,
        }
    }

    fn is_hidden(&self, object: &ObjectRef) -> Option<bool> {
        let data = self.data.read();
        match object {
            ObjectRef::Scene(handle) => data.nodes.get(handle).map(|n| n.hidden),
            ObjectRef::SubProperty(_) => None,
            ObjectRef::Foreign { document, path } => data.prim_hidden(*document, path),
        }
    }

    fn set_hidden(&self, object: &ObjectRef, hidden: bool) -> StoreResult<()> {
        let mut data = self.data.write();
        match object {
            ObjectRef::Scene(handle) => {
                let node = data.nodes.get_mut(handle).ok_or(StoreError::Gone)?;
                node.hidden = hidden;
                Ok(())
            }
            ObjectRef::SubProperty(_) => Err(StoreError::Unsupported),
            ObjectRef::Foreign { document, path } => {
                let doc = data.documents.get_mut(document).ok_or(StoreError::Gone)?;
                if !doc.prims.contains_key(path.as_ref()) {
                    return Err(StoreError::Gone);
                }
                if hidden {
                    if let Some(prim) = doc.prims.get_mut(path.as_ref()) {
                        prim.invisible = true;
                    }
                } else {
                    // Making a prim visible clears the attribute along its ancestry.
                    let mut current = Some(path.as_ref());
                    while let Some(p) = current {
                        if let Some(prim) = doc.prims.get_mut(p) {
                            prim.invisible = false;
                        }
                        current = parent_path(p);
                    }
                }
                Ok(())
            }
        }
    }

    fn property_value(&self, object: &ObjectRef) -> Option<PropertyValue> {
        match object {
            ObjectRef::SubProperty(handle) => self
                .data
                .read()
                .sub_properties
                .get(handle)
                .and_then(|s| s.value.clone()),
            _ => None,
        }
    }

    fn set_property_value(&self, object: &ObjectRef, value: PropertyValue) -> StoreResult<()> {
        let ObjectRef::SubProperty(handle) = object else {
            return Err(StoreError::Unsupported);
        };
        let mut data = self.data.write();
        let prop = data.sub_properties.get_mut(handle).ok_or(StoreError::Gone)?;
        if let Some(message) = &prop.rejection {
            return Err(StoreError::rejected(message.clone()));
        }
        let Some(current) = &prop.value else {
            return Err(StoreError::Unsupported);
        };
        let coerced = match (current, value) {
            (PropertyValue::Float(_), v) => v
                .as_float()
                .map(PropertyValue::Float)
                .ok_or_else(|| StoreError::rejected("expected a number"))?,
            (PropertyValue::Int(_), PropertyValue::Int(n)) => PropertyValue::Int(n),
            (PropertyValue::Int(_), PropertyValue::Float(n)) if n.fract() == 0.0 => {
                PropertyValue::Int(n as i64)
            }
            (PropertyValue::Bool(_), PropertyValue::Bool(b)) => PropertyValue::Bool(b),
            (PropertyValue::Text(_), v) => PropertyValue::Text(v.to_string()),
            (current, _) => {
                return Err(StoreError::rejected(format!(
                    "expected a value of type {}",
                    current.type_name()
                )));
            }
        };
        prop.value = Some(coerced);
        Ok(())
    }

    fn is_animated(&self, object: &ObjectRef) -> bool {
        match object {
            ObjectRef::SubProperty(handle) => self
                .data
                .read()
                .sub_properties
                .get(handle)
                .is_some_and(|s| s.animated),
            _ => false,
        }
    }

    fn document_path_of(&self, object: &ObjectRef) -> Option<String> {
        let data = self.data.read();
        match object {
            ObjectRef::Scene(handle) => data
                .nodes
                .get(handle)
                .and_then(|n| n.document)
                .and_then(|doc| data.documents.get(&doc))
                .map(|doc| doc.file_path.clone()),
            _ => None,
        }
    }

    fn foreign_references_of(&self, object: &ObjectRef) -> Vec<String> {
        self.data
            .read()
            .prim(object)
            .map(|p| p.references.clone())
            .unwrap_or_default()
    }
}

static_assertions::assert_impl_all!(MemoryScene: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_root() {
        let scene = MemoryScene::new();
        let root = scene.root();
        assert!(scene.is_scene_root(&root));
        assert_eq!(scene.display_name_of(&root).as_deref(), Some(SCENE_ROOT_NAME));
        assert_eq!(scene.kind_of(&root), ObjectKind::SceneNode);
        assert_eq!(scene.child_count_of(&root), 0);
    }

    #[test]
    fn test_nodes_in_declaration_order() {
        let scene = MemoryScene::new();
        let root = scene.root();
        let a = scene.add_node(&root, "a", "Box");
        let b = scene.add_node(&root, "b", "Sphere");
        assert_eq!(scene.child_at(&root, 0), Some(a));
        assert_eq!(scene.child_at(&root, 1), Some(b.clone()));
        assert_eq!(scene.child_at(&root, 2), None);
        assert_eq!(scene.type_name_of(&b).as_deref(), Some("Sphere"));
        assert!(!scene.is_scene_root(&b));
    }

    #[test]
    fn test_delete_node_makes_handles_stale() {
        let scene = MemoryScene::new();
        let root = scene.root();
        let parent = scene.add_node(&root, "parent", "Dummy");
        let child = scene.add_node(&parent, "child", "Box");
        let prop = scene.add_sub_property(&child, "length", PropertyValue::Float(1.0));

        scene.delete_node(&parent);
        assert!(!scene.exists(&parent));
        assert!(!scene.exists(&child));
        assert!(!scene.exists(&prop));
        assert_eq!(scene.kind_of(&child), ObjectKind::Unknown);
        assert_eq!(scene.child_count_of(&root), 0);
        assert_eq!(scene.set_hidden(&child, true), Err(StoreError::Gone));
    }

    #[test]
    fn test_scene_root_is_not_deletable() {
        let scene = MemoryScene::new();
        let root = scene.root();
        scene.delete_node(&root);
        assert!(scene.exists(&root));
    }

    #[test]
    fn test_document_host_exposes_top_level_prims() {
        let scene = MemoryScene::new();
        let doc = scene.add_document("/assets/kitchen.usda");
        scene.add_prim(doc, "/World/Table/Top", "Mesh");
        scene.add_prim(doc, "/Looks", "Scope");
        let host = scene.add_document_host(&scene.root(), "Kitchen", doc);

        assert_eq!(scene.kind_of(&host), ObjectKind::DocumentHost);
        assert_eq!(scene.document_path_of(&host).as_deref(), Some("/assets/kitchen.usda"));
        assert_eq!(scene.foreign_child_count_of(&host), 2);

        let world = scene.foreign_child_at(&host, 0).unwrap();
        assert_eq!(world, ObjectRef::foreign(doc, "/World"));
        assert_eq!(scene.type_name_of(&world).as_deref(), Some(""));
        assert_eq!(scene.foreign_child_count_of(&world), 1);

        let table = scene.foreign_child_at(&world, 0).unwrap();
        assert_eq!(scene.display_name_of(&table).as_deref(), Some("Table"));
        assert_eq!(scene.foreign_path_of(&table).as_deref(), Some("/World/Table"));
    }

    #[test]
    fn test_prim_visibility_is_inherited() {
        let scene = MemoryScene::new();
        let doc = scene.add_document("/assets/set.usda");
        let world = scene.add_prim(doc, "/World", "Xform");
        let cube = scene.add_prim(doc, "/World/Cube", "Cube");

        scene.set_prim_invisible(&world, true);
        assert_eq!(scene.is_hidden(&cube), Some(true));

        scene.set_hidden(&cube, false).unwrap();
        assert_eq!(scene.is_hidden(&cube), Some(false));
        assert_eq!(scene.is_hidden(&world), Some(false));
    }

    #[test]
    fn test_remove_prim_and_close_document() {
        let scene = MemoryScene::new();
        let doc = scene.add_document("/assets/set.usda");
        let world = scene.add_prim(doc, "/World", "Xform");
        let cube = scene.add_prim(doc, "/World/Cube", "Cube");
        let host = scene.add_document_host(&scene.root(), "Set", doc);

        scene.remove_prim(&world);
        assert!(!scene.exists(&cube));
        assert_eq!(scene.foreign_child_count_of(&host), 0);

        let sky = scene.add_prim(doc, "/Sky", "DomeLight");
        scene.close_document(doc);
        assert!(!scene.exists(&sky));
        assert_eq!(scene.foreign_child_count_of(&host), 0);
        assert_eq!(scene.document_path_of(&host), None);
    }

    #[test]
    fn test_nested_sub_properties() {
        let scene = MemoryScene::new();
        let node = scene.add_node(&scene.root(), "Box001", "Box");
        let transform = scene.add_sub_property_group(&node, "Transform");
        let position = scene.add_controlled_sub_property(
            &transform,
            "Position",
            PropertyValue::Float(0.0),
            "Position_XYZ",
        );

        assert_eq!(scene.sub_property_count_of(&node), 1);
        assert_eq!(scene.sub_property_at(&transform, 0), Some(position.clone()));
        assert_eq!(scene.property_value(&transform), None);
        assert_eq!(scene.type_name_of(&position).as_deref(), Some("Position_XYZ"));

        scene.delete_sub_property(&transform);
        assert!(!scene.exists(&position));
        assert_eq!(scene.sub_property_count_of(&node), 0);
    }

    #[test]
    fn test_set_property_value_coerces_and_rejects() {
        let scene = MemoryScene::new();
        let node = scene.add_node(&scene.root(), "Box001", "Box");
        let width = scene.add_sub_property(&node, "width", PropertyValue::Float(1.0));
        let segments = scene.add_sub_property(&node, "segments", PropertyValue::Int(4));

        scene.set_property_value(&width, PropertyValue::Int(3)).unwrap();
        assert_eq!(scene.property_value(&width), Some(PropertyValue::Float(3.0)));

        assert!(matches!(
            scene.set_property_value(&segments, PropertyValue::from("many")),
            Err(StoreError::Rejected(_))
        ));

        scene.reject_writes(&width, "locked");
        assert_eq!(
            scene.set_property_value(&width, PropertyValue::Float(2.0)),
            Err(StoreError::rejected("locked"))
        );
    }

    #[test]
    fn test_unresolvable_child() {
        let scene = MemoryScene::new();
        let root = scene.root();
        scene.insert_unresolvable_child(&root);
        assert_eq!(scene.child_count_of(&root), 1);
        assert_eq!(scene.child_at(&root, 0), None);
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("/World/Cube"), Some("/World"));
        assert_eq!(parent_path("/World"), Some("/"));
        assert_eq!(parent_path("/"), None);
        assert_eq!(leaf_name("/World/Cube"), "Cube");
    }
}
