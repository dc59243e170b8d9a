//! The backing-store interface the outliner reads its tree from.
//!
//! The outliner never owns domain objects. It holds [`ObjectRef`] handles and
//! asks a [`BackingStore`] about them every time a view needs an attribute, so
//! external edits are visible without any cache invalidation.

use std::fmt;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};

/// Opaque, cheaply clonable handle to a backing object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    /// A native scene node, identified by its scene handle.
    Scene(u64),
    /// A sub-property (parameter track, controller) of a native object.
    SubProperty(u64),
    /// A prim inside a hosted foreign document.
    Foreign {
        /// Document identifier in the store.
        document: u64,
        /// Absolute prim path within the document, `/` for the pseudo-root.
        path: Arc<str>,
    },
}

impl ObjectRef {
    /// Creates a foreign prim reference.
    pub fn foreign(document: u64, path: impl Into<Arc<str>>) -> Self {
        ObjectRef::Foreign {
            document,
            path: path.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectRef::Scene(handle) => write!(f, "scene:{handle}"),
            ObjectRef::SubProperty(handle) => write!(f, "subprop:{handle}"),
            ObjectRef::Foreign { document, path } => write!(f, "doc{document}:{path}"),
        }
    }
}

/// The closed set of object kinds the store can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// An ordinary scene node.
    SceneNode,
    /// A scene node that hosts a foreign document.
    DocumentHost,
    /// A prim inside a foreign document.
    ForeignNode,
    /// A sub-property of an object.
    SubProperty,
    /// Anything the store cannot classify, including objects that are gone.
    Unknown,
}

/// A value read from or written to a backing object.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value (also used for paths).
    Text(String),
}

impl PropertyValue {
    /// Name of the value's type, used as a type label when no controller exists.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "BooleanClass",
            PropertyValue::Int(_) => "Integer",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Text(_) => "String",
        }
    }

    /// Returns the boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value widened to a float, if numeric.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(n) => Some(*n as f64),
            PropertyValue::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Int(n) => write!(f, "{n}"),
            PropertyValue::Float(n) => write!(f, "{n}"),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Float(n)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Int(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

/// Accessors the outliner needs from the domain that owns the objects.
///
/// Every method must tolerate handles to objects that no longer exist:
/// counts are zero, lookups are `None`, writes fail with [`StoreError::Gone`].
///
/// The structural accessors (`*_count_of` / `*_at`) must return children in a
/// stable order for as long as the count does not change. Only the structural
/// accessors are required; the domain accessors default to "not available".
pub trait BackingStore: Send + Sync {
    /// Returns `true` if the object still exists.
    fn exists(&self, object: &ObjectRef) -> bool;

    /// Classifies the object. Gone objects are `Unknown`.
    fn kind_of(&self, object: &ObjectRef) -> ObjectKind;

    /// The object's name.
    fn display_name_of(&self, object: &ObjectRef) -> Option<String>;

    /// The object's class or type name.
    fn type_name_of(&self, object: &ObjectRef) -> Option<String>;

    /// Returns `true` for the single scene-root object.
    fn is_scene_root(&self, object: &ObjectRef) -> bool;

    /// Number of direct children.
    fn child_count_of(&self, object: &ObjectRef) -> usize;

    /// The direct child at `index`.
    fn child_at(&self, object: &ObjectRef, index: usize) -> Option<ObjectRef>;

    /// Number of sub-properties.
    fn sub_property_count_of(&self, object: &ObjectRef) -> usize;

    /// The sub-property at `index`.
    fn sub_property_at(&self, object: &ObjectRef, index: usize) -> Option<ObjectRef>;

    /// Number of top-level prims of a hosted document, or child prims of a prim.
    fn foreign_child_count_of(&self, object: &ObjectRef) -> usize;

    /// The foreign child at `index`, in document order.
    fn foreign_child_at(&self, object: &ObjectRef, index: usize) -> Option<ObjectRef>;

    /// Visibility as the domain computes it.
    fn is_hidden(&self, _object: &ObjectRef) -> Option<bool> {
        None
    }

    /// Changes visibility.
    fn set_hidden(&self, _object: &ObjectRef, _hidden: bool) -> StoreResult<()> {
        Err(StoreError::Unsupported)
    }

    /// The current value of a sub-property.
    fn property_value(&self, _object: &ObjectRef) -> Option<PropertyValue> {
        None
    }

    /// Writes the value of a sub-property.
    fn set_property_value(&self, _object: &ObjectRef, _value: PropertyValue) -> StoreResult<()> {
        Err(StoreError::Unsupported)
    }

    /// Returns `true` if the sub-property carries animation keys.
    fn is_animated(&self, _object: &ObjectRef) -> bool {
        false
    }

    /// File path of the document a host node embeds.
    fn document_path_of(&self, _object: &ObjectRef) -> Option<String> {
        None
    }

    /// Structural path of a foreign prim.
    fn foreign_path_of(&self, object: &ObjectRef) -> Option<String> {
        match object {
            ObjectRef::Foreign { path, .. } if self.exists(object) => Some(path.to_string()),
            _ => None,
        }
    }

    /// Asset paths of the references prepended on a foreign prim.
    fn foreign_references_of(&self, _object: &ObjectRef) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ref_display() {
        assert_eq!(ObjectRef::Scene(4).to_string(), "scene:4");
        assert_eq!(ObjectRef::foreign(2, "/World/Cube").to_string(), "doc2:/World/Cube");
    }

    #[test]
    fn test_property_value_accessors() {
        assert_eq!(PropertyValue::from(1.5).as_float(), Some(1.5));
        assert_eq!(PropertyValue::Int(3).as_float(), Some(3.0));
        assert_eq!(PropertyValue::from(true).as_bool(), Some(true));
        assert_eq!(PropertyValue::from("x").as_bool(), None);
        assert_eq!(PropertyValue::Float(0.25).type_name(), "Float");
        assert_eq!(PropertyValue::Float(0.25).to_string(), "0.25");
    }
}
