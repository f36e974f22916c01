//! The unified attribute catalog exposed to the connector framework.

use serde::Serialize;
use std::collections::BTreeMap;

/// Framework side value type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValueType {
    String,
    Boolean,
    Integer,
    /// 64-bit integer; decimals and datetimes are carried as epoch numerics
    Long,
    /// Reference to an embedded object class
    Embedded { object_class: String },
}

/// Flattened definition of one attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeInfo {
    pub name: String,
    pub value_type: ValueType,
    pub multi_valued: bool,
    pub required: bool,
    pub createable: bool,
    pub readable: bool,
    pub returned_by_default: bool,
}

impl AttributeInfo {
    /// A single-valued, read-write string attribute.
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: ValueType::String,
            multi_valued: false,
            required: false,
            createable: true,
            readable: true,
            returned_by_default: true,
        }
    }

    /// A multi-valued reference to an embedded object class.
    pub fn embedded(name: impl Into<String>, object_class: impl Into<String>) -> Self {
        Self {
            value_type: ValueType::Embedded {
                object_class: object_class.into(),
            },
            multi_valued: true,
            ..Self::string(name)
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.value_type, ValueType::Embedded { .. })
    }
}

/// Attributes of one object class, keyed by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectClassInfo {
    pub name: String,
    pub embedded: bool,
    pub attributes: BTreeMap<String, AttributeInfo>,
}

impl ObjectClassInfo {
    pub fn new(name: impl Into<String>, embedded: bool) -> Self {
        Self {
            name: name.into(),
            embedded,
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute, replacing an earlier one of the same name.
    pub fn add(&mut self, attribute: AttributeInfo) {
        self.attributes.insert(attribute.name.clone(), attribute);
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.get(name)
    }

    /// Union with another definition of the same class; `other` wins collisions.
    pub fn merge(&mut self, other: ObjectClassInfo) {
        self.embedded |= other.embedded;
        self.attributes.extend(other.attributes);
    }
}

/// Every object class known to the connector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    classes: BTreeMap<String, ObjectClassInfo>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an object class into the catalog.
    pub fn define(&mut self, class: ObjectClassInfo) {
        match self.classes.get_mut(&class.name) {
            Some(existing) => existing.merge(class),
            None => {
                self.classes.insert(class.name.clone(), class);
            }
        }
    }

    /// Merge every class of another catalog; `other` wins collisions.
    pub fn extend(&mut self, other: Catalog) {
        for class in other.classes.into_values() {
            self.define(class);
        }
    }

    pub fn object_class(&self, name: &str) -> Option<&ObjectClassInfo> {
        self.classes.get(name)
    }

    pub fn object_classes(&self) -> impl Iterator<Item = &ObjectClassInfo> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
