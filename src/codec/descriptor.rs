//! Property descriptor tables and the outbound walk over them.
//!
//! Each wire type declares its properties once, as a static table of
//! getters. [`to_bag`] walks that table, recursing into nested values with the
//! accumulated path prefix, and gates every leaf through the requested
//! attribute set and the bag's emptiness rule. Elements of multi-valued
//! complex properties are kept whole, one embedded object per element, so
//! their sub-attributes never drift apart.

use crate::resource::{
    AttributeBag, AttributePath, AttributeValue, EmbeddedObject, NAME, ResourceKind,
};
use chrono::DateTime;
use log::trace;
use std::collections::HashSet;

/// Reads the values of a leaf property.
pub type Getter<T> = fn(&T) -> Vec<AttributeValue>;

/// Walks a nested property; receives the property path as prefix.
pub type Walker<T> = fn(&T, &str, &mut Collector<'_>);

pub enum Access<T: 'static> {
    Value(Getter<T>),
    Nested(Walker<T>),
}

/// One entry of a descriptor table.
pub struct Property<T: 'static> {
    pub name: &'static str,
    pub access: Access<T>,
    /// Properties that are never returned (credentials, large member lists)
    pub serializable: bool,
}

impl<T> Property<T> {
    pub const fn value(name: &'static str, get: Getter<T>) -> Self {
        Self {
            name,
            access: Access::Value(get),
            serializable: true,
        }
    }

    pub const fn nested(name: &'static str, walk: Walker<T>) -> Self {
        Self {
            name,
            access: Access::Nested(walk),
            serializable: true,
        }
    }

    /// A property present on the wire type but never placed in a bag.
    pub const fn ignored(name: &'static str, get: Getter<T>) -> Self {
        Self {
            name,
            access: Access::Value(get),
            serializable: false,
        }
    }
}

/// A type with a static property descriptor table.
pub trait Described: Sized + 'static {
    const PROPERTIES: &'static [Property<Self>];
}

/// Accumulates leaf values during an outbound walk.
pub struct Collector<'a> {
    include: Option<&'a HashSet<String>>,
    bag: AttributeBag,
}

impl<'a> Collector<'a> {
    pub fn new(include: Option<&'a HashSet<String>>) -> Self {
        Self {
            include,
            bag: AttributeBag::new(),
        }
    }

    /// Visit every serializable property of `resource` below `prefix`.
    pub fn collect<T: Described>(&mut self, resource: &T, prefix: Option<&str>) {
        for property in T::PROPERTIES {
            if !property.serializable {
                continue;
            }
            let path = AttributePath::join(prefix, property.name);
            match property.access {
                Access::Value(get) => {
                    if self.includes(&path) {
                        self.bag.append(path, get(resource));
                    }
                }
                Access::Nested(walk) => walk(resource, &path, self),
            }
        }
    }

    /// Deliver every element of a multi-valued complex property under `path`
    /// as an embedded object of `object_class`. The element's `value` doubles
    /// as its name.
    pub fn embed<T: Described>(&mut self, path: &str, object_class: &str, values: &[T]) {
        if !self.includes_below(path) {
            return;
        }
        let objects = values.iter().map(|value| {
            let mut attributes = to_bag(value, None);
            if let Some(name) = attributes.first("value").cloned() {
                attributes.add(NAME, name);
            }
            AttributeValue::from(EmbeddedObject::new(object_class, attributes))
        });
        self.bag.append(path, objects);
    }

    fn includes(&self, path: &str) -> bool {
        self.include.is_none_or(|include| include.contains(path))
    }

    /// Whether `path` or any path below it was requested.
    fn includes_below(&self, path: &str) -> bool {
        self.include.is_none_or(|include| {
            include.iter().any(|requested| {
                requested
                    .strip_prefix(path)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
            })
        })
    }

    pub fn finish(self) -> AttributeBag {
        self.bag
    }
}

/// Outbound conversion of a described resource into an attribute bag.
pub fn to_bag<T: Described>(resource: &T, include: Option<&HashSet<String>>) -> AttributeBag {
    let mut collector = Collector::new(include);
    collector.collect(resource, None);
    collector.finish()
}

/// Walker body for an optional nested value.
pub fn walk_one<T: Described>(value: Option<&T>, path: &str, collector: &mut Collector<'_>) {
    if let Some(value) = value {
        collector.collect(value, Some(path));
    }
}

/// Walker body for a multi-valued complex value of `owner`: one embedded
/// object per element, of the class `<owner class>.<path>`.
pub fn walk_each<T: Described>(
    values: &[T],
    owner: ResourceKind,
    path: &str,
    collector: &mut Collector<'_>,
) {
    let object_class = AttributePath::join(Some(owner.object_class()), path);
    collector.embed(path, &object_class, values);
}

pub fn text(value: &Option<String>) -> Vec<AttributeValue> {
    value.iter().map(|v| AttributeValue::from(v.as_str())).collect()
}

pub fn texts(values: &[String]) -> Vec<AttributeValue> {
    values.iter().map(|v| AttributeValue::from(v.as_str())).collect()
}

pub fn flag(value: Option<bool>) -> Vec<AttributeValue> {
    value.into_iter().map(AttributeValue::Boolean).collect()
}

pub fn number(value: Option<i64>) -> Vec<AttributeValue> {
    value.into_iter().map(AttributeValue::Integer).collect()
}

/// RFC 3339 datetime as epoch milliseconds; unparseable values are dropped.
pub fn timestamp(value: &Option<String>) -> Vec<AttributeValue> {
    value
        .as_deref()
        .and_then(|raw| match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => Some(AttributeValue::Integer(parsed.timestamp_millis())),
            Err(e) => {
                trace!("Dropping unparseable datetime '{}': {}", raw, e);
                None
            }
        })
        .into_iter()
        .collect()
}
