//! The flat attribute bag exchanged with the connector framework.
//!
//! A bag maps an attribute path to an ordered, non-empty list of values.
//! Nested structure is expressed through dotted paths (`name.familyName`).
//! Every insertion goes through the same emptiness gate, so a bag never holds
//! a blank string, an empty list or an empty embedded object.

use super::value::AttributeValue;
use std::collections::BTreeMap;

/// Reserved name of the identifier pseudo-attribute.
pub const UID: &str = "__UID__";
/// Reserved name of the display name pseudo-attribute.
pub const NAME: &str = "__NAME__";
/// Reserved name of the enabled flag pseudo-attribute.
pub const ENABLE: &str = "__ENABLE__";
/// Reserved name of the credential pseudo-attribute.
pub const PASSWORD: &str = "__PASSWORD__";

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

/// Helpers for dotted attribute paths.
pub struct AttributePath;

impl AttributePath {
    /// Join a parent prefix and a field name.
    pub fn join(prefix: Option<&str>, name: &str) -> String {
        match prefix {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}{PATH_SEPARATOR}{name}"),
            _ => name.to_string(),
        }
    }

    /// Split a path into its first segment and the remainder.
    pub fn split_first(path: &str) -> (&str, Option<&str>) {
        match path.split_once(PATH_SEPARATOR) {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        }
    }

    /// The top-level segment of a path.
    pub fn root(path: &str) -> &str {
        Self::split_first(path).0
    }
}

/// Attribute path to values mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeBag {
    attributes: BTreeMap<String, Vec<AttributeValue>>,
}

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value, ignoring it when empty.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.append(name, [value.into()]);
    }

    /// Append values; empty values are dropped and nothing is recorded if none remain.
    pub fn append<I>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = AttributeValue>,
    {
        let mut values = values
            .into_iter()
            .filter(|value| !value.is_empty())
            .peekable();
        if values.peek().is_none() {
            return;
        }
        self.attributes.entry(name.into()).or_default().extend(values);
    }

    /// Builder form of [`AttributeBag::add`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.add(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&[AttributeValue]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    pub fn first(&self, name: &str) -> Option<&AttributeValue> {
        self.get(name).and_then(<[AttributeValue]>::first)
    }

    /// First value of an attribute as text.
    pub fn first_text(&self, name: &str) -> Option<String> {
        self.first(name).and_then(AttributeValue::to_text)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<AttributeValue>> {
        self.attributes.remove(name)
    }

    /// Move the values of `from` to `to`, appending when `to` already exists.
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(values) = self.attributes.remove(from) {
            self.append(to, values);
        }
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attributes in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AttributeValue])> {
        self.attributes
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}

impl FromIterator<(String, AttributeValue)> for AttributeBag {
    fn from_iter<T: IntoIterator<Item = (String, AttributeValue)>>(iter: T) -> Self {
        let mut bag = Self::new();
        for (name, value) in iter {
            bag.add(name, value);
        }
        bag
    }
}

impl<'a> IntoIterator for &'a AttributeBag {
    type Item = (&'a String, &'a Vec<AttributeValue>);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Vec<AttributeValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}
