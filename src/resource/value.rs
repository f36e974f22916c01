//! Values carried by an attribute bag.

use super::bag::AttributeBag;
use serde_json::Value;
use std::fmt;

/// A single value of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Boolean(bool),
    /// Integers, epoch milliseconds of datetimes and decimals
    Integer(i64),
    /// Secret that must never be logged or returned
    Credential(GuardedString),
    /// Nested object of an embedded object class
    Embedded(EmbeddedObject),
}

impl AttributeValue {
    /// The emptiness gate: blank strings and empty embedded objects carry no value.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(value) => value.trim().is_empty(),
            Self::Credential(secret) => secret.is_empty(),
            Self::Embedded(object) => object.attributes.is_empty(),
            Self::Boolean(_) | Self::Integer(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_embedded(&self) -> Option<&EmbeddedObject> {
        match self {
            Self::Embedded(object) => Some(object),
            _ => None,
        }
    }

    /// Textual form used for filters and string coercion. Credentials stay hidden.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::String(value) => Some(value.clone()),
            Self::Boolean(value) => Some(value.to_string()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Credential(_) | Self::Embedded(_) => None,
        }
    }

    /// JSON form of the value as sent on the wire.
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(value) => Value::String(value.clone()),
            Self::Boolean(value) => Value::Bool(*value),
            Self::Integer(value) => Value::from(*value),
            Self::Credential(secret) => Value::String(secret.reveal().to_string()),
            Self::Embedded(object) => object.to_json(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<GuardedString> for AttributeValue {
    fn from(value: GuardedString) -> Self {
        Self::Credential(value)
    }
}

impl From<EmbeddedObject> for AttributeValue {
    fn from(value: EmbeddedObject) -> Self {
        Self::Embedded(value)
    }
}

/// A secret whose `Debug` and `Display` output is redacted.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct GuardedString(String);

impl GuardedString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Access the clear text.
    pub fn reveal(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for GuardedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GuardedString(****)")
    }
}

impl fmt::Display for GuardedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

/// An object of an embedded object class: a named bag without identity of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedObject {
    pub object_class: String,
    pub attributes: AttributeBag,
}

impl EmbeddedObject {
    pub fn new(object_class: impl Into<String>, attributes: AttributeBag) -> Self {
        Self {
            object_class: object_class.into(),
            attributes,
        }
    }

    fn to_json(&self) -> Value {
        let mut object = serde_json::Map::new();
        for (name, values) in self.attributes.iter() {
            let value = match values {
                [single] => single.to_json(),
                many => Value::Array(many.iter().map(AttributeValue::to_json).collect()),
            };
            object.insert(name.to_string(), value);
        }
        Value::Object(object)
    }
}
