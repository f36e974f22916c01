//! Provider schema resources as published by the remote APIs.

use crate::error::ConnectorResult;
use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};

/// A schema resource describing one resource type or extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResource {
    /// Schema URN
    pub id: String,
    /// Human-readable schema name, `User`, `Group`, ...
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,
}

impl SchemaResource {
    pub fn from_json(json: &str) -> ConnectorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resource kind the schema contributes to.
    ///
    /// The schema name decides first; extensions are recognized by the last
    /// segment of their URN (`...:extension:enterprise:2.0:User`).
    pub fn resource_kind(&self) -> Option<ResourceKind> {
        kind_for(&self.name).or_else(|| self.id.rsplit(':').next().and_then(kind_for))
    }
}

fn kind_for(name: &str) -> Option<ResourceKind> {
    match name.to_ascii_lowercase().as_str() {
        "user" | "account" => Some(ResourceKind::Account),
        "group" => Some(ResourceKind::Group),
        "organization" | "tenant" => Some(ResourceKind::Tenant),
        "space" => Some(ResourceKind::Space),
        _ => None,
    }
}

/// Definition of one attribute, possibly complex with sub-attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: AttributeType,
    #[serde(default)]
    pub multi_valued: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub case_exact: bool,
    /// Absent when the provider does not declare it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutability: Option<Mutability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned: Option<Returned>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_attributes: Vec<AttributeDefinition>,
}

impl Default for AttributeDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            data_type: AttributeType::String,
            multi_valued: false,
            required: false,
            case_exact: false,
            mutability: None,
            returned: None,
            sub_attributes: Vec::new(),
        }
    }
}

/// Attribute data types.
///
/// Unrecognized type names deserialize as [`AttributeType::String`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttributeType {
    #[default]
    String,
    Boolean,
    Decimal,
    Integer,
    DateTime,
    Binary,
    Reference,
    Complex,
}

impl From<String> for AttributeType {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "boolean" => Self::Boolean,
            "decimal" => Self::Decimal,
            "integer" => Self::Integer,
            "datetime" => Self::DateTime,
            "binary" => Self::Binary,
            "reference" => Self::Reference,
            "complex" => Self::Complex,
            _ => Self::String,
        }
    }
}

impl From<AttributeType> for String {
    fn from(data_type: AttributeType) -> Self {
        let name = match data_type {
            AttributeType::String => "string",
            AttributeType::Boolean => "boolean",
            AttributeType::Decimal => "decimal",
            AttributeType::Integer => "integer",
            AttributeType::DateTime => "dateTime",
            AttributeType::Binary => "binary",
            AttributeType::Reference => "reference",
            AttributeType::Complex => "complex",
        };
        name.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutability {
    ReadOnly,
    #[default]
    ReadWrite,
    Immutable,
    WriteOnly,
}

impl Mutability {
    /// `(createable, readable)` pair of the mutability.
    pub fn access(self) -> (bool, bool) {
        match self {
            Self::ReadOnly => (false, true),
            Self::ReadWrite | Self::Immutable => (true, true),
            Self::WriteOnly => (true, false),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Returned {
    Always,
    Never,
    #[default]
    Default,
    Request,
}
