//! The closed set of provisioned resource kinds and their per-kind bundles.

use crate::enumerator::PaginationPolicy;
use crate::error::{ConnectorError, ConnectorResult, ValidationError};
use crate::filter::{DIRECTORY_DIALECT, Dialect, PLATFORM_DIALECT};
use crate::resource::bag::{ENABLE, NAME, PASSWORD, UID};
use crate::transport::Service;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four resource kinds the connector provisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Directory user
    Account,
    /// Directory group
    Group,
    /// Platform organization
    Tenant,
    /// Platform space, always owned by a tenant
    Space,
}

/// Everything the engine needs to know to route an operation for one kind.
#[derive(Debug)]
pub struct KindBundle {
    pub kind: ResourceKind,
    /// Name of the object class the kind is exposed as
    pub object_class: &'static str,
    pub service: Service,
    /// Collection path relative to the service
    pub endpoint: &'static str,
    /// Field carrying the provider assigned identifier
    pub uid_field: &'static str,
    /// Field carrying the unique display name
    pub name_field: &'static str,
    /// Field carrying the enabled flag, if the kind has one
    pub enable_field: Option<&'static str>,
    pub policy: PaginationPolicy,
    pub dialect: &'static Dialect,
}

impl KindBundle {
    /// Provider field behind a reserved pseudo-attribute name; other names pass through.
    pub fn field<'a>(&self, attribute: &'a str) -> &'a str {
        match attribute {
            UID => self.uid_field,
            NAME => self.name_field,
            ENABLE => self.enable_field.unwrap_or(attribute),
            PASSWORD if self.kind == ResourceKind::Account => "password",
            other => other,
        }
    }
}

static BUNDLES: [KindBundle; 4] = [
    KindBundle {
        kind: ResourceKind::Account,
        object_class: "__ACCOUNT__",
        service: Service::Directory,
        endpoint: "Users",
        uid_field: "id",
        name_field: "userName",
        enable_field: Some("active"),
        policy: PaginationPolicy::BatchSize,
        dialect: &DIRECTORY_DIALECT,
    },
    KindBundle {
        kind: ResourceKind::Group,
        object_class: "__GROUP__",
        service: Service::Directory,
        endpoint: "Groups",
        uid_field: "id",
        name_field: "displayName",
        enable_field: None,
        policy: PaginationPolicy::BatchSize,
        dialect: &DIRECTORY_DIALECT,
    },
    KindBundle {
        kind: ResourceKind::Tenant,
        object_class: "__TENANT__",
        service: Service::Platform,
        endpoint: "v2/organizations",
        uid_field: "id",
        name_field: "name",
        enable_field: Some("status"),
        policy: PaginationPolicy::Total,
        dialect: &PLATFORM_DIALECT,
    },
    KindBundle {
        kind: ResourceKind::Space,
        object_class: "__SPACE__",
        service: Service::Platform,
        endpoint: "v2/spaces",
        uid_field: "id",
        name_field: "name",
        enable_field: None,
        policy: PaginationPolicy::Total,
        dialect: &PLATFORM_DIALECT,
    },
];

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [Self::Account, Self::Group, Self::Tenant, Self::Space];

    /// The routing bundle of this kind.
    pub fn bundle(self) -> &'static KindBundle {
        &BUNDLES[self as usize]
    }

    pub fn object_class(self) -> &'static str {
        self.bundle().object_class
    }

    /// Look a kind up by object class name.
    ///
    /// An absent or blank name is a validation failure, an unknown one is
    /// reported as an unsupported kind.
    pub fn resolve(object_class: Option<&str>) -> ConnectorResult<Self> {
        let name = object_class
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ValidationError::MissingResourceKind)?;
        name.parse()
    }
}

impl FromStr for ResourceKind {
    type Err = ConnectorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.object_class().eq_ignore_ascii_case(name))
            .ok_or_else(|| ConnectorError::UnsupportedKind(name.to_string()))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.object_class())
    }
}
