//! Conversion between attribute bags and the typed wire resources.
//!
//! Outbound, every wire type carries a static descriptor table (see
//! [`descriptor`]) which is walked into a flat bag; nested objects become
//! dotted paths, elements of multi-valued complex attributes become embedded
//! objects, and empty values never reach the bag. Inbound, a bag is
//! first scanned and grouped by prefix (see [`scan`]) and the typed resource
//! is then assembled bottom-up in one pass. Updates of directory resources
//! are expressed as patch operations from fixed per-kind rule tables.
//!
//! # Example
//!
//! ```rust
//! use pcf_connector::codec;
//! use pcf_connector::resource::{AttributeBag, NAME, ResourceKind};
//!
//! let bag = AttributeBag::new()
//!     .with(NAME, "bjensen")
//!     .with("name.familyName", "Jensen")
//!     .with("emails.value", "bjensen@example.com");
//! let user = codec::from_attributes(ResourceKind::Account, &bag)?;
//! let body = user.to_json()?;
//! assert_eq!(body["userName"], "bjensen");
//! assert_eq!(body["emails"][0]["primary"], true);
//! # Ok::<(), pcf_connector::ConnectorError>(())
//! ```

pub mod descriptor;
pub mod directory;
pub mod platform;
pub mod scan;


pub use descriptor::{Described, Property, to_bag};
pub use scan::Scan;

use crate::error::{ConnectorError, ConnectorResult, ValidationError};
use crate::resource::directory::{GroupResource, UserResource};
use crate::resource::platform::{SpacePayload, TenantPayload};
use crate::resource::{AttributeBag, IdentityRecord, PatchOperation, ResourceKind};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

/// A typed resource ready to be sent to its provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Account(UserResource),
    Group(GroupResource),
    Tenant(TenantPayload),
    Space(SpacePayload),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Account(_) => ResourceKind::Account,
            Self::Group(_) => ResourceKind::Group,
            Self::Tenant(_) => ResourceKind::Tenant,
            Self::Space(_) => ResourceKind::Space,
        }
    }

    /// Request body of the resource.
    pub fn to_json(&self) -> ConnectorResult<Value> {
        Ok(match self {
            Self::Account(user) => serde_json::to_value(user)?,
            Self::Group(group) => serde_json::to_value(group)?,
            Self::Tenant(tenant) => serde_json::to_value(tenant)?,
            Self::Space(space) => serde_json::to_value(space)?,
        })
    }
}

/// Inbound conversion in full mode: every known attribute of the bag is
/// placed on the typed resource, unknown ones are ignored.
pub fn from_attributes(kind: ResourceKind, bag: &AttributeBag) -> ConnectorResult<Resource> {
    Ok(match kind {
        ResourceKind::Account => Resource::Account(directory::user_from_attributes(bag)?),
        ResourceKind::Group => Resource::Group(directory::group_from_attributes(bag)?),
        ResourceKind::Tenant => Resource::Tenant(platform::tenant_from_attributes(bag)?),
        ResourceKind::Space => Resource::Space(platform::space_from_attributes(bag)?),
    })
}

/// Inbound conversion in patch mode. Only directory resources are patched;
/// platform resources are replaced with a full payload instead.
pub fn patch_operations(
    kind: ResourceKind,
    bag: &AttributeBag,
) -> ConnectorResult<Vec<PatchOperation>> {
    match kind {
        ResourceKind::Account => directory::user_patch(bag),
        ResourceKind::Group => directory::group_patch(bag),
        ResourceKind::Tenant | ResourceKind::Space => {
            Err(ConnectorError::unsupported_operation(kind, "patch"))
        }
    }
}

/// Outbound conversion of a wire resource into a record, restricted to the
/// projection's attributes.
pub fn to_record<T: Described>(
    kind: ResourceKind,
    resource: &T,
    projection: &Projection,
) -> ConnectorResult<IdentityRecord> {
    let bag = to_bag(resource, projection.include());
    IdentityRecord::from_bag(kind, bag)
        .ok_or_else(|| ValidationError::MissingIdentifier { kind }.into())
}

/// Attributes requested by the caller of a search.
///
/// Reserved names are translated to provider fields, and the identifier,
/// name and enabled fields are always part of a restricted projection.
/// Embedded object class names among the requested attributes select the
/// account enrichments instead of plain fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    include: Option<HashSet<String>>,
    embedded: BTreeSet<ResourceKind>,
}

impl Projection {
    /// Every attribute returned by default, no enrichment.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(kind: ResourceKind, requested: Option<&[String]>) -> Self {
        let Some(requested) = requested else {
            return Self::all();
        };
        let bundle = kind.bundle();
        let mut include: HashSet<String> = [bundle.uid_field, bundle.name_field]
            .into_iter()
            .chain(bundle.enable_field)
            .map(str::to_string)
            .collect();
        let mut embedded = BTreeSet::new();
        for name in requested {
            match embedded_kind(kind, name) {
                Some(reference) => {
                    embedded.insert(reference);
                }
                None => {
                    include.insert(bundle.field(name).to_string());
                }
            }
        }
        Self {
            include: Some(include),
            embedded,
        }
    }

    /// Leaf paths to keep, `None` for all.
    pub fn include(&self) -> Option<&HashSet<String>> {
        self.include.as_ref()
    }

    /// Whether a leaf path is part of the projection.
    pub fn includes(&self, path: &str) -> bool {
        self.include
            .as_ref()
            .is_none_or(|include| include.contains(path))
    }

    /// Whether the references of `kind` were requested.
    pub fn wants(&self, kind: ResourceKind) -> bool {
        self.embedded.contains(&kind)
    }

    /// Top level attribute names to ask the provider for, sorted.
    pub fn roots(&self) -> Option<Vec<String>> {
        self.include.as_ref().map(|include| {
            include
                .iter()
                .map(|path| crate::resource::AttributePath::root(path).to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
    }
}

/// The group, tenant and space references of an account bag.
pub fn references(bag: &AttributeBag) -> AttributeBag {
    let mut references = AttributeBag::new();
    for (name, values) in bag.iter() {
        if reference_kind(name).is_some() {
            references.append(name, values.iter().cloned());
        }
    }
    references
}

/// Kind referenced by an account attribute named after an embedded object class.
pub fn reference_kind(name: &str) -> Option<ResourceKind> {
    embedded_kind(ResourceKind::Account, name)
}

/// Accounts carry group, tenant and space references as embedded objects.
fn embedded_kind(kind: ResourceKind, name: &str) -> Option<ResourceKind> {
    if kind != ResourceKind::Account {
        return None;
    }
    [ResourceKind::Group, ResourceKind::Tenant, ResourceKind::Space]
        .into_iter()
        .find(|reference| reference.object_class().eq_ignore_ascii_case(name))
}
