//! Records handed to the caller and the permission enrichment joined onto accounts.

use super::bag::{AttributeBag, ENABLE, NAME, UID};
use super::kind::ResourceKind;
use super::value::{AttributeValue, EmbeddedObject};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resource as delivered to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityRecord {
    pub kind: ResourceKind,
    /// Provider assigned identifier
    pub id: String,
    /// Unique display name
    pub name: String,
    /// Remaining attributes; identifier and name are not repeated here
    pub bag: AttributeBag,
}

impl IdentityRecord {
    /// Split identifier and name out of an outbound bag and alias the enabled flag.
    ///
    /// The identifier field must be present; records without one cannot be
    /// correlated and are rejected by the caller of this function.
    pub fn from_bag(kind: ResourceKind, mut bag: AttributeBag) -> Option<Self> {
        let bundle = kind.bundle();
        let id = bag.first_text(bundle.uid_field)?;
        bag.remove(bundle.uid_field);
        let name = bag.first_text(bundle.name_field).unwrap_or_default();
        bag.remove(bundle.name_field);
        if let Some(field) = bundle.enable_field {
            bag.rename(field, ENABLE);
        }
        Some(Self { kind, id, name, bag })
    }

    /// Attributes including the reserved identifier and name entries.
    pub fn attributes(&self) -> AttributeBag {
        let mut bag = self.bag.clone();
        bag.add(UID, self.id.as_str());
        bag.add(NAME, self.name.as_str());
        bag
    }
}

/// Scope a platform role is held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScopeKind {
    Tenant,
    Space,
}

impl ScopeKind {
    /// Collection path of the scope on the platform API.
    pub fn endpoint(self) -> &'static str {
        self.kind().bundle().endpoint
    }

    /// The resource kind backing the scope.
    pub fn kind(self) -> ResourceKind {
        match self {
            Self::Tenant => ResourceKind::Tenant,
            Self::Space => ResourceKind::Space,
        }
    }

    /// Role names accepted by the platform for the scope.
    pub fn roles(self) -> &'static [&'static str] {
        match self {
            Self::Tenant => &["users", "managers", "billing_managers", "auditors"],
            Self::Space => &["developers", "managers", "auditors"],
        }
    }
}

/// A role and the scope identifiers it is held in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub role: String,
    pub members: Vec<String>,
}

/// Tenant and space role assignments of a single account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentMap {
    scopes: BTreeMap<ScopeKind, Vec<RoleAssignment>>,
}

impl EnrichmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the account holds `role` in the scope identified by `member`.
    pub fn grant(&mut self, scope: ScopeKind, role: &str, member: impl Into<String>) {
        let assignments = self.scopes.entry(scope).or_default();
        let member = member.into();
        match assignments.iter_mut().find(|entry| entry.role == role) {
            Some(entry) => entry.members.push(member),
            None => assignments.push(RoleAssignment {
                role: role.to_string(),
                members: vec![member],
            }),
        }
    }

    pub fn assignments(&self, scope: ScopeKind) -> &[RoleAssignment] {
        self.scopes.get(&scope).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.values().all(Vec::is_empty)
    }

    /// One embedded object per (scope identifier, role) pair, named by the role.
    pub fn embedded(&self, scope: ScopeKind) -> Vec<AttributeValue> {
        let object_class = scope.kind().object_class();
        self.assignments(scope)
            .iter()
            .flat_map(|assignment| {
                assignment.members.iter().map(move |member| {
                    let attributes = AttributeBag::new()
                        .with(UID, member.as_str())
                        .with(NAME, assignment.role.as_str());
                    AttributeValue::from(EmbeddedObject::new(object_class, attributes))
                })
            })
            .collect()
    }
}
