//! Adding and removing attribute values.
//!
//! On accounts the values are references: group memberships and tenant or
//! space roles, given as embedded `__GROUP__`, `__TENANT__` and `__SPACE__`
//! objects. On groups they are member identifiers. Tenants and spaces have
//! no multi-valued attribute that can be changed this way.
//!
//! The whole bag is validated before the first request is sent.

use super::core::{ResourceDispatcher, require_id};
use crate::codec;
use crate::codec::directory::member_patch;
use crate::error::{ConnectorError, ConnectorResult, ValidationError};
use crate::resource::{
    AttributeBag, AttributeValue, NAME, PatchOp, ResourceKind, ScopeKind, UID,
};
use crate::transport::Transport;
use log::info;
use serde_json::Value;

/// Direction of a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Add,
    Remove,
}

impl Change {
    fn operation(self) -> &'static str {
        match self {
            Self::Add => "add attribute values",
            Self::Remove => "remove attribute values",
        }
    }

    fn patch_op(self) -> PatchOp {
        match self {
            Self::Add => PatchOp::Add,
            Self::Remove => PatchOp::Remove,
        }
    }
}

/// One reference carried by an account bag.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Reference {
    Membership { group: String },
    Role {
        scope: ScopeKind,
        guid: String,
        role: String,
    },
}

impl<T: Transport> ResourceDispatcher<T> {
    /// Add the values of the bag to the resource.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::MissingValues`] if the bag is empty
    /// * [`ValidationError::UnexpectedObjectClass`] if a reference has the
    ///   wrong embedded object class
    /// * [`ConnectorError::UnsupportedOperation`] for tenants and spaces
    pub async fn add_attribute_values(
        &self,
        kind: ResourceKind,
        id: &str,
        bag: &AttributeBag,
    ) -> ConnectorResult<String> {
        self.change_values(kind, id, bag, Change::Add).await
    }

    /// Remove the values of the bag from the resource. Each account reference
    /// attribute accepts at most one value per call.
    pub async fn remove_attribute_values(
        &self,
        kind: ResourceKind,
        id: &str,
        bag: &AttributeBag,
    ) -> ConnectorResult<String> {
        self.change_values(kind, id, bag, Change::Remove).await
    }

    async fn change_values(
        &self,
        kind: ResourceKind,
        id: &str,
        bag: &AttributeBag,
        change: Change,
    ) -> ConnectorResult<String> {
        let id = require_id(kind, id)?;
        if bag.is_empty() {
            return Err(ValidationError::MissingValues.into());
        }

        match kind {
            ResourceKind::Account => {
                for reference in account_references(bag, change)? {
                    self.apply_reference(id, &reference, change).await?;
                }
            }
            ResourceKind::Group => {
                let members = member_ids(bag)?;
                let operation = member_patch(change.patch_op(), &members);
                let _: Value = self.directory().patch(kind, id, vec![operation]).await?;
                info!("{:?} {} members of group '{}'", change, members.len(), id);
            }
            ResourceKind::Tenant | ResourceKind::Space => {
                return Err(ConnectorError::unsupported_operation(kind, change.operation()));
            }
        }
        Ok(id.to_string())
    }

    async fn apply_reference(
        &self,
        account: &str,
        reference: &Reference,
        change: Change,
    ) -> ConnectorResult<()> {
        match reference {
            Reference::Membership { group } => {
                let operation = member_patch(change.patch_op(), &[account.to_string()]);
                let _: Value = self
                    .directory()
                    .patch(ResourceKind::Group, group, vec![operation])
                    .await?;
            }
            Reference::Role { scope, guid, role } => match change {
                Change::Add => self.platform().assign(*scope, guid, role, account).await?,
                Change::Remove => self.platform().revoke(*scope, guid, role, account).await?,
            },
        }
        info!("{:?} {:?} for account '{}'", change, reference, account);
        Ok(())
    }
}

fn account_references(bag: &AttributeBag, change: Change) -> Result<Vec<Reference>, ValidationError> {
    let mut references = Vec::new();
    for (attribute, values) in bag.iter() {
        let Some(kind) = codec::reference_kind(attribute) else {
            return Err(ValidationError::InvalidValue {
                attribute: attribute.to_string(),
                value: describe(values.first()),
                expected: "a __GROUP__, __TENANT__ or __SPACE__ reference",
            });
        };
        if change == Change::Remove && values.len() > 1 {
            return Err(ValidationError::TooManyValues {
                attribute: attribute.to_string(),
                count: values.len(),
            });
        }
        for value in values {
            references.push(reference(attribute, kind, value)?);
        }
    }
    Ok(references)
}

fn reference(
    attribute: &str,
    kind: ResourceKind,
    value: &AttributeValue,
) -> Result<Reference, ValidationError> {
    let unexpected = || ValidationError::UnexpectedObjectClass {
        attribute: attribute.to_string(),
        expected: kind.object_class().to_string(),
    };
    let object = value.as_embedded().ok_or_else(unexpected)?;
    if !object.object_class.eq_ignore_ascii_case(kind.object_class()) {
        return Err(unexpected());
    }
    let text = |name: &str| {
        object
            .attributes
            .first_text(name)
            .filter(|text| !text.trim().is_empty())
    };
    let uid = text(UID).ok_or(ValidationError::MissingIdentifier { kind })?;

    let scope = match kind {
        ResourceKind::Tenant => ScopeKind::Tenant,
        ResourceKind::Space => ScopeKind::Space,
        _ => return Ok(Reference::Membership { group: uid }),
    };
    let role = text(NAME).ok_or_else(|| ValidationError::MissingName {
        kind,
        attribute: NAME.to_string(),
    })?;
    if !scope.roles().contains(&role.as_str()) {
        return Err(ValidationError::InvalidValue {
            attribute: attribute.to_string(),
            value: role,
            expected: "a role of the organization or space",
        });
    }
    Ok(Reference::Role {
        scope,
        guid: uid,
        role,
    })
}

/// Member identifiers given as `members` or `members.value`.
fn member_ids(bag: &AttributeBag) -> Result<Vec<String>, ValidationError> {
    let mut ids = Vec::new();
    for attribute in ["members", "members.value"] {
        for value in bag.get(attribute).unwrap_or_default() {
            let id = value.as_str().ok_or_else(|| ValidationError::InvalidValue {
                attribute: attribute.to_string(),
                value: describe(Some(value)),
                expected: "a member identifier",
            })?;
            ids.push(id.to_string());
        }
    }
    if ids.is_empty() {
        return Err(ValidationError::MissingValues);
    }
    Ok(ids)
}

fn describe(value: Option<&AttributeValue>) -> String {
    value
        .and_then(AttributeValue::to_text)
        .unwrap_or_else(|| format!("{value:?}"))
}
