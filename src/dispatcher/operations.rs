//! Create, update, delete and name resolution.

use super::core::{ResourceDispatcher, require_id};
use crate::client::{DirectoryClient, DirectoryQuery, PlatformClient, PlatformQuery};
use crate::codec::{self, Resource};
use crate::error::{ConnectorError, ConnectorResult, RemoteFault, ValidationError};
use crate::filter::{Filter, FilterTranslator, Operator};
use crate::resource::directory::{GroupResource, ListResponse, UserResource};
use crate::resource::platform::{Envelope, PlatformList};
use crate::resource::{AttributeBag, NAME, ResourceKind};
use crate::transport::{Service, Transport};
use log::{debug, info, trace};
use serde_json::Value;

impl<T: Transport> ResourceDispatcher<T> {
    /// Create a resource from a bag and return the identifier the provider
    /// assigned to it.
    ///
    /// Account bags may also carry `__GROUP__`, `__TENANT__` and `__SPACE__`
    /// references; they are assigned once the account exists.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::MissingName`] if the naming attribute (or, for a
    ///   space, the owning organization) is absent; nothing is sent then
    /// * [`ConnectorError::Remote`] if the provider rejects the request
    pub async fn create(&self, kind: ResourceKind, bag: &AttributeBag) -> ConnectorResult<String> {
        trace!("Create {} from {:?}", kind, bag);
        let resource = codec::from_attributes(kind, bag)?;
        let name = require_name(&resource)?;
        let body = resource.to_json()?;

        let id = match resource {
            Resource::Account(_) => {
                let user: UserResource = self.directory().create(kind, body).await?;
                user.id
            }
            Resource::Group(_) => {
                let group: GroupResource = self.directory().create(kind, body).await?;
                group.id
            }
            Resource::Tenant(_) | Resource::Space(_) => {
                let created: Envelope<Value> = self.platform().create(kind, body).await?;
                Some(created.metadata.guid)
            }
        }
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            RemoteFault::new(
                kind.bundle().service,
                0,
                format!("created {kind} '{name}' carries no identifier"),
            )
        })?;
        info!("Created {} '{}' with id {}", kind, name, id);

        if kind == ResourceKind::Account {
            let references = codec::references(bag);
            if !references.is_empty() {
                self.add_attribute_values(kind, &id, &references).await?;
            }
        }
        Ok(id)
    }

    /// Replace the attributes present in the bag; absent attributes are left
    /// unchanged.
    ///
    /// Directory resources are patched, platform resources are sent a full
    /// payload with `PUT`. A bag without any updatable attribute issues no
    /// request.
    pub async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        bag: &AttributeBag,
    ) -> ConnectorResult<String> {
        let id = require_id(kind, id)?;
        trace!("Update {} '{}' with {:?}", kind, id, bag);
        match kind.bundle().service {
            Service::Directory => {
                let operations = codec::patch_operations(kind, bag)?;
                if operations.is_empty() {
                    debug!("Nothing to update on {} '{}'", kind, id);
                    return Ok(id.to_string());
                }
                let _: Value = self.directory().patch(kind, id, operations).await?;
            }
            Service::Platform => {
                let body = codec::from_attributes(kind, bag)?.to_json()?;
                if body.as_object().is_none_or(|fields| fields.is_empty()) {
                    debug!("Nothing to update on {} '{}'", kind, id);
                    return Ok(id.to_string());
                }
                let _: Value = self.platform().update(kind, id, body).await?;
            }
        }
        info!("Updated {} '{}'", kind, id);
        Ok(id.to_string())
    }

    pub async fn delete(&self, kind: ResourceKind, id: &str) -> ConnectorResult<()> {
        let id = require_id(kind, id)?;
        match kind.bundle().service {
            Service::Directory => self.directory().delete(kind, id).await?,
            Service::Platform => self.platform().delete(kind, id).await?,
        }
        info!("Deleted {} '{}'", kind, id);
        Ok(())
    }

    /// Identifier of the single resource named `name`, `None` when no
    /// resource has that name.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Ambiguous`] when more than one resource
    /// matches; the caller never gets to pick one.
    pub async fn resolve(&self, kind: ResourceKind, name: &str) -> ConnectorResult<Option<String>> {
        let bundle = kind.bundle();
        let filter = FilterTranslator::new(kind).translate(NAME, name, Operator::Eq, false);
        let size = self.config.resolve_page_size;

        let (matches, ids) = match bundle.service {
            Service::Directory => {
                let query = DirectoryQuery::page(1, size)
                    .filter(filter)
                    .attributes(Some(vec![
                        bundle.uid_field.to_string(),
                        bundle.name_field.to_string(),
                    ]));
                let list: ListResponse<Value> = self.directory().list(kind, &query).await?;
                let ids: Vec<String> = list
                    .resources
                    .iter()
                    .filter_map(|resource| resource[bundle.uid_field].as_str())
                    .map(str::to_string)
                    .collect();
                (list.total_results.max(list.resources.len()), ids)
            }
            Service::Platform => {
                let query = PlatformQuery::page(1, size).filter(filter);
                let list: PlatformList<Envelope<Value>> =
                    self.platform().list(kind, &query).await?;
                let ids: Vec<String> = list
                    .resources
                    .into_iter()
                    .map(|resource| resource.metadata.guid)
                    .collect();
                (list.total_results.max(ids.len()), ids)
            }
        };

        debug!("Resolving {} '{}' matched {} resources", kind, name, matches);
        match (matches, ids.as_slice()) {
            (0, _) => Ok(None),
            (1, [id]) => Ok(Some(id.clone())),
            (1, _) => Err(RemoteFault::new(
                bundle.service,
                0,
                format!("{kind} '{name}' matched without an identifier"),
            )
            .into()),
            (matches, _) => Err(ConnectorError::ambiguous(kind, name, matches)),
        }
    }

    /// Like [`resolve`](Self::resolve), reporting absence as
    /// [`ConnectorError::NotFound`].
    pub async fn resolve_by_name(&self, kind: ResourceKind, name: &str) -> ConnectorResult<String> {
        self.resolve(kind, name)
            .await?
            .ok_or_else(|| ConnectorError::not_found(kind, kind.bundle().name_field, name))
    }

    /// The provider's native query for a framework filter, if it has one.
    pub fn native_filter(&self, kind: ResourceKind, filter: &Filter) -> Option<String> {
        FilterTranslator::new(kind).native(filter)
    }

    pub(super) fn directory(&self) -> DirectoryClient<'_, T> {
        DirectoryClient::new(&self.transport)
    }

    pub(super) fn platform(&self) -> PlatformClient<'_, T> {
        PlatformClient::new(&self.transport)
    }
}

/// The naming attribute a resource must carry to be created.
fn require_name(resource: &Resource) -> Result<String, ValidationError> {
    let kind = resource.kind();
    let name = match resource {
        Resource::Account(user) => user.user_name.as_deref(),
        Resource::Group(group) => group.display_name.as_deref(),
        Resource::Tenant(tenant) => tenant.name.as_deref(),
        Resource::Space(space) => space.name.as_deref(),
    }
    .map(str::trim)
    .filter(|name| !name.is_empty())
    .ok_or_else(|| ValidationError::MissingName {
        kind,
        attribute: kind.bundle().name_field.to_string(),
    })?;

    let orphan = matches!(
        resource,
        Resource::Space(space) if space
            .organization_guid
            .as_deref()
            .is_none_or(|guid| guid.trim().is_empty())
    );
    if orphan {
        return Err(ValidationError::MissingName {
            kind,
            attribute: "organization_guid".to_string(),
        });
    }
    Ok(name.to_string())
}
