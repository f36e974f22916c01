//! Page sources of the four resource kinds.

use super::{PageRequest, PageResult, PageSource};
use crate::client::{DirectoryClient, DirectoryQuery, PlatformClient, PlatformQuery};
use crate::codec::{Projection, to_record};
use crate::config::EnrichmentPolicy;
use crate::error::{ConnectorError, ConnectorResult};
use crate::resource::directory::{GroupResource, ListResponse, UserResource};
use crate::resource::platform::{Envelope, PlatformList, SpaceEntity, TenantEntity};
use crate::resource::{
    AttributeBag, AttributeValue, EmbeddedObject, EnrichmentMap, IdentityRecord, NAME,
    ResourceKind, ScopeKind, UID,
};
use crate::transport::Transport;
use log::{debug, warn};

/// Attribute carrying the owning organization's name on spaces.
pub const ORGANIZATION_NAME: &str = "organization_name";

/// Roles held by `user` in tenants and spaces.
///
/// A lookup fault the policy degrades (by default: not found, the user holds
/// no roles) yields an empty map.
pub async fn lookup_permitted<T: Transport>(
    transport: &T,
    user: &str,
    policy: &EnrichmentPolicy,
) -> ConnectorResult<EnrichmentMap> {
    match PlatformClient::new(transport).user_summary(user).await {
        Ok(summary) => Ok(summary.enrichment()),
        Err(ConnectorError::Remote(fault)) if policy.degrades(&fault) => {
            if fault.is_not_found() {
                debug!("Account '{}' holds no platform roles", user);
            } else {
                warn!(
                    "Permission lookup for account '{}' failed, treated as no roles: {}",
                    user, fault
                );
            }
            Ok(EnrichmentMap::new())
        }
        Err(e) => Err(e),
    }
}

async fn directory_page<T, R>(
    transport: &T,
    kind: ResourceKind,
    page: PageRequest,
    filter: &Option<String>,
    attributes: Option<Vec<String>>,
) -> ConnectorResult<PageResult<R>>
where
    T: Transport,
    R: serde::de::DeserializeOwned,
{
    let query = DirectoryQuery::page(page.index, page.size)
        .filter(filter.clone())
        .attributes(attributes);
    let list: ListResponse<R> = DirectoryClient::new(transport).list(kind, &query).await?;
    Ok(PageResult {
        batch_size: list.batch_size(),
        total: Some(list.total_results),
        items: list.resources,
    })
}

async fn platform_page<T, R>(
    transport: &T,
    kind: ResourceKind,
    page: PageRequest,
    filter: &Option<String>,
) -> ConnectorResult<PageResult<R>>
where
    T: Transport,
    R: serde::de::DeserializeOwned,
{
    let query = PlatformQuery::page(page.index, page.size).filter(filter.clone());
    let list: PlatformList<R> = PlatformClient::new(transport).list(kind, &query).await?;
    Ok(PageResult::new(list.resources, Some(list.total_results)))
}

/// Directory users, enriched with groups and platform roles on request.
pub struct AccountSource<'a, T> {
    pub transport: &'a T,
    pub filter: Option<String>,
    pub projection: &'a Projection,
    pub enrichment: &'a EnrichmentPolicy,
}

impl<T: Transport> PageSource for AccountSource<'_, T> {
    type Item = UserResource;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Account
    }

    async fn fetch(&self, page: PageRequest) -> ConnectorResult<PageResult<UserResource>> {
        let attributes = self.projection.roots().map(|mut roots| {
            if self.projection.wants(ResourceKind::Group) {
                roots.push("groups".to_string());
            }
            roots
        });
        directory_page(self.transport, ResourceKind::Account, page, &self.filter, attributes).await
    }

    fn identify(&self, user: &UserResource) -> String {
        user.id
            .clone()
            .or_else(|| user.user_name.clone())
            .unwrap_or_default()
    }

    async fn convert(&self, user: UserResource) -> ConnectorResult<IdentityRecord> {
        let mut record = to_record(ResourceKind::Account, &user, self.projection)?;

        if self.projection.wants(ResourceKind::Group) {
            let groups = user.groups.iter().map(|group| {
                let attributes = AttributeBag::new()
                    .with(UID, group.value.as_str())
                    .with(NAME, group.display.clone().unwrap_or_default());
                AttributeValue::from(EmbeddedObject::new(
                    ResourceKind::Group.object_class(),
                    attributes,
                ))
            });
            record.bag.append(ResourceKind::Group.object_class(), groups);
        }

        let scopes: Vec<ScopeKind> = [ScopeKind::Tenant, ScopeKind::Space]
            .into_iter()
            .filter(|scope| self.projection.wants(scope.kind()))
            .collect();
        if !scopes.is_empty() {
            let permitted = lookup_permitted(self.transport, &record.id, self.enrichment).await?;
            for scope in scopes {
                record
                    .bag
                    .append(scope.kind().object_class(), permitted.embedded(scope));
            }
        }
        Ok(record)
    }
}

/// Directory groups.
pub struct GroupSource<'a, T> {
    pub transport: &'a T,
    pub filter: Option<String>,
    pub projection: &'a Projection,
}

impl<T: Transport> PageSource for GroupSource<'_, T> {
    type Item = GroupResource;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Group
    }

    async fn fetch(&self, page: PageRequest) -> ConnectorResult<PageResult<GroupResource>> {
        directory_page(
            self.transport,
            ResourceKind::Group,
            page,
            &self.filter,
            self.projection.roots(),
        )
        .await
    }

    fn identify(&self, group: &GroupResource) -> String {
        group
            .id
            .clone()
            .or_else(|| group.display_name.clone())
            .unwrap_or_default()
    }

    async fn convert(&self, group: GroupResource) -> ConnectorResult<IdentityRecord> {
        to_record(ResourceKind::Group, &group, self.projection)
    }
}

/// Platform organizations.
pub struct TenantSource<'a, T> {
    pub transport: &'a T,
    pub filter: Option<String>,
    pub projection: &'a Projection,
}

impl<T: Transport> PageSource for TenantSource<'_, T> {
    type Item = Envelope<TenantEntity>;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Tenant
    }

    async fn fetch(&self, page: PageRequest) -> ConnectorResult<PageResult<Self::Item>> {
        platform_page(self.transport, ResourceKind::Tenant, page, &self.filter).await
    }

    fn identify(&self, tenant: &Self::Item) -> String {
        tenant.metadata.guid.clone()
    }

    async fn convert(&self, tenant: Self::Item) -> ConnectorResult<IdentityRecord> {
        to_record(ResourceKind::Tenant, &tenant, self.projection)
    }
}

/// Platform spaces, with the name of their owning organization.
pub struct SpaceSource<'a, T> {
    pub transport: &'a T,
    pub filter: Option<String>,
    pub projection: &'a Projection,
}

impl<T: Transport> PageSource for SpaceSource<'_, T> {
    type Item = Envelope<SpaceEntity>;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Space
    }

    async fn fetch(&self, page: PageRequest) -> ConnectorResult<PageResult<Self::Item>> {
        platform_page(self.transport, ResourceKind::Space, page, &self.filter).await
    }

    fn identify(&self, space: &Self::Item) -> String {
        space.metadata.guid.clone()
    }

    async fn convert(&self, space: Self::Item) -> ConnectorResult<IdentityRecord> {
        let mut record = to_record(ResourceKind::Space, &space, self.projection)?;
        if self.projection.includes(ORGANIZATION_NAME) {
            let client = PlatformClient::new(self.transport);
            let organization: Option<Envelope<TenantEntity>> =
                match (&space.entity.organization_url, &space.entity.organization_guid) {
                    (Some(url), _) => Some(client.lookup(url).await?),
                    (None, Some(guid)) => Some(client.get(ResourceKind::Tenant, guid).await?),
                    (None, None) => None,
                };
            if let Some(organization) = organization {
                record.bag.add(ORGANIZATION_NAME, organization.entity.name);
            }
        }
        Ok(record)
    }
}
