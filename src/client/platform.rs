//! Calls against the platform API.

use super::decode;
use crate::error::ConnectorResult;
use crate::resource::platform::{PlatformList, UserSummary};
use crate::resource::{ResourceKind, ScopeKind};
use crate::transport::{RestRequest, Service, Transport};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Query of one platform page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformQuery {
    /// 1-based page index
    pub page: usize,
    pub results_per_page: usize,
    /// Native `attr:value` filter
    pub q: Option<String>,
}

impl PlatformQuery {
    pub fn page(page: usize, results_per_page: usize) -> Self {
        Self {
            page,
            results_per_page,
            q: None,
        }
    }

    pub fn filter(mut self, q: Option<String>) -> Self {
        self.q = q;
        self
    }
}

/// Request builder for organizations, spaces and user summaries.
#[derive(Debug, Clone, Copy)]
pub struct PlatformClient<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> PlatformClient<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    fn item_path(kind: ResourceKind, guid: &str) -> String {
        format!("{}/{}", kind.bundle().endpoint, guid)
    }

    /// `{resource}/{role}/{identifier}` of a role assignment.
    pub fn role_path(scope: ScopeKind, guid: &str, role: &str, user: &str) -> String {
        format!("{}/{}/{}", Self::item_path(scope.kind(), guid), role, user)
    }

    pub fn list_request(kind: ResourceKind, query: &PlatformQuery) -> RestRequest {
        let mut request = RestRequest::get(Service::Platform, kind.bundle().endpoint)
            .query("page", query.page)
            .query("results-per-page", query.results_per_page);
        if let Some(q) = &query.q {
            request = request.query(kind.bundle().dialect.parameter, q);
        }
        request
    }

    pub async fn list<R: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        query: &PlatformQuery,
    ) -> ConnectorResult<PlatformList<R>> {
        let request = Self::list_request(kind, query);
        debug!("Listing {} with {}", kind, request);
        decode(Service::Platform, self.transport.execute(request).await?)
    }

    pub async fn get<R: DeserializeOwned>(&self, kind: ResourceKind, guid: &str) -> ConnectorResult<R> {
        self.lookup(&Self::item_path(kind, guid)).await
    }

    /// Fetch a resource by the URL the platform reports for it, e.g. a space's
    /// `organization_url`.
    pub async fn lookup<R: DeserializeOwned>(&self, url: &str) -> ConnectorResult<R> {
        let request = RestRequest::get(Service::Platform, url);
        decode(Service::Platform, self.transport.execute(request).await?)
    }

    pub async fn create<R: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        body: Value,
    ) -> ConnectorResult<R> {
        let request = RestRequest::post(Service::Platform, kind.bundle().endpoint, body);
        decode(Service::Platform, self.transport.execute(request).await?)
    }

    pub async fn update<R: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        guid: &str,
        body: Value,
    ) -> ConnectorResult<R> {
        let request = RestRequest::put(Service::Platform, Self::item_path(kind, guid)).body(body);
        decode(Service::Platform, self.transport.execute(request).await?)
    }

    pub async fn delete(&self, kind: ResourceKind, guid: &str) -> ConnectorResult<()> {
        let request = RestRequest::delete(Service::Platform, Self::item_path(kind, guid));
        self.transport.execute(request).await?;
        Ok(())
    }

    /// Roles held by a user across organizations and spaces.
    pub async fn user_summary(&self, user: &str) -> ConnectorResult<UserSummary> {
        let request = RestRequest::get(Service::Platform, format!("v2/users/{user}/summary"));
        decode(Service::Platform, self.transport.execute(request).await?)
    }

    pub async fn assign(
        &self,
        scope: ScopeKind,
        guid: &str,
        role: &str,
        user: &str,
    ) -> ConnectorResult<()> {
        let request = RestRequest::put(Service::Platform, Self::role_path(scope, guid, role, user));
        self.transport.execute(request).await?;
        Ok(())
    }

    pub async fn revoke(
        &self,
        scope: ScopeKind,
        guid: &str,
        role: &str,
        user: &str,
    ) -> ConnectorResult<()> {
        let request =
            RestRequest::delete(Service::Platform, Self::role_path(scope, guid, role, user));
        self.transport.execute(request).await?;
        Ok(())
    }
}
