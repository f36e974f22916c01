//! Calls against the user and group directory.

use super::decode;
use crate::error::ConnectorResult;
use crate::resource::directory::ListResponse;
use crate::resource::{PatchOperation, PatchRequest, ResourceKind};
use crate::schema::SchemaResource;
use crate::transport::{RestRequest, Service, Transport};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Query of one directory page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryQuery {
    /// 1-based index of the first record
    pub start_index: usize,
    pub count: usize,
    /// Native `attr:value` filter
    pub filter: Option<String>,
    /// Top level attributes to return
    pub attributes: Option<Vec<String>>,
}

impl DirectoryQuery {
    /// Query of the `index`-th page (1-based) of `size` records.
    pub fn page(index: usize, size: usize) -> Self {
        Self {
            start_index: index.saturating_sub(1) * size + 1,
            count: size,
            filter: None,
            attributes: None,
        }
    }

    pub fn filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn attributes(mut self, attributes: Option<Vec<String>>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Request builder for `Users` and `Groups`.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryClient<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> DirectoryClient<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    fn item_path(kind: ResourceKind, id: &str) -> String {
        format!("{}/{}", kind.bundle().endpoint, id)
    }

    /// The list request for a page; exposed for inspection in tests.
    pub fn list_request(kind: ResourceKind, query: &DirectoryQuery) -> RestRequest {
        let mut request = RestRequest::get(Service::Directory, kind.bundle().endpoint)
            .query("startIndex", query.start_index)
            .query("count", query.count);
        if let Some(filter) = &query.filter {
            request = request.query(kind.bundle().dialect.parameter, filter);
        }
        if let Some(attributes) = &query.attributes {
            request = request.query("attributes", attributes.join(","));
        }
        request
    }

    pub async fn list<R: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        query: &DirectoryQuery,
    ) -> ConnectorResult<ListResponse<R>> {
        let request = Self::list_request(kind, query);
        debug!("Listing {} with {}", kind, request);
        decode(Service::Directory, self.transport.execute(request).await?)
    }

    pub async fn get<R: DeserializeOwned>(&self, kind: ResourceKind, id: &str) -> ConnectorResult<R> {
        let request = RestRequest::get(Service::Directory, Self::item_path(kind, id));
        decode(Service::Directory, self.transport.execute(request).await?)
    }

    pub async fn create<R: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        body: Value,
    ) -> ConnectorResult<R> {
        let request = RestRequest::post(Service::Directory, kind.bundle().endpoint, body);
        decode(Service::Directory, self.transport.execute(request).await?)
    }

    /// Apply patch operations unconditionally (`If-Match: *`).
    pub async fn patch<R: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        id: &str,
        operations: Vec<PatchOperation>,
    ) -> ConnectorResult<R> {
        let body = serde_json::to_value(PatchRequest::new(operations))?;
        let request =
            RestRequest::patch(Service::Directory, Self::item_path(kind, id), body).if_match("*");
        decode(Service::Directory, self.transport.execute(request).await?)
    }

    pub async fn delete(&self, kind: ResourceKind, id: &str) -> ConnectorResult<()> {
        let request = RestRequest::delete(Service::Directory, Self::item_path(kind, id));
        self.transport.execute(request).await?;
        Ok(())
    }

    /// Schema resources published by the directory.
    pub async fn schemas(&self) -> ConnectorResult<Vec<SchemaResource>> {
        let request = RestRequest::get(Service::Directory, "Schemas");
        let list: ListResponse<SchemaResource> =
            decode(Service::Directory, self.transport.execute(request).await?)?;
        Ok(list.resources)
    }
}
