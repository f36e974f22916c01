//! Transport seam between the engine and the two remote APIs.
//!
//! The engine never builds HTTP clients itself. It describes each call as a
//! [`RestRequest`] and hands it to a [`Transport`], which returns the decoded
//! JSON body or a [`RemoteFault`]. Requests are always awaited one at a time,
//! so a transport sees them in exactly the order the engine issues them.
//!
//! [`InMemoryTransport`] simulates both APIs for tests and local development.

pub mod in_memory;

pub use in_memory::InMemoryTransport;

use crate::config::ConnectorConfig;
use crate::error::RemoteFault;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;

/// The remote API a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// User and group directory (SCIM style, `Users` and `Groups`)
    Directory,
    /// Platform API (`v2/organizations`, `v2/spaces`, `v2/users`)
    Platform,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::Platform => write!(f, "platform"),
        }
    }
}

/// HTTP verbs used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

/// A single call against one of the remote APIs.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    pub service: Service,
    pub method: Method,
    /// Path relative to the service base URL, without a leading slash
    pub path: String,
    /// Query parameters in the order they were added
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Value of the `If-Match` header
    pub if_match: Option<String>,
}

impl RestRequest {
    pub fn new(service: Service, method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            service,
            method,
            path: path.trim_start_matches('/').to_string(),
            query: Vec::new(),
            body: None,
            if_match: None,
        }
    }

    pub fn get(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::Get, path)
    }

    pub fn post(service: Service, path: impl Into<String>, body: Value) -> Self {
        Self::new(service, Method::Post, path).body(body)
    }

    pub fn put(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::Put, path)
    }

    pub fn patch(service: Service, path: impl Into<String>, body: Value) -> Self {
        Self::new(service, Method::Patch, path).body(body)
    }

    pub fn delete(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::Delete, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn if_match(mut self, version: impl Into<String>) -> Self {
        self.if_match = Some(version.into());
        self
    }

    /// First value of a query parameter.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Absolute URL of the request, query string not included.
    pub fn url(&self, config: &ConnectorConfig) -> String {
        config.endpoint(self.service, &self.path)
    }
}

impl fmt::Display for RestRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.method, self.service, self.path)?;
        for (index, (name, value)) in self.query.iter().enumerate() {
            let separator = if index == 0 { '?' } else { '&' };
            write!(f, "{separator}{name}={value}")?;
        }
        Ok(())
    }
}

/// Executes requests against the remote APIs.
///
/// Implementations own connection handling, authentication, retries and
/// timeouts. A successful call yields the decoded response body, or `None`
/// when the response carries no content.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: RestRequest,
    ) -> impl Future<Output = Result<Option<Value>, RemoteFault>> + Send;
}

impl<T: Transport> Transport for &T {
    fn execute(
        &self,
        request: RestRequest,
    ) -> impl Future<Output = Result<Option<Value>, RemoteFault>> + Send {
        (**self).execute(request)
    }
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn execute(
        &self,
        request: RestRequest,
    ) -> impl Future<Output = Result<Option<Value>, RemoteFault>> + Send {
        (**self).execute(request)
    }
}
