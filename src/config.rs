//! Connector configuration.
//!
//! [`ConnectorConfig`] names the two remote services and tunes enumeration.
//! It can be deserialized from a JSON document or assembled through
//! [`ConnectorConfigBuilder`], which validates the result.
//!
//! ```rust
//! use pcf_connector::config::ConnectorConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectorConfig::builder()
//!     .directory_url("https://login.sys.example.com")
//!     .platform_url("https://api.sys.example.com")
//!     .page_size(50)
//!     .build()?;
//! assert_eq!(config.page_size, 50);
//! # Ok(())
//! # }
//! ```

use crate::error::{ConnectorError, ConnectorResult, RemoteFault};
use crate::transport::Service;
use serde::{Deserialize, Serialize};

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Page size used when resolving a name; two records suffice to detect ambiguity.
pub const DEFAULT_RESOLVE_PAGE_SIZE: usize = 2;

/// Configuration of a connector instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Base URL of the user and group directory (the login server)
    pub directory_url: String,
    /// Base URL of the platform API (the cloud controller)
    pub platform_url: String,
    /// Records requested per page while enumerating
    pub page_size: usize,
    /// Records requested when resolving a name
    pub resolve_page_size: usize,
    /// How faults of the permission lookup are treated
    pub enrichment: EnrichmentPolicy,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            directory_url: String::new(),
            platform_url: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            resolve_page_size: DEFAULT_RESOLVE_PAGE_SIZE,
            enrichment: EnrichmentPolicy::default(),
        }
    }
}

impl ConnectorConfig {
    /// Start building a configuration.
    pub fn builder() -> ConnectorConfigBuilder {
        ConnectorConfigBuilder::new()
    }

    /// Load and validate a configuration from a JSON document.
    pub fn from_json(json: &str) -> ConnectorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.directory_url.trim().is_empty() {
            return Err(ConnectorError::configuration("directory_url must not be blank"));
        }
        if self.platform_url.trim().is_empty() {
            return Err(ConnectorError::configuration("platform_url must not be blank"));
        }
        if self.page_size == 0 {
            return Err(ConnectorError::configuration("page_size must be at least 1"));
        }
        if self.resolve_page_size == 0 {
            return Err(ConnectorError::configuration(
                "resolve_page_size must be at least 1",
            ));
        }
        Ok(())
    }

    /// Base URL of a service.
    pub fn base_url(&self, service: Service) -> &str {
        match service {
            Service::Directory => &self.directory_url,
            Service::Platform => &self.platform_url,
        }
    }

    /// Absolute URL of a path relative to a service.
    pub fn endpoint(&self, service: Service, path: &str) -> String {
        join_url(self.base_url(service), path)
    }
}

/// Join a base URL and a relative path with exactly one separating slash.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (base.is_empty(), path.is_empty()) {
        (_, true) => base.to_string(),
        (true, false) => format!("/{path}"),
        (false, false) => format!("{base}/{path}"),
    }
}

/// Decides which faults of the per-account permission lookup degrade to
/// "no permissions" instead of aborting the enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentPolicy {
    /// HTTP statuses treated as "account holds no assignments"
    pub degrade_status: Vec<u16>,
}

impl Default for EnrichmentPolicy {
    fn default() -> Self {
        Self {
            degrade_status: vec![404],
        }
    }
}

impl EnrichmentPolicy {
    /// Policy under which every lookup fault propagates.
    pub fn strict() -> Self {
        Self {
            degrade_status: Vec::new(),
        }
    }

    /// Whether the fault is downgraded to an empty result.
    pub fn degrades(&self, fault: &RemoteFault) -> bool {
        if self.degrade_status.contains(&fault.status) {
            return true;
        }
        fault.is_not_found() && self.degrade_status.contains(&404)
    }
}

/// Fluent builder for [`ConnectorConfig`].
#[derive(Debug, Default)]
pub struct ConnectorConfigBuilder {
    config: ConnectorConfig,
}

impl ConnectorConfigBuilder {
    /// Create a builder seeded with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory (login server) base URL.
    pub fn directory_url(mut self, url: impl Into<String>) -> Self {
        self.config.directory_url = url.into();
        self
    }

    /// Set the platform (cloud controller) base URL.
    pub fn platform_url(mut self, url: impl Into<String>) -> Self {
        self.config.platform_url = url.into();
        self
    }

    /// Set the enumeration page size.
    pub fn page_size(mut self, size: usize) -> Self {
        self.config.page_size = size;
        self
    }

    /// Set the page size used when resolving names.
    pub fn resolve_page_size(mut self, size: usize) -> Self {
        self.config.resolve_page_size = size;
        self
    }

    /// Replace the enrichment fault policy.
    pub fn enrichment(mut self, policy: EnrichmentPolicy) -> Self {
        self.config.enrichment = policy;
        self
    }

    /// Also degrade the given status of the permission lookup.
    pub fn degrade_status(mut self, status: u16) -> Self {
        if !self.config.enrichment.degrade_status.contains(&status) {
            self.config.enrichment.degrade_status.push(status);
        }
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> ConnectorResult<ConnectorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
