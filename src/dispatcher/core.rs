//! Dispatcher structure, construction and schema loading.

use crate::client::DirectoryClient;
use crate::config::ConnectorConfig;
use crate::error::{ConnectorResult, ValidationError};
use crate::resource::ResourceKind;
use crate::schema::{Catalog, SchemaIntrospector};
use crate::transport::Transport;
use log::info;

/// Entry point routing every operation to the provider of its resource kind.
///
/// The schema catalog is built once at construction from the schemas shipped
/// with the crate and is read-only afterwards, except through
/// [`load_schema`](Self::load_schema) which merges in what the directory
/// publishes.
///
/// # Type Parameters
///
/// * `T` - The transport carrying requests to both APIs
pub struct ResourceDispatcher<T> {
    pub(super) transport: T,
    pub(super) config: ConnectorConfig,
    pub(super) catalog: Catalog,
}

impl<T: Transport> ResourceDispatcher<T> {
    /// Creates a dispatcher over `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Configuration`](crate::ConnectorError::Configuration)
    /// if the configuration is not usable, or a JSON error if a built-in
    /// schema cannot be parsed.
    pub fn new(transport: T, config: ConnectorConfig) -> ConnectorResult<Self> {
        config.validate()?;
        let catalog = SchemaIntrospector::builtin()?;
        info!(
            "Resource dispatcher ready: directory {}, platform {}, {} object classes",
            config.directory_url,
            config.platform_url,
            catalog.len()
        );
        Ok(Self {
            transport,
            config,
            catalog,
        })
    }

    /// Merge the schemas published by the directory into the catalog.
    ///
    /// Returns the number of schema resources loaded. Definitions loaded later
    /// replace earlier ones attribute by attribute.
    pub async fn load_schema(&mut self) -> ConnectorResult<usize> {
        let resources = DirectoryClient::new(&self.transport).schemas().await?;
        self.catalog
            .extend(SchemaIntrospector::build(resources.iter()));
        info!(
            "Loaded {} directory schemas, catalog has {} object classes",
            resources.len(),
            self.catalog.len()
        );
        Ok(resources.len())
    }

    /// The unified attribute catalog.
    pub fn schema(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

/// The identifier, trimmed, or a validation failure when it is blank.
pub(super) fn require_id(kind: ResourceKind, id: &str) -> Result<&str, ValidationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::MissingIdentifier { kind });
    }
    Ok(id)
}
