//! Identity connector engine for Cloud Foundry.
//!
//! Provisions accounts and groups in the user directory and tenants
//! (organizations) and spaces on the platform API. Resources are exchanged
//! with the connector framework as flat attribute bags and converted to the
//! providers' wire formats through static descriptor tables.
//!
//! # Core Components
//!
//! - [`ResourceDispatcher`] - Routes create, update, delete, resolve and search
//! - [`schema::SchemaIntrospector`] - Builds the unified attribute catalog
//! - [`codec`] - Converts between attribute bags and wire resources
//! - [`enumerator`] - Pages through provider lists with per-kind termination
//! - [`filter::FilterTranslator`] - Turns framework filters into native queries
//! - [`transport::Transport`] - Seam to the two remote APIs
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pcf_connector::{ConnectorConfig, ResourceDispatcher};
//! use pcf_connector::resource::{AttributeBag, NAME, ResourceKind};
//! use pcf_connector::transport::InMemoryTransport;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectorConfig::builder()
//!     .directory_url("https://uaa.example.com")
//!     .platform_url("https://api.example.com")
//!     .build()?;
//! let dispatcher = ResourceDispatcher::new(InMemoryTransport::new(), config)?;
//! let org = dispatcher
//!     .create(ResourceKind::Tenant, &AttributeBag::new().with(NAME, "acme"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod enumerator;
pub mod error;
pub mod filter;
pub mod resource;
pub mod schema;
pub mod transport;

// Re-export commonly used types for convenience
pub use config::{ConnectorConfig, EnrichmentPolicy};
pub use dispatcher::{ResourceDispatcher, SearchOptions};
pub use enumerator::{EnumerationSummary, PaginationPolicy};
pub use error::{ConnectorError, ConnectorResult, RemoteFault, ValidationError};
pub use filter::{Comparison, Filter, FilterTranslator, Operator};
pub use resource::{AttributeBag, AttributeValue, EmbeddedObject, IdentityRecord, ResourceKind};
pub use schema::{Catalog, SchemaIntrospector};
pub use transport::{InMemoryTransport, RestRequest, Service, Transport};
