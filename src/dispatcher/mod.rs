//! Routing of the connector operations to the providers of each resource kind.
//!
//! [`ResourceDispatcher`] is the single entry point of the engine. It owns the
//! transport, the configuration and the unified schema catalog, and maps each
//! logical operation onto the per-kind bundle: the directory for accounts and
//! groups, the platform API for tenants and spaces.
//!
//! Preconditions (identifier present, name present on create, value set not
//! empty on partial updates) are checked before any request is issued.
//!
//! # Module Organization
//!
//! * [`core`] - Dispatcher construction and schema loading
//! * [`operations`] - Create, update, delete and name resolution
//! * [`assignment`] - Adding and removing attribute values
//! * [`search`] - Paged search with projection and native filters
//!
//! # Example Usage
//!
//! ```rust
//! use pcf_connector::{ConnectorConfig, ResourceDispatcher, SearchOptions};
//! use pcf_connector::resource::{AttributeBag, NAME, ResourceKind};
//! use pcf_connector::transport::InMemoryTransport;
//! use std::ops::ControlFlow;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectorConfig::builder()
//!     .directory_url("https://uaa.example.com")
//!     .platform_url("https://api.example.com")
//!     .build()?;
//! let dispatcher = ResourceDispatcher::new(InMemoryTransport::new(), config)?;
//!
//! let bag = AttributeBag::new().with(NAME, "bjensen");
//! let id = dispatcher.create(ResourceKind::Account, &bag).await?;
//! assert_eq!(dispatcher.resolve_by_name(ResourceKind::Account, "bjensen").await?, id);
//!
//! let mut names = Vec::new();
//! dispatcher
//!     .search(ResourceKind::Account, &SearchOptions::default(), |record| {
//!         names.push(record.name);
//!         ControlFlow::Continue(())
//!     })
//!     .await?;
//! assert_eq!(names, vec!["bjensen"]);
//! # Ok(())
//! # }
//! ```

pub mod assignment;
pub mod core;
pub mod operations;
pub mod search;

#[cfg(test)]
mod tests;

pub use core::ResourceDispatcher;
pub use search::SearchOptions;
