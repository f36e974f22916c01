//! Schema introspection for the provisioned resource kinds.
//!
//! Provider schemas are parsed into [`SchemaResource`] values and flattened by
//! the [`SchemaIntrospector`] into a [`Catalog`] of object classes. The
//! catalog is built once and is read-only afterwards.
//!
//! # Key Types
//!
//! - [`SchemaResource`] - a provider declared schema with nested definitions
//! - [`Catalog`] - unified attribute catalog, one entry per object class
//! - [`AttributeInfo`] - flattened definition of one attribute path
//!
//! # Examples
//!
//! ```rust
//! use pcf_connector::schema::SchemaIntrospector;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = SchemaIntrospector::builtin()?;
//! let account = catalog.object_class("__ACCOUNT__").unwrap();
//! assert!(account.attribute("name.familyName").is_some());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod embedded;
pub mod introspector;
pub mod types;


pub use catalog::{AttributeInfo, Catalog, ObjectClassInfo, ValueType};
pub use introspector::SchemaIntrospector;
pub use types::{AttributeDefinition, AttributeType, Mutability, Returned, SchemaResource};
