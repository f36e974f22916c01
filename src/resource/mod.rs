//! Resource model of the connector.
//!
//! # Key Types
//!
//! - [`ResourceKind`] - closed set of provisioned kinds with their routing bundles
//! - [`AttributeBag`] - flat path to values mapping exchanged with the framework
//! - [`IdentityRecord`] - a resource as delivered to the caller
//! - [`EnrichmentMap`] - tenant and space roles joined onto an account
//! - [`directory`] and [`platform`] - wire types of the two remote APIs

pub mod bag;
pub mod directory;
pub mod kind;
pub mod patch;
pub mod platform;
pub mod record;
pub mod value;

pub use bag::{AttributeBag, AttributePath, ENABLE, NAME, PASSWORD, UID};
pub use kind::{KindBundle, ResourceKind};
pub use patch::{PatchOp, PatchOperation, PatchRequest};
pub use record::{EnrichmentMap, IdentityRecord, RoleAssignment, ScopeKind};
pub use value::{AttributeValue, EmbeddedObject, GuardedString};
