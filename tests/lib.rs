//! Connector Engine Integration Test Suite
//!
//! Exercises the dispatcher end to end against the in-memory simulation of
//! the directory and platform APIs.
//!
//! ## Test Organization
//!
//! - `integration/` - Scenario tests grouped by concern
//!   - `provisioning` - Create, update, delete and assignments across both APIs
//!   - `enumeration` - Paging conventions, early stop and record ordering
//!   - `enrichment` - Group and role references delivered with accounts
//!
//! ## Test Utilities
//!
//! - `common/` - Dispatcher construction, seed data and record collection
//!
//! ## Usage
//!
//! ```bash
//! cargo test
//! RUST_LOG=debug cargo test enumeration -- --nocapture
//! ```

extern crate pcf_connector;

pub mod common;
pub mod integration;
