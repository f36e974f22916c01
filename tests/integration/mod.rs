//! Scenario tests against the in-memory APIs.

pub mod enrichment;
pub mod enumeration;
pub mod provisioning;
