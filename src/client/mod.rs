//! Request builders for the two remote APIs.
//!
//! The clients know paths, query parameters and bodies of every call the
//! engine makes, and decode the responses into the wire types of
//! [`crate::resource`]. They borrow a [`Transport`](crate::transport::Transport)
//! and hold no other state.

pub mod directory;
pub mod platform;

pub use directory::{DirectoryClient, DirectoryQuery};
pub use platform::{PlatformClient, PlatformQuery};

use crate::error::{ConnectorResult, RemoteFault};
use crate::transport::Service;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a response body that must be present.
fn decode<R: DeserializeOwned>(service: Service, body: Option<Value>) -> ConnectorResult<R> {
    let body = body.ok_or_else(|| RemoteFault::new(service, 0, "response carried no body"))?;
    Ok(serde_json::from_value(body)?)
}
