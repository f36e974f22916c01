//! Error types for connector operations.
//!
//! Every public operation either returns a well-formed result or exactly one
//! [`ConnectorError`]. Validation failures are raised before any remote call
//! is issued; remote faults carry the originating provider error code and are
//! surfaced unchanged.

use crate::resource::ResourceKind;
use crate::transport::Service;

/// Main error type for connector operations.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// A precondition was violated before any remote call was made
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A lookup by attribute value found no resource
    #[error("{kind} with {attribute} '{value}' not found")]
    NotFound {
        kind: ResourceKind,
        attribute: String,
        value: String,
    },

    /// A lookup by name matched more than one resource
    #[error("{kind} name '{name}' is ambiguous, {matches} resources match")]
    Ambiguous {
        kind: ResourceKind,
        name: String,
        matches: usize,
    },

    /// The remote API rejected a request or could not be reached
    #[error("Remote fault: {0}")]
    Remote(#[from] RemoteFault),

    /// Converting or enriching a single record failed during enumeration
    #[error("Processing {kind} '{identifier}' failed: {source}")]
    Processing {
        kind: ResourceKind,
        identifier: String,
        #[source]
        source: Box<ConnectorError>,
    },

    /// The object class name does not denote a known resource kind
    #[error("Unsupported resource kind: {0}")]
    UnsupportedKind(String),

    /// The operation is not available for the resource kind
    #[error("Unsupported operation '{operation}' for resource kind '{kind}'")]
    UnsupportedOperation {
        kind: ResourceKind,
        operation: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The connector configuration is not usable
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },
}

/// Precondition failures detected before a request leaves the connector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// No resource kind was supplied
    #[error("Resource kind is required")]
    MissingResourceKind,

    /// Identifier is absent or blank
    #[error("Identifier of the {kind} resource must not be blank")]
    MissingIdentifier { kind: ResourceKind },

    /// The naming attribute needed to create a resource is absent
    #[error("Attribute '{attribute}' is required to create a {kind} resource")]
    MissingName {
        kind: ResourceKind,
        attribute: String,
    },

    /// A partial update was requested without any value
    #[error("At least one attribute value is required")]
    MissingValues,

    /// An attribute carries more values than the operation accepts
    #[error("Attribute '{attribute}' accepts at most one value, got {count}")]
    TooManyValues { attribute: String, count: usize },

    /// A value cannot be coerced to the type the attribute requires
    #[error("Attribute '{attribute}' has invalid value '{value}', expected {expected}")]
    InvalidValue {
        attribute: String,
        value: String,
        expected: &'static str,
    },

    /// An embedded value does not belong to the expected object class
    #[error("Attribute '{attribute}' expects embedded objects of class '{expected}'")]
    UnexpectedObjectClass { attribute: String, expected: String },
}

/// A non-success response or transport failure reported by a remote API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{service} responded {status}{}: {message}", code_suffix(.code))]
pub struct RemoteFault {
    /// API that produced the fault
    pub service: Service,
    /// HTTP status code, `0` when no response was received
    pub status: u16,
    /// Provider specific error code, e.g. `scim_resource_not_found`
    pub code: Option<String>,
    /// Human readable description
    pub message: String,
}

impl RemoteFault {
    /// Create a fault without a provider error code.
    pub fn new(service: Service, status: u16, message: impl Into<String>) -> Self {
        Self {
            service,
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Attach the provider error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Whether the fault reports a missing resource.
    pub fn is_not_found(&self) -> bool {
        if self.status == 404 {
            return true;
        }
        match self.code.as_deref() {
            Some("scim_resource_not_found") => true,
            Some(code) => code.starts_with("CF-") && code.ends_with("NotFound"),
            None => false,
        }
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|code| format!(" ({code})"))
        .unwrap_or_default()
}

// Convenience methods for creating common errors
impl ConnectorError {
    /// Create a not found error
    pub fn not_found(
        kind: ResourceKind,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            kind,
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Create an ambiguous name error
    pub fn ambiguous(kind: ResourceKind, name: impl Into<String>, matches: usize) -> Self {
        Self::Ambiguous {
            kind,
            name: name.into(),
            matches,
        }
    }

    /// Wrap a per-record failure raised while enumerating
    pub fn processing(kind: ResourceKind, identifier: impl Into<String>, source: Self) -> Self {
        Self::Processing {
            kind,
            identifier: identifier.into(),
            source: Box::new(source),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported_operation(kind: ResourceKind, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            kind,
            operation: operation.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The remote fault behind this error, looking through processing wrappers.
    pub fn remote_fault(&self) -> Option<&RemoteFault> {
        match self {
            Self::Remote(fault) => Some(fault),
            Self::Processing { source, .. } => source.remote_fault(),
            _ => None,
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Result type for precondition checks.
pub type ValidationResult<T> = Result<T, ValidationError>;
