//! Error types for servicekit
//!
//! This module defines all error types used throughout the library,
//! using `thiserror` for ergonomic error handling. Operations return the
//! [`Result`] alias; callers that need to classify a failure downcast to
//! [`ServiceKitError`] and ask for its [`ErrorCategory`].

use std::fmt;

use thiserror::Error;

/// Coarse classification of a failure, used when reporting errors to the
/// surrounding pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A remote service was unavailable or answered unexpectedly
    Service,
    /// Invalid configuration or input supplied by the caller
    Configuration,
    /// Local I/O, serialization or HTTP client setup failure
    Infrastructure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Service => "service",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Infrastructure => "infrastructure",
        };
        f.write_str(name)
    }
}

/// Main error type for servicekit operations
#[derive(Error, Debug)]
pub enum ServiceKitError {
    /// The transport failed while talking to a service
    #[error("HTTP {method} request failed: {message}")]
    Service {
        /// HTTP method of the failed request
        method: String,
        /// Description of the underlying transport failure
        message: String,
    },

    /// The response body could not be read to the end
    #[error("HTTP response body could not be read: {0}")]
    BodyRead(String),

    /// A response was expected but none was supplied
    #[error("did not retrieve an HTTP response")]
    NoResponse,

    /// The token endpoint answered with a status other than 200
    #[error("expected response code 200, got '{status}', response body: '{body}'")]
    UnexpectedStatus {
        /// Status code returned by the server
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The response body is not valid JSON for the expected shape
    #[error("HTTP response body could not be parsed as JSON: {body}: {message}")]
    Parse {
        /// Parser error description
        message: String,
        /// Raw response body
        body: String,
    },

    /// A required field is absent or empty in a JSON response
    #[error("expected authToken field '{field}' in json response; response body: '{body}'")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Raw response body
        body: String,
    },

    /// The transport received a non-success status
    #[error("request to {url} returned with response {status}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// Status line, e.g. `401 Unauthorized`
        status: String,
    },

    /// A service call failed
    #[error("{operation}: {url}: {message}")]
    Call {
        /// Static description of the failed operation
        operation: String,
        /// Requested URL
        url: String,
        /// Description of the underlying failure
        message: String,
    },

    /// A file upload to a service failed
    #[error("{operation}: {url}: {message}")]
    Upload {
        /// Static description of the failed operation
        operation: String,
        /// Requested URL
        url: String,
        /// Description of the underlying failure
        message: String,
    },

    /// A URL could not be parsed or lacks a host
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ServiceKitError {
    /// Returns the category a caller should report this failure under.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceKitError::Service { .. }
            | ServiceKitError::BodyRead(_)
            | ServiceKitError::NoResponse
            | ServiceKitError::UnexpectedStatus { .. }
            | ServiceKitError::Parse { .. }
            | ServiceKitError::MissingField { .. }
            | ServiceKitError::HttpStatus { .. }
            | ServiceKitError::Call { .. }
            | ServiceKitError::Upload { .. } => ErrorCategory::Service,
            ServiceKitError::InvalidUrl(_) | ServiceKitError::Config(_) => {
                ErrorCategory::Configuration
            }
            ServiceKitError::Io(_)
            | ServiceKitError::Serialization(_)
            | ServiceKitError::Yaml(_)
            | ServiceKitError::Http(_) => ErrorCategory::Infrastructure,
        }
    }
}

/// Looks up the category of an error returned by this crate.
///
/// Errors that did not originate here are reported as infrastructure
/// failures.
pub fn category_of(error: &anyhow::Error) -> ErrorCategory {
    error
        .downcast_ref::<ServiceKitError>()
        .map(ServiceKitError::category)
        .unwrap_or(ErrorCategory::Infrastructure)
}

/// Result type alias for servicekit operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
