//! Unified error types for the stack client.

use thiserror::Error;

use crate::routing::ServiceKind;

/// Unified error type for the stack client and watcher.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Endpoint routing error.
    #[error("routing error: {0}")]
    Route(#[from] RouteError),

    /// Transport-level HTTP failure (connection refused, DNS, timeout).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Typed service call error.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Endpoint routing and URL construction errors.
#[derive(Error, Debug)]
pub enum RouteError {
    /// Endpoint path matched no configured prefix.
    ///
    /// The original dashboard silently dispatched such requests against an
    /// empty base URL; here an unrouted endpoint is a configuration error.
    #[error("endpoint {endpoint} matches no configured route prefix")]
    UnroutedEndpoint {
        /// The endpoint path that failed to route.
        endpoint: String,
    },

    /// Endpoint paths must be absolute.
    #[error("endpoint {endpoint} must start with '/'")]
    RelativeEndpoint {
        /// The offending endpoint path.
        endpoint: String,
    },

    /// A resolved base address could not be parsed as a URL.
    #[error("invalid base address for {service}: {reason}")]
    InvalidBase {
        /// The service whose base address was invalid.
        service: ServiceKind,
        /// Parse failure detail.
        reason: String,
    },
}

/// Errors from the typed auth/item service wrappers.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Service replied with an unexpected HTTP status.
    #[error("{service} returned HTTP {status} for {endpoint}")]
    UnexpectedStatus {
        /// Which service replied.
        service: ServiceKind,
        /// The status code received.
        status: u16,
        /// The endpoint that was called.
        endpoint: String,
    },

    /// Resource does not exist.
    #[error("{service} has no resource at {endpoint}")]
    NotFound {
        /// Which service replied.
        service: ServiceKind,
        /// The endpoint that was called.
        endpoint: String,
    },

    /// A request component could not be constructed.
    #[error("invalid request for {service} {endpoint}: {reason}")]
    InvalidRequest {
        /// The service being called.
        service: ServiceKind,
        /// The endpoint that was being built.
        endpoint: String,
        /// What was wrong with the request.
        reason: String,
    },

    /// Response body could not be decoded into the expected shape.
    #[error("failed to decode {service} response from {endpoint}: {reason}")]
    Decode {
        /// Which service replied.
        service: ServiceKind,
        /// The endpoint that was called.
        endpoint: String,
        /// Decode failure detail.
        reason: String,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ClientError>;
