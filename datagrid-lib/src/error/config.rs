//! Configuration error types

/// Errors raised when a [`GridConfig`](crate::config::GridConfig) is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Both static data and an endpoint were supplied.
    #[error("Configure either static data or an endpoint, not both")]
    ConflictingSources,

    /// Neither static data nor an endpoint was supplied.
    #[error("No data source configured: supply static data or an endpoint")]
    MissingSource,

    /// A page size of zero.
    #[error("Invalid {field}: must be greater than zero")]
    InvalidPageSize {
        /// Which setting was invalid.
        field: &'static str,
    },

    /// The endpoint is not an absolute http(s) URL.
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The rejected endpoint.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A header name or value cannot be sent over HTTP.
    #[error("Invalid header '{name}'")]
    InvalidHeader {
        /// The offending header name.
        name: String,
    },
}

impl ConfigError {
    /// Creates a new invalid endpoint error.
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}
