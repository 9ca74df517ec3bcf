//! Error types

mod api;
mod config;

pub use api::*;
pub use config::*;

/// Crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fetching from the endpoint failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The grid configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a data or config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
