//! services/catalog_client/src/error.rs
//!
//! Defines the error type for assembling the catalog client. Resource and identity
//! failures stay typed as `PortError` and `IdentityError` at their call sites.

use crate::config::ConfigError;

/// The primary error type for the `catalog_client` crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a failure while building the underlying HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
