//! Unified error handling.
//!
//! Each module defines its own error enum; `ClientError` unifies them for
//! callers that cross module boundaries (the binary, embedders). Note that
//! the managers themselves absorb most failures at their boundary and log
//! instead of returning errors - see the module docs for what actually
//! escapes.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::location::LocationError;
use crate::store::StoreError;

/// Top-level error type for the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Persistent store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Location acquisition failed.
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    /// Backend API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
