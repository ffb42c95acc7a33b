//! Error taxonomy for the search pipeline.
//!
//! Every error here is non-fatal: components catch them at their own boundary
//! and turn them into state transitions or empty results.

use crate::provider::ProviderError;

/// Geocoding lookup failed or returned unparseable data.
#[derive(Debug, thiserror::Error)]
#[error("location lookup failed: {0}")]
pub struct ResolutionError(#[from] pub ProviderError);

/// One leg of the weather lookup failed; the whole lookup fails with it.
#[derive(Debug, thiserror::Error)]
pub enum WeatherFetchError {
    #[error("current weather request failed: {0}")]
    Current(#[source] ProviderError),
    #[error("forecast request failed: {0}")]
    Forecast(#[source] ProviderError),
}

/// Reading or writing the persistence medium failed.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize stored value: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("stored value under '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}
