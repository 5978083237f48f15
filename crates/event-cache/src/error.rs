//! Error types for cache item operations

use thiserror::Error;

/// Errors that can occur while populating or reading cache items
#[derive(Debug, Error)]
pub enum CacheError {
    /// The remote source confirmed the entity or locale does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport-level failure reported by the loader
    #[error("Communication failure: {0}")]
    CommunicationFailure(String),

    /// Payload failed structural validation and was not merged
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// A fetch failed while the `Throw` strategy was configured
    #[error("Item not available: {request}")]
    ItemNotAvailable {
        /// Description of the failed request, including the failed locales
        request: String,
        /// First underlying failure
        #[source]
        source: Box<CacheError>,
    },

    /// Identifier could not be parsed
    #[error("Invalid URN: {0}")]
    InvalidUrn(String),

    /// Locale could not be parsed
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Invalid cache configuration
    #[error("Invalid cache configuration: {0}")]
    InvalidConfiguration(String),

    /// Snapshot (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error while persisting snapshots
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    /// True for failures the loader may succeed on when asked again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CommunicationFailure(_))
    }
}

/// Result type alias for cache item operations
pub type CacheResult<T> = Result<T, CacheError>;
