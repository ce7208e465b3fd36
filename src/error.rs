//! Error types for the question generation pipeline.

use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Corrupt record under {key}: {message}")]
    CorruptRecord { key: String, message: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors surfaced by the pipeline operations
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Generation failed for {tier} tier: {source}")]
    TierFailed {
        tier: crate::types::Tier,
        #[source]
        source: Box<ApiError>,
    },

    #[error("Model response could not be parsed: {0}")]
    MalformedResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ApiError {
    /// True for failures that originate in the generative model call path.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            ApiError::GenerationFailed(_)
                | ApiError::TierFailed { .. }
                | ApiError::MalformedResponse(_)
                | ApiError::ProviderError(_)
                | ApiError::ProviderRequestFailed(_)
                | ApiError::ProviderAuthFailed(_)
                | ApiError::ProviderRateLimit(_)
                | ApiError::ProviderModelNotFound(_)
        )
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
