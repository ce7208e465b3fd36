//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::TierFailed { tier, source } => {
            format!("Generation failed for {} tier; nothing was saved: {}", tier, source)
        }
        ApiError::ProviderAuthFailed(_) => {
            format!("{} (check provider.api_key or the provider's API key variable)", e)
        }
        _ if e.is_generation_failure() => format!("Generation failed; nothing was saved: {}", e),
        _ => e.to_string(),
    }
}
