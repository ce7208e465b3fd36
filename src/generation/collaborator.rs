//! The external generation collaborator interface.

use crate::error::ApiError;
use crate::item::GeneratedItem;
use crate::types::Tier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Subject label plus the combined crib a request is generated under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub subject_label: String,
    pub crib: Option<String>,
}

impl GenerationContext {
    pub const FALLBACK_LABEL: &'static str = "General";

    /// Context used when the subject could not be loaded.
    pub fn fallback(crib: Option<String>) -> Self {
        Self {
            subject_label: Self::FALLBACK_LABEL.to_string(),
            crib,
        }
    }
}

/// Per-call options handed to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub tier: Tier,
    pub count: u32,
    pub language: String,
    pub topic_name: String,
    pub context: GenerationContext,
    pub comment: Option<String>,
    /// Previously generated questions; advisory only.
    pub dedup_hints: Vec<String>,
}

/// A structured-JSON completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPrompt {
    pub system: String,
    pub user: String,
}

/// The generative model as seen by the pipeline. Calls may fail or time out.
#[async_trait]
pub trait GenerationCollaborator: Send + Sync {
    /// Questions grounded in pages `page_start..=page_end` of a stored document.
    async fn generate_from_document(
        &self,
        document_key: &str,
        page_start: u32,
        page_end: u32,
        options: &GenerationOptions,
    ) -> Result<Vec<GeneratedItem>, ApiError>;

    /// Questions grounded in plain text.
    async fn generate_from_text(
        &self,
        text: &str,
        options: &GenerationOptions,
    ) -> Result<Vec<GeneratedItem>, ApiError>;

    /// Raw completion expected to be a JSON object. Unparsable output is an error.
    async fn complete_json(&self, prompt: &JsonPrompt) -> Result<serde_json::Value, ApiError>;

    /// Model identifier recorded in provenance.
    fn model_name(&self) -> &str;
}
