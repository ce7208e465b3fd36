//! Generation collaborator backed by a chat-completion provider.

use crate::error::ApiError;
use crate::generation::collaborator::{GenerationCollaborator, GenerationOptions, JsonPrompt};
use crate::generation::prompt::{self, Grounding};
use crate::item::GeneratedItem;
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient};
use crate::store::{page_window_text, DocumentStore};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub struct ProviderCollaborator {
    client: Arc<dyn ModelProviderClient>,
    documents: Arc<dyn DocumentStore>,
    options: CompletionOptions,
}

impl ProviderCollaborator {
    pub fn new(
        client: Arc<dyn ModelProviderClient>,
        documents: Arc<dyn DocumentStore>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            client,
            documents,
            options,
        }
    }

    async fn ask_for_questions(
        &self,
        grounding: Grounding<'_>,
        options: &GenerationOptions,
    ) -> Result<Vec<GeneratedItem>, ApiError> {
        let messages = prompt::question_messages(options, grounding);
        let response = self.client.complete(messages, self.options.clone()).await?;
        debug!(
            provider = self.client.provider_name(),
            model = %response.model,
            tier = %options.tier,
            completion_tokens = response.usage.completion_tokens,
            "Question completion received"
        );
        prompt::parse_questions(&response.content, options.count)
    }
}

#[async_trait]
impl GenerationCollaborator for ProviderCollaborator {
    async fn generate_from_document(
        &self,
        document_key: &str,
        page_start: u32,
        page_end: u32,
        options: &GenerationOptions,
    ) -> Result<Vec<GeneratedItem>, ApiError> {
        let bytes = self.documents.fetch(document_key)?;
        let text = page_window_text(&bytes, page_start, page_end);
        if text.is_empty() {
            return Err(ApiError::GenerationFailed(format!(
                "pages {}-{} of document {} contain no text",
                page_start, page_end, document_key
            )));
        }
        self.ask_for_questions(
            Grounding::Document {
                key: document_key,
                page_start,
                page_end,
                text: &text,
            },
            options,
        )
        .await
    }

    async fn generate_from_text(
        &self,
        text: &str,
        options: &GenerationOptions,
    ) -> Result<Vec<GeneratedItem>, ApiError> {
        self.ask_for_questions(Grounding::Text(text), options).await
    }

    async fn complete_json(&self, json_prompt: &JsonPrompt) -> Result<Value, ApiError> {
        let messages = vec![
            ChatMessage::system(json_prompt.system.clone()),
            ChatMessage::user(json_prompt.user.clone()),
        ];
        let options = CompletionOptions {
            json_mode: true,
            ..self.options.clone()
        };
        let response = self.client.complete(messages, options).await?;
        prompt::parse_json_payload(&response.content)
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}
