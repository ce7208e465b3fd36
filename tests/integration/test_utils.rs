//! Shared test utilities for integration tests
//!
//! A scripted generation collaborator and a scripted chat provider, plus store fixtures.

use async_trait::async_trait;
use parking_lot::Mutex;
use quizforge::config::GenerationSettings;
use quizforge::curriculum::{DocumentRef, ProgressCounters, TopicContext};
use quizforge::error::ApiError;
use quizforge::generation::{GenerationCollaborator, GenerationOptions, JsonPrompt};
use quizforge::item::GeneratedItem;
use quizforge::pipeline::ContentPipeline;
use quizforge::provider::{
    ChatMessage, CompletionOptions, CompletionResponse, ModelProviderClient, TokenUsage,
};
use quizforge::store::{RecordStore, SledRecordStore};
use quizforge::types::Tier;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// What one generation call was grounded on.
#[derive(Debug, Clone, PartialEq)]
pub enum Grounded {
    Document {
        key: String,
        page_start: u32,
        page_end: u32,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub grounded: Grounded,
    pub options: GenerationOptions,
}

/// Collaborator that answers every tier with `count` numbered questions.
///
/// Easy answers last so result order cannot follow completion order.
pub struct ScriptedCollaborator {
    pub calls: Mutex<Vec<RecordedCall>>,
    failing: HashSet<Tier>,
    scene: Value,
    sequence: AtomicUsize,
}

impl ScriptedCollaborator {
    pub fn new() -> Self {
        Self::failing_on(&[])
    }

    pub fn failing_on(tiers: &[Tier]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: tiers.iter().copied().collect(),
            scene: serde_json::json!({}),
            sequence: AtomicUsize::new(0),
        }
    }

    pub fn with_scene(scene: Value) -> Self {
        Self {
            scene,
            ..Self::new()
        }
    }

    async fn answer(
        &self,
        grounded: Grounded,
        options: &GenerationOptions,
    ) -> Result<Vec<GeneratedItem>, ApiError> {
        self.calls.lock().push(RecordedCall {
            grounded,
            options: options.clone(),
        });
        let delay = match options.tier {
            Tier::Easy => 10,
            Tier::Medium => 5,
            Tier::Hard => 0,
        };
        for _ in 0..delay {
            tokio::task::yield_now().await;
        }
        if self.failing.contains(&options.tier) {
            return Err(ApiError::GenerationFailed(format!(
                "{} tier timed out",
                options.tier
            )));
        }
        Ok((0..options.count)
            .map(|_| {
                let n = self.sequence.fetch_add(1, Ordering::SeqCst);
                GeneratedItem {
                    question: format!("{} question {}", options.tier, n),
                    options: vec!["right".to_string(), "wrong".to_string()],
                    correct_answer: "right".to_string(),
                    tier: Some(Tier::Hard),
                    explanation: Some("because".to_string()),
                }
            })
            .collect())
    }
}

#[async_trait]
impl GenerationCollaborator for ScriptedCollaborator {
    async fn generate_from_document(
        &self,
        document_key: &str,
        page_start: u32,
        page_end: u32,
        options: &GenerationOptions,
    ) -> Result<Vec<GeneratedItem>, ApiError> {
        self.answer(
            Grounded::Document {
                key: document_key.to_string(),
                page_start,
                page_end,
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
        self.answer(Grounded::Text(text.to_string()), options).await
    }

    async fn complete_json(&self, _prompt: &JsonPrompt) -> Result<Value, ApiError> {
        Ok(self.scene.clone())
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Chat provider that replays canned replies in order.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    pub received: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            received: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModelProviderClient for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, ApiError> {
        self.received.lock().push(messages);
        let content = self
            .replies
            .lock()
            .pop_front()
            .ok_or_else(|| ApiError::ProviderRequestFailed("no scripted reply left".to_string()))?;
        Ok(CompletionResponse {
            content,
            model: "scripted-chat".to_string(),
            usage: TokenUsage::default(),
            finish_reason: Some("stop".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-chat"
    }
}

pub fn open_store(temp_dir: &TempDir) -> Arc<SledRecordStore> {
    Arc::new(SledRecordStore::new(temp_dir.path().join("store")).unwrap())
}

pub fn pipeline(
    store: &Arc<SledRecordStore>,
    collaborator: Arc<dyn GenerationCollaborator>,
) -> ContentPipeline {
    ContentPipeline::new(store.clone(), collaborator, GenerationSettings::default())
}

/// Topic with a body, active generation, and the given counters.
pub fn seed_topic(store: &SledRecordStore, id: &str, total: u64, remaining: u64) -> TopicContext {
    let mut topic = TopicContext::new(id, "Cells");
    topic.body = Some("Cells are the basic unit of life.".to_string());
    topic.progress = ProgressCounters::new(total, remaining);
    topic.is_active_ai_generation = true;
    store.put_topic(&topic).unwrap();
    topic
}

pub fn document(key: &str, start: Option<u32>, end: Option<u32>) -> DocumentRef {
    DocumentRef {
        key: key.to_string(),
        page_start: start,
        page_end: end,
    }
}
