//! Content pipeline facade
//!
//! Wires the record store and the generation collaborator together and exposes each stage,
//! plus the end-to-end run: context, mode, dedup hints, multi-tier generation, persistence.

use crate::config::GenerationSettings;
use crate::crib;
use crate::curriculum::{SubjectContext, TopicContext};
use crate::dedup;
use crate::error::{ApiError, StorageError};
use crate::generation::{self, GenerationCollaborator, GenerationContext, GenerationRequest};
use crate::item::{GeneratedItem, PersistedItem, Provenance};
use crate::mode;
use crate::persist::{self, PersistBatch, PersistOutcome};
use crate::store::RecordStore;
use crate::types::{AuthorId, Mode, RequestedMode, Tier, TierCounts, TopicId};
use crate::visual::{self, VisualRequest, VisualSceneDescription};
use std::sync::Arc;
use tracing::{info, warn};

/// One end-to-end generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub topic_id: TopicId,
    pub counts: TierCounts,
    pub mode: RequestedMode,
    /// Falls back to the configured default language.
    pub language: Option<String>,
    pub comment: Option<String>,
    pub author_id: AuthorId,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub effective_mode: Mode,
    pub saved: Vec<PersistedItem>,
    pub stats_updated: bool,
}

pub struct ContentPipeline {
    store: Arc<dyn RecordStore>,
    collaborator: Arc<dyn GenerationCollaborator>,
    settings: GenerationSettings,
}

impl ContentPipeline {
    pub fn new(
        store: Arc<dyn RecordStore>,
        collaborator: Arc<dyn GenerationCollaborator>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            store,
            collaborator,
            settings,
        }
    }

    pub fn compose_crib(
        &self,
        subject: Option<&SubjectContext>,
        topic: Option<&TopicContext>,
    ) -> Option<String> {
        crib::compose_crib(subject, topic)
    }

    pub fn select_mode(&self, requested: RequestedMode, topic: &TopicContext) -> Mode {
        mode::select_mode(requested, topic)
    }

    pub fn fetch_dedup_hints(&self, topic_id: &str) -> Vec<String> {
        dedup::fetch_dedup_hints(self.store.as_ref(), topic_id, self.settings.dedup_limit)
    }

    pub async fn generate_tier(
        &self,
        request: &GenerationRequest,
        tier: Tier,
        count: u32,
    ) -> Result<Vec<GeneratedItem>, ApiError> {
        generation::generate_tier(self.collaborator.as_ref(), request, tier, count).await
    }

    pub async fn generate_multi_tier(
        &self,
        request: &GenerationRequest,
        counts: TierCounts,
    ) -> Result<Vec<GeneratedItem>, ApiError> {
        generation::generate_multi_tier(self.collaborator.as_ref(), request, counts).await
    }

    pub fn persist(
        &self,
        items: Vec<GeneratedItem>,
        batch: &PersistBatch,
    ) -> Result<PersistOutcome, ApiError> {
        persist::persist(self.store.as_ref(), items, batch)
    }

    pub async fn generate_visual(
        &self,
        request: &VisualRequest,
    ) -> Result<VisualSceneDescription, ApiError> {
        visual::generate_visual(self.collaborator.as_ref(), request).await
    }

    /// Loads a topic. A missing topic is an error; there is nothing to generate for.
    pub fn load_topic(&self, topic_id: &str) -> Result<TopicContext, ApiError> {
        self.store
            .get_topic(topic_id)?
            .ok_or_else(|| StorageError::TopicNotFound(topic_id.to_string()).into())
    }

    /// The topic's subject, if it can be loaded. Lookup failures are logged and swallowed.
    pub fn load_subject(&self, topic: &TopicContext) -> Option<SubjectContext> {
        let subject_id = topic.subject_id.as_deref()?;
        match self.store.get_subject(subject_id) {
            Ok(Some(subject)) => Some(subject),
            Ok(None) => {
                warn!(topic_id = %topic.id, subject_id, "Subject not found; using generic label");
                None
            }
            Err(err) => {
                warn!(
                    topic_id = %topic.id,
                    subject_id,
                    error = %err,
                    "Subject lookup failed; using generic label"
                );
                None
            }
        }
    }

    /// Generation context for a topic: subject label plus combined crib.
    pub fn generation_context(
        &self,
        subject: Option<&SubjectContext>,
        topic: &TopicContext,
    ) -> GenerationContext {
        let crib = self.compose_crib(subject, Some(topic));
        match subject {
            Some(subject) => GenerationContext {
                subject_label: subject.display_label(),
                crib,
            },
            None => GenerationContext::fallback(crib),
        }
    }

    /// Runs the whole pipeline for one topic.
    ///
    /// Generation is all-or-nothing; when any tier fails nothing is persisted.
    pub async fn run(&self, request: GenerateRequest) -> Result<PipelineOutcome, ApiError> {
        let topic = self.load_topic(&request.topic_id)?;
        let subject = self.load_subject(&topic);
        let context = self.generation_context(subject.as_ref(), &topic);
        let effective_mode = self.select_mode(request.mode, &topic);
        let dedup_hints = self.fetch_dedup_hints(&topic.id);
        let language = request
            .language
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_language.clone());

        info!(
            topic_id = %topic.id,
            mode = %effective_mode,
            requested = request.counts.total(),
            hints = dedup_hints.len(),
            "Starting generation run"
        );

        let generation_request = GenerationRequest {
            topic: topic.clone(),
            context,
            language: language.clone(),
            mode: effective_mode,
            comment: request.comment.clone(),
            dedup_hints,
        };
        let items = self
            .generate_multi_tier(&generation_request, request.counts)
            .await?;

        let batch = PersistBatch {
            author_id: request.author_id,
            topic_id: Some(topic.id.clone()),
            subject_id: topic.subject_id.clone(),
            grade: topic.grade.or_else(|| subject.as_ref().and_then(|s| s.grade)),
            fallback_tier: None,
            language,
            provenance: Provenance {
                model: self.collaborator.model_name().to_string(),
                action: self.settings.action_name.clone(),
            },
        };
        let outcome = self.persist(items, &batch)?;

        Ok(PipelineOutcome {
            effective_mode,
            saved: outcome.saved,
            stats_updated: outcome.stats_updated,
        })
    }
}
