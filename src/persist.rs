//! Persistence of generated items and the topic progress update that follows each batch.

use crate::crib::join_cribs;
use crate::error::ApiError;
use crate::item::{GeneratedItem, PersistedItem, Provenance};
use crate::store::RecordStore;
use crate::types::{AuthorId, SubjectId, Tier, TopicId};
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use unicode_normalization::UnicodeNormalization;

/// Batch-level attributes shared by every item in one save.
#[derive(Debug, Clone)]
pub struct PersistBatch {
    pub author_id: AuthorId,
    pub topic_id: Option<TopicId>,
    pub subject_id: Option<SubjectId>,
    pub grade: Option<u32>,
    /// Tier for items that arrive without one.
    pub fallback_tier: Option<Tier>,
    pub language: String,
    pub provenance: Provenance,
}

#[derive(Debug, Clone)]
pub struct PersistOutcome {
    pub saved: Vec<PersistedItem>,
    pub stats_updated: bool,
}

impl PersistOutcome {
    pub fn empty() -> Self {
        Self {
            saved: Vec::new(),
            stats_updated: false,
        }
    }
}

/// Writes `items` in one batch, then bumps the topic's progress counters.
///
/// An empty batch touches nothing. A failed batch write is an error and nothing counts as
/// saved. A failed counter update is logged and reported through `stats_updated`; the items
/// stay saved.
pub fn persist(
    store: &dyn RecordStore,
    items: Vec<GeneratedItem>,
    batch: &PersistBatch,
) -> Result<PersistOutcome, ApiError> {
    if items.is_empty() {
        return Ok(PersistOutcome::empty());
    }

    let crib = current_crib(store, batch);
    let created_at = Utc::now();
    let saved: Vec<PersistedItem> = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| to_persisted(item, index, batch, crib.clone(), created_at))
        .collect();

    store.insert_items(&saved)?;
    info!(
        topic_id = batch.topic_id.as_deref().unwrap_or("-"),
        saved = saved.len(),
        model = %batch.provenance.model,
        "Persisted generated items"
    );

    let stats_updated = match batch.topic_id.as_deref() {
        Some(topic_id) => match store.apply_progress(topic_id, saved.len() as u64) {
            Ok(update) => {
                info!(
                    topic_id,
                    total = update.after.total,
                    remaining = update.after.remaining,
                    active = update.is_active_ai_generation,
                    "Topic progress updated"
                );
                true
            }
            Err(err) => {
                warn!(topic_id, error = %err, "Topic progress update failed; items remain saved");
                false
            }
        },
        None => false,
    };

    Ok(PersistOutcome {
        saved,
        stats_updated,
    })
}

// Fresh read of both cribs so the snapshot reflects edits made since generation started.
fn current_crib(store: &dyn RecordStore, batch: &PersistBatch) -> Option<String> {
    let subject_crib = batch.subject_id.as_deref().and_then(|id| {
        store
            .get_subject(id)
            .map_err(|err| warn!(subject_id = id, error = %err, "Subject crib lookup failed"))
            .ok()
            .flatten()
            .and_then(|subject| subject.crib)
    });
    let topic_crib = batch.topic_id.as_deref().and_then(|id| {
        store
            .get_topic(id)
            .map_err(|err| warn!(topic_id = id, error = %err, "Topic crib lookup failed"))
            .ok()
            .flatten()
            .and_then(|topic| topic.crib)
    });
    join_cribs(subject_crib.as_deref(), topic_crib.as_deref())
}

fn to_persisted(
    item: GeneratedItem,
    index: usize,
    batch: &PersistBatch,
    crib: Option<String>,
    created_at: DateTime<Utc>,
) -> PersistedItem {
    let id = item_id(batch.topic_id.as_deref(), created_at, index, &item.question);
    PersistedItem {
        id,
        question: item.question,
        options: item.options,
        correct_answer: item.correct_answer,
        explanation: item.explanation,
        tier: item.tier.or(batch.fallback_tier),
        author_id: batch.author_id.clone(),
        topic_id: batch.topic_id.clone(),
        subject_id: batch.subject_id.clone(),
        grade: batch.grade,
        language: batch.language.clone(),
        crib,
        provenance: batch.provenance.clone(),
        is_published: false,
        created_at,
    }
}

fn item_id(
    topic_id: Option<&str>,
    created_at: DateTime<Utc>,
    index: usize,
    question: &str,
) -> String {
    let normalized: String = question.trim().nfc().collect();
    let mut hasher = blake3::Hasher::new();
    hasher.update(topic_id.unwrap_or("").as_bytes());
    hasher.update(&[0]);
    hasher.update(created_at.to_rfc3339().as_bytes());
    hasher.update(&(index as u64).to_le_bytes());
    hasher.update(normalized.as_bytes());
    hex::encode(&hasher.finalize().as_bytes()[..16])
}
