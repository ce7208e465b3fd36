//! Generated and persisted question items.

use crate::types::{AuthorId, SubjectId, Tier, TopicId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A question as returned by the generation collaborator. Transient until persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedItem {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub tier: Option<Tier>,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Which model produced an item, and through which action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub model: String,
    pub action: String,
}

/// A stored question. Written once; never updated by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedItem {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub tier: Option<Tier>,
    pub author_id: AuthorId,
    pub topic_id: Option<TopicId>,
    pub subject_id: Option<SubjectId>,
    pub grade: Option<u32>,
    pub language: String,
    pub crib: Option<String>,
    pub provenance: Provenance,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}
