//! Curriculum records read by the pipeline.
//!
//! Topics and subjects are owned by the curriculum subsystem; the pipeline only reads them,
//! except for a topic's progress counters and auto-generation flag, which change through
//! [`crate::store::RecordStore::apply_progress`].

use crate::types::{SubjectId, TopicId};
use serde::{Deserialize, Serialize};

/// Reference to a stored source document and the page window to ground on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub key: String,
    #[serde(default)]
    pub page_start: Option<u32>,
    #[serde(default)]
    pub page_end: Option<u32>,
}

impl DocumentRef {
    /// Both bounds present and ordered.
    pub fn page_range(&self) -> Option<(u32, u32)> {
        match (self.page_start, self.page_end) {
            (Some(start), Some(end)) if end >= start => Some((start, end)),
            _ => None,
        }
    }
}

/// How many items have been generated for a topic versus how many are still wanted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCounters {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub remaining: u64,
}

impl ProgressCounters {
    pub fn new(total: u64, remaining: u64) -> Self {
        Self { total, remaining }
    }

    /// Counters after `saved` new items: total grows, remaining floors at zero.
    pub fn after_saving(self, saved: u64) -> Self {
        Self {
            total: self.total.saturating_add(saved),
            remaining: self.remaining.saturating_sub(saved),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicContext {
    pub id: TopicId,
    pub name: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub document: Option<DocumentRef>,
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
    #[serde(default)]
    pub grade: Option<u32>,
    #[serde(default)]
    pub progress: ProgressCounters,
    #[serde(default)]
    pub is_active_ai_generation: bool,
    #[serde(default)]
    pub crib: Option<String>,
}

impl TopicContext {
    pub fn new(id: impl Into<TopicId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            body: None,
            ai_summary: None,
            document: None,
            subject_id: None,
            grade: None,
            progress: ProgressCounters::default(),
            is_active_ai_generation: false,
            crib: None,
        }
    }

    /// Applies a saved batch to the counters.
    ///
    /// The active flag is only ever switched off here, once nothing remains.
    pub fn record_saved(&mut self, saved: u64) {
        self.progress = self.progress.after_saving(saved);
        if self.progress.remaining == 0 {
            self.is_active_ai_generation = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectContext {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub grade: Option<u32>,
    #[serde(default)]
    pub crib: Option<String>,
}

impl SubjectContext {
    pub fn new(id: impl Into<SubjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            grade: None,
            crib: None,
        }
    }

    pub fn display_label(&self) -> String {
        match self.grade {
            Some(grade) => format!("{} (grade {})", self.name, grade),
            None => self.name.clone(),
        }
    }
}
