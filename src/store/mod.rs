//! Record and document stores
//!
//! The pipeline treats persistence as an opaque transactional record store. The only
//! mutation it performs on curriculum records is the atomic progress update.

pub mod documents;
pub mod persistence;

pub use documents::{page_window_text, DirectoryDocumentStore, SledDocumentStore};
pub use persistence::SledRecordStore;

use crate::curriculum::{ProgressCounters, SubjectContext, TopicContext};
use crate::error::StorageError;
use crate::item::PersistedItem;

/// Outcome of one atomic progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub before: ProgressCounters,
    pub after: ProgressCounters,
    pub is_active_ai_generation: bool,
}

/// Record store interface
pub trait RecordStore: Send + Sync {
    fn get_topic(&self, topic_id: &str) -> Result<Option<TopicContext>, StorageError>;
    fn put_topic(&self, topic: &TopicContext) -> Result<(), StorageError>;

    fn get_subject(&self, subject_id: &str) -> Result<Option<SubjectContext>, StorageError>;
    fn put_subject(&self, subject: &SubjectContext) -> Result<(), StorageError>;

    /// Question texts of the most recent items for a topic, newest first.
    fn recent_question_texts(
        &self,
        topic_id: &str,
        limit: usize,
    ) -> Result<Vec<String>, StorageError>;

    /// Writes all items in one batch; either all land or none do.
    fn insert_items(&self, items: &[PersistedItem]) -> Result<(), StorageError>;

    /// Most recent items for a topic, newest first.
    fn list_items(&self, topic_id: &str, limit: usize) -> Result<Vec<PersistedItem>, StorageError>;

    /// Number of items saved under a topic.
    fn count_items(&self, topic_id: &str) -> Result<usize, StorageError> {
        Ok(self.list_items(topic_id, usize::MAX)?.len())
    }

    /// Atomically adds `saved` to the topic's total, subtracts it from remaining (floored at
    /// zero), and clears the auto-generation flag when nothing remains. Evaluated against the
    /// live stored value.
    fn apply_progress(&self, topic_id: &str, saved: u64) -> Result<ProgressUpdate, StorageError>;
}

/// Opaque byte retrieval by document key.
pub trait DocumentStore: Send + Sync {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}
