//! Sled-backed record store

use crate::curriculum::{SubjectContext, TopicContext};
use crate::error::StorageError;
use crate::item::PersistedItem;
use crate::store::{ProgressUpdate, RecordStore};
use serde::de::DeserializeOwned;
use sled::{Db, Tree};
use std::io;
use std::path::Path;

const TREE_TOPICS: &str = "topics";
const TREE_SUBJECTS: &str = "subjects";
const TREE_ITEMS: &str = "items";
const ITEM_SEQ_PAD: usize = 20;
const UNASSIGNED_TOPIC: &str = "_";

/// Sled-based implementation of [`RecordStore`].
///
/// Topics and subjects are bincode-encoded; items are JSON so they stay readable outside the
/// pipeline.
#[derive(Clone)]
pub struct SledRecordStore {
    db: Db,
    topics: Tree,
    subjects: Tree,
    items: Tree,
}

impl SledRecordStore {
    /// Open (or create) a store at the given directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| {
            StorageError::IoError(io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to open sled database: {}", e),
            ))
        })?;
        Self::from_db(db)
    }

    pub fn from_db(db: Db) -> Result<Self, StorageError> {
        let topics = db.open_tree(TREE_TOPICS).map_err(to_storage_io)?;
        let subjects = db.open_tree(TREE_SUBJECTS).map_err(to_storage_io)?;
        let items = db.open_tree(TREE_ITEMS).map_err(to_storage_io)?;
        Ok(Self {
            db,
            topics,
            subjects,
            items,
        })
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush().map_err(to_storage_io)?;
        Ok(())
    }

    fn items_for_topic(
        &self,
        topic_id: &str,
    ) -> impl Iterator<Item = Result<PersistedItem, StorageError>> + '_ {
        let prefix = format!("{}:", topic_id);
        let topic_id = topic_id.to_string();
        self.items
            .scan_prefix(prefix.as_bytes())
            .rev()
            .map(|entry| {
                let (key, value) = entry.map_err(to_storage_io)?;
                decode_json::<PersistedItem>(&key, &value)
            })
            .filter(move |item| match item {
                Ok(item) => item.topic_id.as_deref() == Some(topic_id.as_str()),
                Err(_) => true,
            })
    }
}

impl RecordStore for SledRecordStore {
    fn get_topic(&self, topic_id: &str) -> Result<Option<TopicContext>, StorageError> {
        match self.topics.get(topic_id.as_bytes()).map_err(to_storage_io)? {
            Some(raw) => Ok(Some(decode_bincode(topic_id.as_bytes(), &raw)?)),
            None => Ok(None),
        }
    }

    fn put_topic(&self, topic: &TopicContext) -> Result<(), StorageError> {
        let value = bincode::serialize(topic).map_err(to_storage_data)?;
        self.topics
            .insert(topic.id.as_bytes(), value)
            .map_err(to_storage_io)?;
        Ok(())
    }

    fn get_subject(&self, subject_id: &str) -> Result<Option<SubjectContext>, StorageError> {
        match self.subjects.get(subject_id.as_bytes()).map_err(to_storage_io)? {
            Some(raw) => Ok(Some(decode_bincode(subject_id.as_bytes(), &raw)?)),
            None => Ok(None),
        }
    }

    fn put_subject(&self, subject: &SubjectContext) -> Result<(), StorageError> {
        let value = bincode::serialize(subject).map_err(to_storage_data)?;
        self.subjects
            .insert(subject.id.as_bytes(), value)
            .map_err(to_storage_io)?;
        Ok(())
    }

    fn recent_question_texts(
        &self,
        topic_id: &str,
        limit: usize,
    ) -> Result<Vec<String>, StorageError> {
        self.items_for_topic(topic_id)
            .take(limit)
            .map(|item| item.map(|item| item.question))
            .collect()
    }

    fn insert_items(&self, items: &[PersistedItem]) -> Result<(), StorageError> {
        let mut batch = sled::Batch::default();
        for item in items {
            let seq = self.db.generate_id().map_err(to_storage_io)?;
            let topic = item.topic_id.as_deref().unwrap_or(UNASSIGNED_TOPIC);
            let key = encode_item_key(topic, seq);
            let value = serde_json::to_vec(item).map_err(to_storage_data)?;
            batch.insert(key.as_bytes(), value);
        }
        self.items.apply_batch(batch).map_err(to_storage_io)?;
        Ok(())
    }

    fn list_items(&self, topic_id: &str, limit: usize) -> Result<Vec<PersistedItem>, StorageError> {
        self.items_for_topic(topic_id).take(limit).collect()
    }

    fn count_items(&self, topic_id: &str) -> Result<usize, StorageError> {
        let prefix = format!("{}:", topic_id);
        let mut count = 0;
        for key in self.items.scan_prefix(prefix.as_bytes()).keys() {
            let key = key.map_err(to_storage_io)?;
            // A longer topic id sharing the prefix ("a" vs "a:b") leaves a non-numeric tail.
            if is_item_seq(&key[prefix.len()..]) {
                count += 1;
            }
        }
        Ok(count)
    }

    fn apply_progress(&self, topic_id: &str, saved: u64) -> Result<ProgressUpdate, StorageError> {
        let mut before = None;
        let mut failure: Option<String> = None;

        // update_and_fetch retries the closure until its compare-and-swap lands, so each
        // attempt starts from the value currently stored.
        let updated = self
            .topics
            .update_and_fetch(topic_id.as_bytes(), |current| {
                failure = None;
                let raw = current?;
                let mut topic: TopicContext = match bincode::deserialize(raw) {
                    Ok(topic) => topic,
                    Err(e) => {
                        failure = Some(e.to_string());
                        return Some(raw.to_vec());
                    }
                };
                before = Some(topic.progress);
                topic.record_saved(saved);
                match bincode::serialize(&topic) {
                    Ok(encoded) => Some(encoded),
                    Err(e) => {
                        failure = Some(e.to_string());
                        Some(raw.to_vec())
                    }
                }
            })
            .map_err(to_storage_io)?;

        if let Some(message) = failure {
            return Err(StorageError::CorruptRecord {
                key: topic_id.to_string(),
                message,
            });
        }
        let raw = updated.ok_or_else(|| StorageError::TopicNotFound(topic_id.to_string()))?;
        let topic: TopicContext = decode_bincode(topic_id.as_bytes(), &raw)?;
        let before = before.ok_or_else(|| StorageError::CorruptRecord {
            key: topic_id.to_string(),
            message: "progress update produced no prior value".to_string(),
        })?;

        Ok(ProgressUpdate {
            before,
            after: topic.progress,
            is_active_ai_generation: topic.is_active_ai_generation,
        })
    }
}

fn encode_item_key(topic_id: &str, seq: u64) -> String {
    format!("{}:{:0width$}", topic_id, seq, width = ITEM_SEQ_PAD)
}

fn is_item_seq(tail: &[u8]) -> bool {
    tail.len() == ITEM_SEQ_PAD && tail.iter().all(u8::is_ascii_digit)
}

fn decode_bincode<T: DeserializeOwned>(key: &[u8], raw: &[u8]) -> Result<T, StorageError> {
    bincode::deserialize(raw).map_err(|e| StorageError::CorruptRecord {
        key: String::from_utf8_lossy(key).into_owned(),
        message: e.to_string(),
    })
}

fn decode_json<T: DeserializeOwned>(key: &[u8], raw: &[u8]) -> Result<T, StorageError> {
    serde_json::from_slice(raw).map_err(|e| StorageError::CorruptRecord {
        key: String::from_utf8_lossy(key).into_owned(),
        message: e.to_string(),
    })
}

pub(crate) fn to_storage_io(err: sled::Error) -> StorageError {
    StorageError::IoError(io::Error::new(io::ErrorKind::Other, err.to_string()))
}

fn to_storage_data<E: std::fmt::Display>(err: E) -> StorageError {
    StorageError::IoError(io::Error::new(io::ErrorKind::InvalidData, err.to_string()))
}
