//! Sled record store behavior across reopen, topic boundaries, and concurrent writers.

use crate::integration::test_utils::{open_store, seed_topic};
use chrono::Utc;
use quizforge::curriculum::ProgressCounters;
use quizforge::error::StorageError;
use quizforge::item::{PersistedItem, Provenance};
use quizforge::store::{RecordStore, SledRecordStore};
use quizforge::types::Tier;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn item(topic_id: &str, question: &str) -> PersistedItem {
    PersistedItem {
        id: format!("{}-{}", topic_id, question),
        question: question.to_string(),
        options: vec!["a".to_string(), "b".to_string()],
        correct_answer: "a".to_string(),
        explanation: None,
        tier: Some(Tier::Medium),
        author_id: "author-1".to_string(),
        topic_id: Some(topic_id.to_string()),
        subject_id: None,
        grade: None,
        language: "en".to_string(),
        crib: None,
        provenance: Provenance {
            model: "m".to_string(),
            action: "generate_questions".to_string(),
        },
        is_published: false,
        created_at: Utc::now(),
    }
}

#[test]
fn topic_prefixes_do_not_bleed_into_each_other() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store
        .insert_items(&[item("t1", "one"), item("t10", "ten"), item("t1", "two")])
        .unwrap();

    let t1: Vec<String> = store
        .list_items("t1", 10)
        .unwrap()
        .into_iter()
        .map(|i| i.question)
        .collect();
    assert_eq!(t1, vec!["two".to_string(), "one".to_string()]);
    assert_eq!(store.recent_question_texts("t10", 10).unwrap(), vec!["ten".to_string()]);
    assert!(store.list_items("t", 10).unwrap().is_empty());
}

#[test]
fn listing_is_newest_first_across_batches() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.insert_items(&[item("t1", "first")]).unwrap();
    store
        .insert_items(&[item("t1", "second"), item("t1", "third")])
        .unwrap();

    let texts = store.recent_question_texts("t1", 2).unwrap();
    assert_eq!(texts, vec!["third".to_string(), "second".to_string()]);
}

#[test]
fn records_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = open_store(&temp_dir);
        seed_topic(&store, "t1", 3, 7);
        store.insert_items(&[item("t1", "kept")]).unwrap();
        store.flush().unwrap();
    }

    let store = SledRecordStore::new(temp_dir.path().join("store")).unwrap();
    let topic = store.get_topic("t1").unwrap().unwrap();
    assert_eq!(topic.progress, ProgressCounters::new(3, 7));
    assert_eq!(store.list_items("t1", 10).unwrap()[0].question, "kept");
}

#[test]
fn progress_on_missing_topic_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    assert!(matches!(
        store.apply_progress("ghost", 2),
        Err(StorageError::TopicNotFound(id)) if id == "ghost"
    ));
    assert!(store.get_topic("ghost").unwrap().is_none());
}

#[test]
fn concurrent_progress_writers_sum_exactly() {
    let temp_dir = TempDir::new().unwrap();
    let store: Arc<SledRecordStore> = open_store(&temp_dir);
    seed_topic(&store, "t1", 0, 1_000);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    store.apply_progress("t1", 1).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let topic = store.get_topic("t1").unwrap().unwrap();
    assert_eq!(topic.progress, ProgressCounters::new(200, 800));
    assert!(topic.is_active_ai_generation);
}

#[test]
fn progress_update_reports_before_and_after() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    seed_topic(&store, "t1", 5, 1);

    let update = store.apply_progress("t1", 3).unwrap();
    assert_eq!(update.before, ProgressCounters::new(5, 1));
    assert_eq!(update.after, ProgressCounters::new(8, 0));
    assert!(!update.is_active_ai_generation);
}
