//! End-to-end pipeline runs over a sled store and a scripted collaborator.

use crate::integration::test_utils::{
    document, open_store, pipeline, seed_topic, Grounded, ScriptedCollaborator,
};
use quizforge::curriculum::{ProgressCounters, SubjectContext};
use quizforge::error::ApiError;
use quizforge::pipeline::GenerateRequest;
use quizforge::store::RecordStore;
use quizforge::types::{Mode, RequestedMode, Tier, TierCounts, VisualMode};
use quizforge::visual::scene::Geometry;
use quizforge::visual::VisualRequest;
use std::sync::Arc;
use tempfile::TempDir;

fn request(topic_id: &str, counts: TierCounts) -> GenerateRequest {
    GenerateRequest {
        topic_id: topic_id.to_string(),
        counts,
        mode: RequestedMode::Auto,
        language: Some("en".to_string()),
        comment: None,
        author_id: "author-1".to_string(),
    }
}

#[tokio::test]
async fn auto_mode_with_document_range_is_document_grounded() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let mut topic = seed_topic(&store, "t1", 0, 10);
    topic.document = Some(document("k1", Some(5), Some(12)));
    store.put_topic(&topic).unwrap();
    let collaborator = Arc::new(ScriptedCollaborator::new());
    let pipeline = pipeline(&store, collaborator.clone());

    let outcome = pipeline
        .run(request("t1", TierCounts::new(1, 0, 0)))
        .await
        .unwrap();

    assert_eq!(outcome.effective_mode, Mode::Pdf);
    assert_eq!(
        collaborator.calls.lock()[0].grounded,
        Grounded::Document {
            key: "k1".to_string(),
            page_start: 5,
            page_end: 12
        }
    );
}

#[tokio::test]
async fn auto_mode_without_document_grounds_on_body() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let mut topic = seed_topic(&store, "t1", 0, 10);
    topic.document = None;
    topic.ai_summary = None;
    topic.body = Some("Cells are...".to_string());
    store.put_topic(&topic).unwrap();
    let collaborator = Arc::new(ScriptedCollaborator::new());
    let pipeline = pipeline(&store, collaborator.clone());

    let outcome = pipeline
        .run(request("t1", TierCounts::new(0, 1, 0)))
        .await
        .unwrap();

    assert_eq!(outcome.effective_mode, Mode::Text);
    assert_eq!(
        collaborator.calls.lock()[0].grounded,
        Grounded::Text("Cells are...".to_string())
    );
}

#[tokio::test]
async fn explicit_pdf_without_range_degrades_per_call() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let mut topic = seed_topic(&store, "t1", 0, 10);
    topic.document = Some(document("k1", Some(9), Some(3)));
    topic.ai_summary = Some("Summary of cells".to_string());
    store.put_topic(&topic).unwrap();
    let collaborator = Arc::new(ScriptedCollaborator::new());
    let pipeline = pipeline(&store, collaborator.clone());

    let mut req = request("t1", TierCounts::new(1, 0, 0));
    req.mode = RequestedMode::Pdf;
    let outcome = pipeline.run(req).await.unwrap();

    assert_eq!(outcome.effective_mode, Mode::Pdf);
    assert_eq!(
        collaborator.calls.lock()[0].grounded,
        Grounded::Text("Summary of cells".to_string())
    );
}

#[tokio::test]
async fn skipped_tier_issues_no_call_and_results_keep_tier_order() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    seed_topic(&store, "t1", 0, 20);
    let collaborator = Arc::new(ScriptedCollaborator::new());
    let pipeline = pipeline(&store, collaborator.clone());

    let outcome = pipeline
        .run(request("t1", TierCounts::new(2, 0, 3)))
        .await
        .unwrap();

    let called: Vec<Tier> = collaborator
        .calls
        .lock()
        .iter()
        .map(|call| call.options.tier)
        .collect();
    assert_eq!(called.len(), 2);
    assert!(!called.contains(&Tier::Medium));

    let tiers: Vec<Option<Tier>> = outcome.saved.iter().map(|item| item.tier).collect();
    assert_eq!(
        tiers,
        vec![
            Some(Tier::Easy),
            Some(Tier::Easy),
            Some(Tier::Hard),
            Some(Tier::Hard),
            Some(Tier::Hard)
        ]
    );
}

#[tokio::test]
async fn counters_clamp_and_generation_deactivates() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    seed_topic(&store, "t1", 5, 1);
    let pipeline = pipeline(&store, Arc::new(ScriptedCollaborator::new()));

    let outcome = pipeline
        .run(request("t1", TierCounts::new(1, 1, 1)))
        .await
        .unwrap();

    assert_eq!(outcome.saved.len(), 3);
    assert!(outcome.stats_updated);
    let topic = store.get_topic("t1").unwrap().unwrap();
    assert_eq!(topic.progress, ProgressCounters::new(8, 0));
    assert!(!topic.is_active_ai_generation);
}

#[tokio::test]
async fn remaining_quota_keeps_generation_active() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    seed_topic(&store, "t1", 0, 10);
    let pipeline = pipeline(&store, Arc::new(ScriptedCollaborator::new()));

    pipeline
        .run(request("t1", TierCounts::new(2, 0, 0)))
        .await
        .unwrap();

    let topic = store.get_topic("t1").unwrap().unwrap();
    assert_eq!(topic.progress, ProgressCounters::new(2, 8));
    assert!(topic.is_active_ai_generation);
}

#[tokio::test]
async fn failing_tier_leaves_no_trace() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    seed_topic(&store, "t1", 5, 5);
    let collaborator = Arc::new(ScriptedCollaborator::failing_on(&[Tier::Hard]));
    let pipeline = pipeline(&store, collaborator);

    let err = pipeline
        .run(request("t1", TierCounts::new(2, 2, 2)))
        .await
        .unwrap_err();

    match err {
        ApiError::TierFailed { tier, .. } => assert_eq!(tier, Tier::Hard),
        other => panic!("unexpected error: {}", other),
    }
    assert!(store.list_items("t1", 100).unwrap().is_empty());
    let topic = store.get_topic("t1").unwrap().unwrap();
    assert_eq!(topic.progress, ProgressCounters::new(5, 5));
    assert!(topic.is_active_ai_generation);
}

#[tokio::test]
async fn later_runs_receive_earlier_questions_as_hints() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    seed_topic(&store, "t1", 0, 50);
    let collaborator = Arc::new(ScriptedCollaborator::new());
    let pipeline = pipeline(&store, collaborator.clone());

    let first = pipeline
        .run(request("t1", TierCounts::new(2, 0, 0)))
        .await
        .unwrap();
    pipeline
        .run(request("t1", TierCounts::new(0, 0, 1)))
        .await
        .unwrap();

    let calls = collaborator.calls.lock();
    assert!(calls[0].options.dedup_hints.is_empty());
    let hints = &calls[1].options.dedup_hints;
    assert_eq!(hints.len(), 2);
    assert_eq!(hints[0], first.saved[1].question);
    assert_eq!(hints[1], first.saved[0].question);
}

#[tokio::test]
async fn persisted_crib_combines_subject_then_topic() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let mut subject = SubjectContext::new("s1", "Biology");
    subject.crib = Some("Grade-appropriate vocabulary".to_string());
    store.put_subject(&subject).unwrap();
    let mut topic = seed_topic(&store, "t1", 0, 5);
    topic.subject_id = Some("s1".to_string());
    topic.crib = Some("Stress organelles".to_string());
    store.put_topic(&topic).unwrap();
    let collaborator = Arc::new(ScriptedCollaborator::new());
    let pipeline = pipeline(&store, collaborator.clone());

    let outcome = pipeline
        .run(request("t1", TierCounts::new(1, 0, 0)))
        .await
        .unwrap();

    let expected = "Subject guidance: Grade-appropriate vocabulary\nTopic guidance: Stress organelles";
    assert_eq!(outcome.saved[0].crib.as_deref(), Some(expected));
    assert_eq!(
        collaborator.calls.lock()[0].options.context.crib.as_deref(),
        Some(expected)
    );
    assert_eq!(outcome.saved[0].subject_id.as_deref(), Some("s1"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_runs_on_one_topic_lose_no_updates() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    seed_topic(&store, "t1", 0, 25);
    let pipeline = Arc::new(pipeline(&store, Arc::new(ScriptedCollaborator::new())));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                pipeline
                    .run(request("t1", TierCounts::new(1, 2, 2)))
                    .await
            })
        })
        .collect();
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.stats_updated);
    }

    let topic = store.get_topic("t1").unwrap().unwrap();
    assert_eq!(topic.progress, ProgressCounters::new(30, 0));
    assert!(!topic.is_active_ai_generation);
    assert_eq!(store.list_items("t1", 100).unwrap().len(), 30);
}

#[tokio::test]
async fn visual_flow_fills_defaults_for_sparse_scene() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let collaborator = Arc::new(ScriptedCollaborator::with_scene(serde_json::json!({
        "objects": [],
        "animations": [{"target": "obj_0", "type": "wobble"}]
    })));
    let pipeline = pipeline(&store, collaborator);

    let scene = pipeline
        .generate_visual(&VisualRequest {
            mode: VisualMode::ThreeD,
            question: "How does a cell divide?".to_string(),
            subject_name: Some("Biology".to_string()),
            topic_name: None,
            language: Some("en".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(scene.mode, VisualMode::ThreeD);
    assert_eq!(scene.objects.len(), 1);
    assert_eq!(scene.objects[0].geometry, Geometry::Sphere);
    assert!(scene.animations.is_empty());
    assert!(scene.show_grid);
    assert_eq!(scene.generation.model, "scripted-model");
}
