//! The provider-backed collaborator against a scripted chat provider.

use crate::integration::test_utils::{
    document, open_store, pipeline, seed_topic, ScriptedProvider,
};
use quizforge::error::ApiError;
use quizforge::generation::{
    GenerationCollaborator, GenerationContext, GenerationOptions, ProviderCollaborator,
};
use quizforge::pipeline::GenerateRequest;
use quizforge::provider::CompletionOptions;
use quizforge::store::{RecordStore, SledDocumentStore, SledRecordStore};
use quizforge::types::{Mode, RequestedMode, Tier, TierCounts, VisualMode};
use quizforge::visual::scene::{CameraKind, Geometry};
use quizforge::visual::VisualRequest;
use std::sync::Arc;
use tempfile::TempDir;

const FENCED_REPLY: &str = "Here you go:\n```json\n{\"questions\": [\
{\"question\": \"What organelle makes ATP?\", \"options\": [\"Mitochondria\", \"Ribosome\"], \"correctAnswer\": \"Mitochondria\", \"complexity\": \"easy\"},\
{\"question\": \"   \", \"options\": [\"a\", \"b\"], \"correctAnswer\": \"a\"},\
{\"question\": \"Which structure holds DNA?\", \"options\": [\"Nucleus\", \"Vacuole\"], \"correctAnswer\": 0}\
]}\n```\nGood luck!";

fn collaborator(
    store: &SledRecordStore,
    provider: Arc<ScriptedProvider>,
) -> ProviderCollaborator {
    let documents = SledDocumentStore::new(store.db()).unwrap();
    documents
        .put("k1", "page one\u{000C}cell walls\u{000C}mitochondria\u{000C}page four".as_bytes())
        .unwrap();
    ProviderCollaborator::new(provider, Arc::new(documents), CompletionOptions::default())
}

fn options(count: u32) -> GenerationOptions {
    GenerationOptions {
        tier: Tier::Medium,
        count,
        language: "en".to_string(),
        topic_name: "Cells".to_string(),
        context: GenerationContext::fallback(None),
        comment: None,
        dedup_hints: vec!["Old question?".to_string()],
    }
}

#[tokio::test]
async fn document_generation_sends_only_the_page_window() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let provider = Arc::new(ScriptedProvider::new(&[FENCED_REPLY]));
    let collaborator = collaborator(&store, provider.clone());

    let items = collaborator
        .generate_from_document("k1", 2, 3, &options(5))
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].correct_answer, "Mitochondria");
    assert_eq!(items[1].correct_answer, "Nucleus");

    let received = provider.received.lock();
    let user = &received[0][1].content;
    assert!(user.contains("pages 2-3 of document \"k1\""));
    assert!(user.contains("cell walls"));
    assert!(user.contains("mitochondria"));
    assert!(!user.contains("page one"));
    assert!(!user.contains("page four"));
    assert!(user.contains("- Old question?"));
}

#[tokio::test]
async fn reply_is_truncated_to_requested_count() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let provider = Arc::new(ScriptedProvider::new(&[FENCED_REPLY]));
    let collaborator = collaborator(&store, provider);

    let items = collaborator
        .generate_from_text("Cells are the basic unit of life.", &options(1))
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].question, "What organelle makes ATP?");
}

#[tokio::test]
async fn missing_document_fails_the_call() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let provider = Arc::new(ScriptedProvider::new(&[FENCED_REPLY]));
    let collaborator = collaborator(&store, provider.clone());

    let result = collaborator
        .generate_from_document("absent", 1, 2, &options(1))
        .await;
    assert!(result.is_err());
    assert!(provider.received.lock().is_empty());
}

#[tokio::test]
async fn prose_without_json_is_malformed() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let provider = Arc::new(ScriptedProvider::new(&["I cannot help with that."]));
    let collaborator = collaborator(&store, provider);

    let result = collaborator.generate_from_text("text", &options(1)).await;
    assert!(matches!(result, Err(ApiError::MalformedResponse(_))));
}

#[tokio::test]
async fn full_run_through_the_provider_persists_parsed_items() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let mut topic = seed_topic(&store, "t1", 0, 4);
    topic.document = Some(document("k1", Some(2), Some(3)));
    store.put_topic(&topic).unwrap();
    let provider = Arc::new(ScriptedProvider::new(&[FENCED_REPLY]));
    let pipeline = pipeline(&store, Arc::new(collaborator(&store, provider)));

    let outcome = pipeline
        .run(GenerateRequest {
            topic_id: "t1".to_string(),
            counts: TierCounts::new(0, 0, 2),
            mode: RequestedMode::Auto,
            language: None,
            comment: Some("focus on energy".to_string()),
            author_id: "author-1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(outcome.effective_mode, Mode::Pdf);
    assert_eq!(outcome.saved.len(), 2);
    assert!(outcome.saved.iter().all(|item| item.tier == Some(Tier::Hard)));
    assert!(outcome.saved.iter().all(|item| item.provenance.model == "scripted-chat"));
    assert!(outcome.saved.iter().all(|item| item.language == "en"));
    assert!(outcome.saved.iter().all(|item| !item.is_published));

    let stored = store.get_topic("t1").unwrap().unwrap();
    assert_eq!((stored.progress.total, stored.progress.remaining), (2, 2));
}

#[tokio::test]
async fn visual_reply_is_sanitized() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let reply = "```json\n{\"title\": \"Cell\", \"objects\": [\
{\"geometry\": \"hexagon\", \"position\": [1, 2, 3], \"opacity\": 4}\
], \"camera\": {\"type\": \"orthographic\"}}\n```";
    let provider = Arc::new(ScriptedProvider::new(&[reply]));
    let pipeline = pipeline(&store, Arc::new(collaborator(&store, provider)));

    let scene = pipeline
        .generate_visual(&VisualRequest {
            mode: VisualMode::TwoD,
            question: "Draw a plant cell".to_string(),
            subject_name: None,
            topic_name: Some("Cells".to_string()),
            language: None,
        })
        .await
        .unwrap();

    assert_eq!(scene.title, "Cell");
    assert_eq!(scene.objects.len(), 1);
    assert_eq!(scene.objects[0].geometry, Geometry::Box);
    assert_eq!(scene.objects[0].position, [1.0, 2.0, 0.0]);
    assert_eq!(scene.objects[0].opacity, 1.0);
    assert_eq!(scene.camera.kind, CameraKind::Orthographic);
    assert!(!scene.lights.is_empty());
    assert_eq!(scene.generation.model, "scripted-chat");
}
