//! CLI route: builds the run context and dispatches each command.

use crate::cli::parse::{Commands, ConfigCommands};
use crate::cli::presentation::{
    format_items_json, format_items_text, format_run_summary, format_topic_json,
    format_topic_text, TopicView,
};
use crate::config::{AppConfig, ConfigLoader};
use crate::curriculum::{SubjectContext, TopicContext};
use crate::error::{ApiError, StorageError};
use crate::generation::{GenerationCollaborator, GenerationContext, ProviderCollaborator};
use crate::pipeline::{ContentPipeline, GenerateRequest};
use crate::provider::ProviderFactory;
use crate::store::{
    DirectoryDocumentStore, DocumentStore, RecordStore, SledDocumentStore, SledRecordStore,
};
use crate::types::{RequestedMode, TierCounts, VisualMode};
use crate::visual::VisualRequest;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Import file layout.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub subjects: Vec<SubjectContext>,
    #[serde(default)]
    pub topics: Vec<TopicContext>,
    #[serde(default)]
    pub documents: Vec<SeedDocument>,
}

/// A source document given as extracted text, pages separated by form feed.
#[derive(Debug, Deserialize)]
pub struct SeedDocument {
    pub key: String,
    pub text: String,
}

/// Shared state for one CLI invocation.
pub struct RunContext {
    config: AppConfig,
    store: Arc<SledRecordStore>,
    documents: Arc<dyn DocumentStore>,
    seed_documents: SledDocumentStore,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Self::from_config(config, &workspace_root)
    }

    pub fn from_config(config: AppConfig, workspace_root: &Path) -> Result<Self, ApiError> {
        let store_path = config.storage.resolve_store_path(workspace_root);
        std::fs::create_dir_all(&store_path).map_err(StorageError::IoError)?;
        let store = Arc::new(SledRecordStore::new(&store_path)?);
        let seed_documents = SledDocumentStore::new(store.db())?;

        let documents: Arc<dyn DocumentStore> =
            match config.storage.resolve_documents_dir(workspace_root) {
                Some(dir) => Arc::new(DirectoryDocumentStore::new(dir)),
                None => Arc::new(seed_documents.clone()),
            };
        info!(store_path = %store_path.display(), "Record store opened");

        Ok(Self {
            config,
            store,
            documents,
            seed_documents,
        })
    }

    /// Pipeline backed by the configured model provider.
    pub fn pipeline(&self) -> Result<ContentPipeline, ApiError> {
        self.config.ensure_valid()?;
        let provider = self.config.provider.to_model_provider()?;
        let client = ProviderFactory::create_client(&provider)?;
        let collaborator: Arc<dyn GenerationCollaborator> = Arc::new(ProviderCollaborator::new(
            Arc::from(client),
            self.documents.clone(),
            self.config.provider.completion_options(),
        ));
        Ok(self.pipeline_with(collaborator))
    }

    /// Pipeline over this context's store with any collaborator.
    pub fn pipeline_with(&self, collaborator: Arc<dyn GenerationCollaborator>) -> ContentPipeline {
        ContentPipeline::new(
            self.store.clone(),
            collaborator,
            self.config.generation.clone(),
        )
    }

    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Import { file } => self.import(file),
            Commands::Topic { topic_id, format } => self.show_topic(topic_id, format),
            Commands::Items {
                topic,
                limit,
                format,
            } => {
                let items = self.store.list_items(topic, *limit)?;
                match format.as_str() {
                    "json" => format_items_json(&items),
                    _ => Ok(format_items_text(&items)),
                }
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show => self.config.to_toml_string(),
                ConfigCommands::Validate => {
                    self.config.ensure_valid()?;
                    Ok("Configuration is valid.".to_string())
                }
            },
            Commands::Generate {
                topic,
                easy,
                medium,
                hard,
                mode,
                language,
                comment,
                author,
            } => {
                let mode: RequestedMode = mode.parse().map_err(ApiError::InvalidRequest)?;
                let request = GenerateRequest {
                    topic_id: topic.clone(),
                    counts: TierCounts::new(*easy, *medium, *hard),
                    mode,
                    language: language.clone(),
                    comment: comment.clone(),
                    author_id: author.clone(),
                };
                self.generate(&self.pipeline()?, request).await
            }
            Commands::Visual {
                mode,
                question,
                subject,
                topic,
                language,
            } => {
                let mode: VisualMode = mode.parse().map_err(ApiError::InvalidRequest)?;
                let request = VisualRequest {
                    mode,
                    question: question.clone(),
                    subject_name: subject.clone(),
                    topic_name: topic.clone(),
                    language: language.clone(),
                };
                let scene = self.pipeline()?.generate_visual(&request).await?;
                serde_json::to_string_pretty(&scene)
                    .map_err(|e| ApiError::Serialization(e.to_string()))
            }
        }
    }

    pub async fn generate(
        &self,
        pipeline: &ContentPipeline,
        request: GenerateRequest,
    ) -> Result<String, ApiError> {
        if request.counts.total() == 0 {
            return Err(ApiError::InvalidRequest(
                "request at least one question with --easy, --medium, or --hard".to_string(),
            ));
        }
        let topic_id = request.topic_id.clone();
        let outcome = pipeline.run(request).await?;
        self.store.flush()?;
        Ok(format_run_summary(&topic_id, &outcome))
    }

    pub fn import(&self, file: &Path) -> Result<String, ApiError> {
        let raw = std::fs::read_to_string(file).map_err(StorageError::IoError)?;
        let seed: Seed = serde_json::from_str(&raw).map_err(|e| {
            ApiError::InvalidRequest(format!("Invalid seed file {}: {}", file.display(), e))
        })?;

        for subject in &seed.subjects {
            self.store.put_subject(subject)?;
        }
        for topic in &seed.topics {
            self.store.put_topic(topic)?;
        }
        for document in &seed.documents {
            self.seed_documents
                .put(&document.key, document.text.as_bytes())?;
        }
        self.store.flush()?;

        info!(
            subjects = seed.subjects.len(),
            topics = seed.topics.len(),
            documents = seed.documents.len(),
            "Seed imported"
        );
        Ok(format!(
            "Imported {} subjects, {} topics, {} documents.",
            seed.subjects.len(),
            seed.topics.len(),
            seed.documents.len()
        ))
    }

    pub fn show_topic(&self, topic_id: &str, format: &str) -> Result<String, ApiError> {
        let topic = self
            .store
            .get_topic(topic_id)?
            .ok_or_else(|| StorageError::TopicNotFound(topic_id.to_string()))?;
        let subject = match topic.subject_id.as_deref() {
            Some(id) => self.store.get_subject(id)?,
            None => None,
        };
        let view = TopicView {
            subject_label: subject
                .as_ref()
                .map(SubjectContext::display_label)
                .unwrap_or_else(|| GenerationContext::FALLBACK_LABEL.to_string()),
            auto_mode: crate::mode::select_mode(RequestedMode::Auto, &topic),
            crib: crate::crib::compose_crib(subject.as_ref(), Some(&topic)),
            saved_items: self.store.count_items(topic_id)?,
            topic,
        };
        match format {
            "json" => format_topic_json(&view),
            _ => Ok(format_topic_text(&view)),
        }
    }
}
