//! Mode selection: document-grounded versus plain-text generation.

use crate::curriculum::TopicContext;
use crate::types::{Mode, RequestedMode};
use tracing::{debug, warn};

/// Material a single generation call is grounded on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroundingSource {
    Document {
        key: String,
        page_start: u32,
        page_end: u32,
    },
    Text(String),
}

impl GroundingSource {
    pub fn mode(&self) -> Mode {
        match self {
            GroundingSource::Document { .. } => Mode::Pdf,
            GroundingSource::Text(_) => Mode::Text,
        }
    }
}

/// Effective mode for a request.
///
/// Explicit modes are honored as-is. `Auto` picks `Pdf` only when the topic has a document
/// with a usable page range.
pub fn select_mode(requested: RequestedMode, topic: &TopicContext) -> Mode {
    let mode = match requested {
        RequestedMode::Text => Mode::Text,
        RequestedMode::Pdf => Mode::Pdf,
        RequestedMode::Auto => {
            if document_window(topic).is_some() {
                Mode::Pdf
            } else {
                Mode::Text
            }
        }
    };
    debug!(topic_id = %topic.id, ?requested, effective = %mode, "Mode selected");
    mode
}

/// Grounding for one call. A `Pdf` mode without a document or valid page range degrades to text.
pub fn resolve_source(mode: Mode, topic: &TopicContext) -> GroundingSource {
    if mode == Mode::Pdf {
        if let Some((key, page_start, page_end)) = document_window(topic) {
            return GroundingSource::Document {
                key: key.to_string(),
                page_start,
                page_end,
            };
        }
        warn!(
            topic_id = %topic.id,
            "Document mode requested without a document and valid page range; using text"
        );
    }
    GroundingSource::Text(grounding_text(topic))
}

/// Text grounding by priority: AI summary, then body, then a synthesized `Topic: {name}`.
pub fn grounding_text(topic: &TopicContext) -> String {
    [topic.ai_summary.as_deref(), topic.body.as_deref()]
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Topic: {}", topic.name))
}

fn document_window(topic: &TopicContext) -> Option<(&str, u32, u32)> {
    let doc = topic.document.as_ref()?;
    if doc.key.trim().is_empty() {
        return None;
    }
    let (start, end) = doc.page_range()?;
    Some((doc.key.as_str(), start, end))
}
