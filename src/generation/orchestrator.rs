//! Per-tier fan-out: one collaborator call per requested tier, joined in fixed tier order.
//! The join is all-or-nothing; one failed tier discards every sibling's output.

use crate::curriculum::TopicContext;
use crate::error::ApiError;
use crate::generation::collaborator::{
    GenerationCollaborator, GenerationContext, GenerationOptions,
};
use crate::item::GeneratedItem;
use crate::mode::{resolve_source, GroundingSource};
use crate::types::{Mode, Tier, TierCounts};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Everything a generation call needs besides the tier and count.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: TopicContext,
    pub context: GenerationContext,
    pub language: String,
    pub mode: Mode,
    pub comment: Option<String>,
    pub dedup_hints: Vec<String>,
}

impl GenerationRequest {
    fn options(&self, tier: Tier, count: u32) -> GenerationOptions {
        GenerationOptions {
            tier,
            count,
            language: self.language.clone(),
            topic_name: self.topic.name.clone(),
            context: self.context.clone(),
            comment: self.comment.clone(),
            dedup_hints: self.dedup_hints.clone(),
        }
    }
}

/// Generates `count` questions of one tier. Every returned item is tagged with `tier`,
/// whatever the model reported.
pub async fn generate_tier(
    collaborator: &dyn GenerationCollaborator,
    request: &GenerationRequest,
    tier: Tier,
    count: u32,
) -> Result<Vec<GeneratedItem>, ApiError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let options = request.options(tier, count);
    let mut items = match resolve_source(request.mode, &request.topic) {
        GroundingSource::Document {
            key,
            page_start,
            page_end,
        } => {
            collaborator
                .generate_from_document(&key, page_start, page_end, &options)
                .await?
        }
        GroundingSource::Text(text) => collaborator.generate_from_text(&text, &options).await?,
    };

    for item in &mut items {
        item.tier = Some(tier);
    }
    Ok(items)
}

/// Runs one concurrent call per tier with a positive count and concatenates the results as
/// `[easy, medium, hard]`, independent of completion order.
///
/// The first failing tier fails the whole call; the remaining in-flight calls are dropped and
/// nothing is returned.
pub async fn generate_multi_tier(
    collaborator: &dyn GenerationCollaborator,
    request: &GenerationRequest,
    counts: TierCounts,
) -> Result<Vec<GeneratedItem>, ApiError> {
    let mut pending = FuturesUnordered::new();
    for (tier, count) in counts.active_tiers() {
        info!(
            topic_id = %request.topic.id,
            tier = %tier,
            count,
            mode = %request.mode,
            "Launching tier generation"
        );
        pending.push(async move {
            let outcome = generate_tier(collaborator, request, tier, count).await;
            (tier, outcome)
        });
    }

    let mut by_tier: BTreeMap<Tier, Vec<GeneratedItem>> = BTreeMap::new();
    while let Some((tier, outcome)) = pending.next().await {
        match outcome {
            Ok(items) => {
                by_tier.insert(tier, items);
            }
            Err(err) => {
                warn!(
                    topic_id = %request.topic.id,
                    tier = %tier,
                    error = %err,
                    "Tier generation failed; discarding all tiers"
                );
                return Err(ApiError::TierFailed {
                    tier,
                    source: Box::new(err),
                });
            }
        }
    }

    Ok(by_tier.into_values().flatten().collect())
}
