//! Dedup hints: recently generated question texts passed to the model as "do not repeat".
//!
//! Hints are advisory. Nothing here rejects duplicates after generation.

use crate::store::RecordStore;
use tracing::warn;

/// Upper bound on hints per request.
pub const MAX_DEDUP_HINTS: usize = 200;

/// Up to `limit` (capped at [`MAX_DEDUP_HINTS`]) non-blank question texts for a topic, newest
/// first. A failed lookup yields an empty list.
pub fn fetch_dedup_hints(store: &dyn RecordStore, topic_id: &str, limit: usize) -> Vec<String> {
    let limit = limit.min(MAX_DEDUP_HINTS);
    match store.recent_question_texts(topic_id, limit) {
        Ok(texts) => texts
            .into_iter()
            .filter(|text| !text.trim().is_empty())
            .collect(),
        Err(err) => {
            warn!(topic_id, error = %err, "Dedup hint lookup failed; continuing without hints");
            Vec::new()
        }
    }
}
