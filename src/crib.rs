//! Crib assembly: layers subject-level guidance ahead of topic-level guidance.

use crate::curriculum::{SubjectContext, TopicContext};

pub const SUBJECT_PREFIX: &str = "Subject guidance: ";
pub const TOPIC_PREFIX: &str = "Topic guidance: ";

/// Combined crib for a subject/topic pair, or `None` when neither carries one.
pub fn compose_crib(
    subject: Option<&SubjectContext>,
    topic: Option<&TopicContext>,
) -> Option<String> {
    join_cribs(
        subject.and_then(|s| s.crib.as_deref()),
        topic.and_then(|t| t.crib.as_deref()),
    )
}

/// Joins raw crib strings. Subject part always comes first; blank parts are dropped.
pub fn join_cribs(subject_crib: Option<&str>, topic_crib: Option<&str>) -> Option<String> {
    let parts: Vec<String> = [(SUBJECT_PREFIX, subject_crib), (TOPIC_PREFIX, topic_crib)]
        .into_iter()
        .filter_map(|(prefix, crib)| {
            let crib = crib?.trim();
            (!crib.is_empty()).then(|| format!("{prefix}{crib}"))
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}
