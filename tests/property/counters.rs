//! Property-based tests for progress counters and crib composition

use proptest::prelude::*;
use quizforge::crib::{join_cribs, SUBJECT_PREFIX, TOPIC_PREFIX};
use quizforge::curriculum::{ProgressCounters, TopicContext};

/// Total always grows by exactly the saved count; remaining never underflows.
#[test]
fn test_after_saving_clamps_remaining() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(0u64..1_000_000, 0u64..1_000_000, 0u64..1_000_000),
            |(total, remaining, saved)| {
                let after = ProgressCounters::new(total, remaining).after_saving(saved);

                prop_assert_eq!(after.total, total + saved);
                prop_assert_eq!(after.remaining, remaining.saturating_sub(saved));
                prop_assert!(after.remaining <= remaining);
                Ok(())
            },
        )
        .unwrap();
}

/// Applying batches one at a time matches applying their sum at once.
#[test]
fn test_after_saving_is_additive() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(0u64..10_000, prop::collection::vec(0u64..100, 0..20)),
            |(remaining, batches)| {
                let start = ProgressCounters::new(0, remaining);
                let stepped = batches
                    .iter()
                    .fold(start, |counters, saved| counters.after_saving(*saved));
                let at_once = start.after_saving(batches.iter().sum());

                prop_assert_eq!(stepped, at_once);
                Ok(())
            },
        )
        .unwrap();
}

/// An active topic stays active exactly while quota remains.
#[test]
fn test_record_saved_clears_flag_only_when_exhausted() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(0u64..1_000, 0u64..1_000, any::<bool>()),
            |(remaining, saved, active)| {
                let mut topic = TopicContext::new("t1", "Cells");
                topic.progress = ProgressCounters::new(0, remaining);
                topic.is_active_ai_generation = active;

                topic.record_saved(saved);

                if topic.progress.remaining == 0 {
                    prop_assert!(!topic.is_active_ai_generation);
                } else {
                    prop_assert_eq!(topic.is_active_ai_generation, active);
                }
                Ok(())
            },
        )
        .unwrap();
}

/// The subject part, when present, always precedes the topic part.
#[test]
fn test_crib_subject_part_comes_first() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                prop::option::of("[a-z ]{0,20}"),
                prop::option::of("[a-z ]{0,20}"),
            ),
            |(subject, topic)| {
                let combined = join_cribs(subject.as_deref(), topic.as_deref());
                let has_subject = subject.as_deref().map_or(false, |s| !s.trim().is_empty());
                let has_topic = topic.as_deref().map_or(false, |t| !t.trim().is_empty());

                match combined {
                    None => {
                        prop_assert!(!has_subject && !has_topic);
                    }
                    Some(text) => {
                        prop_assert_eq!(text.starts_with(SUBJECT_PREFIX), has_subject);
                        prop_assert_eq!(text.contains(TOPIC_PREFIX), has_topic);
                        if has_subject && has_topic {
                            let parts: Vec<&str> = text.split('\n').collect();
                            prop_assert_eq!(parts.len(), 2);
                            prop_assert!(parts[1].starts_with(TOPIC_PREFIX));
                        }
                    }
                }
                Ok(())
            },
        )
        .unwrap();
}
