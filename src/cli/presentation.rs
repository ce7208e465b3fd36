//! CLI presentation: text and json formatters per command.

use crate::curriculum::TopicContext;
use crate::error::ApiError;
use crate::item::PersistedItem;
use crate::pipeline::PipelineOutcome;
use crate::types::{Mode, Tier};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Everything `topic` shows about one topic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicView {
    pub topic: TopicContext,
    pub subject_label: String,
    /// What `auto` resolves to for this topic.
    pub auto_mode: Mode,
    pub crib: Option<String>,
    pub saved_items: usize,
}

fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

pub fn format_topic_text(view: &TopicView) -> String {
    let topic = &view.topic;
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("Topic {}", topic.id))
    ));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.add_row(vec!["Name".to_string(), topic.name.clone()]);
    table.add_row(vec!["Subject".to_string(), view.subject_label.clone()]);
    table.add_row(vec![
        "Grade".to_string(),
        topic
            .grade
            .map(|g| g.to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec!["Total".to_string(), topic.progress.total.to_string()]);
    table.add_row(vec![
        "Remaining".to_string(),
        topic.progress.remaining.to_string(),
    ]);
    table.add_row(vec![
        "Auto generation".to_string(),
        if topic.is_active_ai_generation {
            "active".to_string()
        } else {
            "inactive".to_string()
        },
    ]);
    let document = match &topic.document {
        Some(doc) => match doc.page_range() {
            Some((start, end)) => format!("{} (pages {}-{})", doc.key, start, end),
            None => format!("{} (no valid page range)", doc.key),
        },
        None => "-".to_string(),
    };
    table.add_row(vec!["Document".to_string(), document]);
    table.add_row(vec!["Auto mode".to_string(), view.auto_mode.to_string()]);
    table.add_row(vec!["Saved items".to_string(), view.saved_items.to_string()]);
    out.push_str(&format!("{}\n", table));

    out.push_str(&format!("\n{}\n", format_section_heading("Crib")));
    match &view.crib {
        Some(crib) => out.push_str(&format!("{}\n", crib)),
        None => out.push_str("(none)\n"),
    }
    out
}

pub fn format_topic_json(view: &TopicView) -> Result<String, ApiError> {
    to_json(view)
}

pub fn format_items_text(items: &[PersistedItem]) -> String {
    if items.is_empty() {
        return "No items saved for this topic.\n".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Tier", "Question", "Answer", "Created"]);
    for item in items {
        table.add_row(vec![
            item.id.chars().take(8).collect::<String>(),
            item.tier.map(Tier::as_str).unwrap_or("-").to_string(),
            item.question.clone(),
            item.correct_answer.clone(),
            item.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    format!("{}\n", table)
}

pub fn format_items_json(items: &[PersistedItem]) -> Result<String, ApiError> {
    to_json(items)
}

pub fn format_run_summary(topic_id: &str, outcome: &PipelineOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("Generated for {}", topic_id))
    ));
    out.push_str(&format!("  Mode: {}\n", outcome.effective_mode));
    out.push_str(&format!("  Saved: {}\n", outcome.saved.len().green()));
    for tier in Tier::ALL {
        let count = outcome
            .saved
            .iter()
            .filter(|item| item.tier == Some(tier))
            .count();
        if count > 0 {
            out.push_str(&format!("    {}: {}\n", tier, count));
        }
    }
    if outcome.stats_updated {
        out.push_str("  Topic progress: updated\n");
    } else if !outcome.saved.is_empty() {
        out.push_str(&format!(
            "  Topic progress: {}\n",
            "not updated (see logs)".yellow()
        ));
    }
    out
}
