//! Question prompt contract: what the model is asked for and how its answer is read back.

use crate::error::ApiError;
use crate::generation::collaborator::GenerationOptions;
use crate::item::GeneratedItem;
use crate::provider::ChatMessage;
use crate::types::Tier;
use serde_json::Value;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are an experienced teacher writing multiple-choice questions \
for school students. Every question has exactly one correct option. Reply with a single JSON \
object and nothing else.";

const RESPONSE_SHAPE: &str = r#"{"questions":[{"question":"...","options":["...","...","...","..."],"correctAnswer":"...","explanation":"..."}]}"#;

/// Material shown to the model.
#[derive(Debug, Clone, Copy)]
pub enum Grounding<'a> {
    Text(&'a str),
    Document {
        key: &'a str,
        page_start: u32,
        page_end: u32,
        text: &'a str,
    },
}

pub fn question_messages(
    options: &GenerationOptions,
    grounding: Grounding<'_>,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(question_prompt(options, grounding)),
    ]
}

fn question_prompt(options: &GenerationOptions, grounding: Grounding<'_>) -> String {
    let mut sections = vec![format!(
        "Write {} {} multiple-choice questions in language \"{}\".\nSubject: {}\nTopic: {}",
        options.count,
        options.tier,
        options.language,
        options.context.subject_label,
        options.topic_name,
    )];

    sections.push(tier_guidance(options.tier).to_string());

    if let Some(crib) = &options.context.crib {
        sections.push(format!("Follow this guidance:\n{}", crib));
    }
    if let Some(comment) = options.comment.as_deref().filter(|c| !c.trim().is_empty()) {
        sections.push(format!("Teacher's note: {}", comment.trim()));
    }
    if !options.dedup_hints.is_empty() {
        let listed: Vec<String> = options
            .dedup_hints
            .iter()
            .map(|q| format!("- {}", q))
            .collect();
        sections.push(format!(
            "These questions already exist; do not repeat or paraphrase them:\n{}",
            listed.join("\n")
        ));
    }

    match grounding {
        Grounding::Text(text) => {
            sections.push(format!("Base the questions on this material:\n{}", text));
        }
        Grounding::Document {
            key,
            page_start,
            page_end,
            text,
        } => {
            sections.push(format!(
                "Base the questions only on pages {}-{} of document \"{}\":\n{}",
                page_start, page_end, key, text
            ));
        }
    }

    sections.push(format!("Respond with JSON shaped like:\n{}", RESPONSE_SHAPE));
    sections.join("\n\n")
}

fn tier_guidance(tier: Tier) -> &'static str {
    match tier {
        Tier::Easy => {
            "Difficulty: recall of facts and definitions stated directly in the material."
        }
        Tier::Medium => "Difficulty: applying or connecting two ideas from the material.",
        Tier::Hard => "Difficulty: multi-step reasoning, analysis, or unfamiliar application.",
    }
}

/// Reads questions out of a model reply.
///
/// Malformed entries are dropped; the result is truncated to `count`. A reply without a
/// readable JSON payload, or without any usable question, is an error.
pub fn parse_questions(raw: &str, count: u32) -> Result<Vec<GeneratedItem>, ApiError> {
    let value = parse_json_payload(raw)?;
    let entries = match &value {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(map) => map
            .get("questions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                ApiError::MalformedResponse("reply has no \"questions\" array".to_string())
            })?,
        _ => {
            return Err(ApiError::MalformedResponse(
                "reply is neither an object nor an array".to_string(),
            ))
        }
    };

    let total = entries.len();
    let items: Vec<GeneratedItem> = entries
        .iter()
        .filter_map(parse_question_entry)
        .take(count as usize)
        .collect();

    if items.is_empty() && count > 0 {
        return Err(ApiError::MalformedResponse(format!(
            "none of {} returned questions were usable",
            total
        )));
    }
    debug!(returned = total, usable = items.len(), "Parsed generated questions");
    Ok(items)
}

fn parse_question_entry(entry: &Value) -> Option<GeneratedItem> {
    let question = entry.get("question")?.as_str()?.trim();
    if question.is_empty() {
        return None;
    }

    let options: Vec<String> = entry
        .get("options")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();
    if options.len() < 2 {
        return None;
    }

    let answer = entry
        .get("correctAnswer")
        .or_else(|| entry.get("correct_answer"))?;
    let correct_answer = match answer {
        Value::String(s) => options.iter().find(|o| o.as_str() == s.trim())?.clone(),
        Value::Number(n) => options.get(usize::try_from(n.as_u64()?).ok()?)?.clone(),
        _ => return None,
    };

    let explanation = entry
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    let tier = entry
        .get("complexity")
        .and_then(Value::as_str)
        .and_then(|c| c.parse::<Tier>().ok());

    Some(GeneratedItem {
        question: question.to_string(),
        options,
        correct_answer,
        tier,
        explanation,
    })
}

/// Parses the JSON payload of a model reply, tolerating code fences and surrounding prose.
///
/// Candidates in order: the whole reply, the first fenced block, the outermost brace pair,
/// the outermost bracket pair. The first one that parses wins.
pub fn parse_json_payload(raw: &str) -> Result<Value, ApiError> {
    let candidates = [
        Some(raw.trim()),
        fenced_block(raw),
        extract_json_object(raw),
        extract_json_array(raw),
    ];
    let mut last_error = None;
    for candidate in candidates.into_iter().flatten() {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }
    Err(ApiError::MalformedResponse(match last_error {
        Some(e) if raw.contains(['{', '[']) => format!("invalid JSON in reply: {}", e),
        _ => "reply contains no JSON payload".to_string(),
    }))
}

/// Body of the first fenced code block, with an optional `json` tag stripped.
fn fenced_block(raw: &str) -> Option<&str> {
    let start = raw.find("```")?;
    let body = &raw[start + 3..];
    let body = body.strip_prefix("json").unwrap_or(body);
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Locates a JSON object inside free text: a fenced block holding an object first, else the
/// outermost brace pair.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    if let Some(json) = fenced_block(raw) {
        if json.starts_with('{') && json.ends_with('}') {
            return Some(json);
        }
    }
    outermost(raw, '{', '}')
}

/// Outermost bracket pair, for replies that return the question list bare.
fn extract_json_array(raw: &str) -> Option<&str> {
    outermost(raw, '[', ']')
}

fn outermost(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(raw[start..=end].trim())
}
