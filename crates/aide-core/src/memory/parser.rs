//! Fallible parsing of extraction completions.
//!
//! The model's output is an untrusted, possibly malformed feed. Parsing is a
//! ladder: strict JSON (tolerating markdown code fences) first, then a
//! permissive line-based scan that still enforces the category tag, then
//! `Unparseable`. A parse failure is a data condition, never a crash.

use serde::Deserialize;

use aide_types::memory::{ExtractionCandidate, MemoryCategory};

/// Outcome of parsing one extraction completion.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Well-formed output. May be empty: "nothing worth extracting" is a
    /// valid answer, not a failure.
    Parsed(Vec<ExtractionCandidate>),
    /// Both the strict and the permissive parse failed.
    Unparseable,
}

/// Strict schema: `{"items": [{"category": ..., "content": ...}]}`.
#[derive(Debug, Deserialize)]
struct ExtractionPayload {
    items: Vec<RawItem>,
}

/// One item as emitted by the model, before category validation.
#[derive(Debug, Deserialize)]
struct RawItem {
    category: String,
    content: String,
}

/// Parse a completion into extraction candidates.
pub fn parse_completion(raw: &str) -> ParseOutcome {
    let stripped = strip_code_fences(raw);

    if let Some(candidates) = parse_strict(stripped) {
        return ParseOutcome::Parsed(candidates);
    }

    match parse_lines(stripped) {
        Some(candidates) => ParseOutcome::Parsed(candidates),
        None => ParseOutcome::Unparseable,
    }
}

/// Strict JSON parse: an `{"items": [...]}` object, or a bare array of
/// items. Items with an unknown category or empty content are dropped with
/// a warning rather than failing the whole parse.
fn parse_strict(raw: &str) -> Option<Vec<ExtractionCandidate>> {
    let items: Vec<RawItem> = if let Ok(payload) = serde_json::from_str::<ExtractionPayload>(raw) {
        payload.items
    } else if let Ok(items) = serde_json::from_str::<Vec<RawItem>>(raw) {
        items
    } else {
        return None;
    };

    Some(items.into_iter().filter_map(validate_item).collect())
}

/// Permissive line-based parse. Accepted shapes per line:
///
/// ```text
/// goal: learn Rust
/// - goal: learn Rust
/// [goal] learn Rust
/// - [goal] learn Rust
/// ```
///
/// Lines without a recognizable category tag are ignored. Returns `None`
/// when no line yields a candidate, so pure prose stays unparseable instead
/// of silently becoming an empty result.
fn parse_lines(raw: &str) -> Option<Vec<ExtractionCandidate>> {
    let candidates: Vec<ExtractionCandidate> = raw
        .lines()
        .filter_map(parse_line)
        .collect();

    if candidates.is_empty() {
        None
    } else {
        Some(candidates)
    }
}

fn parse_line(line: &str) -> Option<ExtractionCandidate> {
    let line = line.trim().trim_start_matches(['-', '*']).trim_start();
    if line.is_empty() {
        return None;
    }

    // "[category] content"
    if let Some(rest) = line.strip_prefix('[') {
        let (tag, content) = rest.split_once(']')?;
        return make_candidate(tag, content);
    }

    // "category: content"
    let (tag, content) = line.split_once(':')?;
    make_candidate(tag, content)
}

fn make_candidate(tag: &str, content: &str) -> Option<ExtractionCandidate> {
    let category: MemoryCategory = tag.parse().ok()?;
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    Some(ExtractionCandidate {
        category,
        content: content.to_string(),
    })
}

fn validate_item(item: RawItem) -> Option<ExtractionCandidate> {
    let category = match item.category.parse::<MemoryCategory>() {
        Ok(category) => category,
        Err(_) => {
            tracing::warn!(
                category = %item.category,
                content = %item.content,
                "unknown category in extraction output; dropping item"
            );
            return None;
        }
    };
    let content = item.content.trim();
    if content.is_empty() {
        return None;
    }
    Some(ExtractionCandidate {
        category,
        content: content.to_string(),
    })
}

/// Strip a surrounding markdown code fence, if present. Models in JSON mode
/// still occasionally wrap output in ```json blocks.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline, and the
    // closing fence.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
    body.trim_end().trim_end_matches("```").trim()
}
