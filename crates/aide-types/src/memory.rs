//! Long-term memory types for Aide.
//!
//! These types model what the assistant remembers about the user across
//! sessions: attributes, goals, general memories, and standing requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Category of a memory record.
///
/// A closed four-case variant rather than a free string so exhaustiveness
/// checks and merge-key equality stay well-defined. Immutable once a record
/// is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryCategory {
    /// A durable fact about who the user is.
    Attribute,
    /// Something the user wants to achieve.
    Goal,
    /// A general fact worth keeping that fits no other category.
    Memory,
    /// A standing request about how the assistant should behave.
    Request,
}

impl MemoryCategory {
    /// All categories in the stable order used for prompt rendering.
    pub const ALL: [MemoryCategory; 4] = [
        MemoryCategory::Attribute,
        MemoryCategory::Goal,
        MemoryCategory::Memory,
        MemoryCategory::Request,
    ];
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryCategory::Attribute => write!(f, "attribute"),
            MemoryCategory::Goal => write!(f, "goal"),
            MemoryCategory::Memory => write!(f, "memory"),
            MemoryCategory::Request => write!(f, "request"),
        }
    }
}

impl FromStr for MemoryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "attribute" => Ok(MemoryCategory::Attribute),
            "goal" => Ok(MemoryCategory::Goal),
            "memory" => Ok(MemoryCategory::Memory),
            "request" => Ok(MemoryCategory::Request),
            other => Err(format!("invalid memory category: '{other}'")),
        }
    }
}

/// A persisted long-term memory record.
///
/// Owned by the memory store. Mutated only via create or merge-update
/// (a later candidate matching the merge key bumps `updated_at` on the
/// existing record instead of inserting a duplicate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: Uuid,
    pub category: MemoryCategory,
    /// Normalized content: trimmed, internal whitespace folded.
    pub content: String,
    /// Provenance: the session the record was derived from (None for
    /// records created manually through the admin facade).
    pub session_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// The merge key for this record: its content trimmed, whitespace-folded
    /// and casefolded. Two records with equal `(category, normalized)` pairs
    /// are the same memory.
    pub fn normalized_content(&self) -> String {
        normalize_content(&self.content)
    }
}

/// A candidate produced by the extraction pipeline from a model completion.
///
/// Transient: never persisted directly, always reconciled against existing
/// records through the merge step first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractionCandidate {
    pub category: MemoryCategory,
    pub content: String,
}

/// Fold a raw content string into its canonical stored form: trimmed, with
/// runs of internal whitespace collapsed to single spaces. Case is kept.
pub fn fold_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compute the merge-key form of a content string: whitespace-folded and
/// casefolded. `"Lives in Tokyo "` and `"lives in Tokyo"` normalize equal.
pub fn normalize_content(raw: &str) -> String {
    fold_whitespace(raw).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_category_roundtrip() {
        for cat in MemoryCategory::ALL {
            let s = cat.to_string();
            let parsed: MemoryCategory = s.parse().unwrap();
            assert_eq!(cat, parsed);
        }
    }

    #[test]
    fn test_memory_category_serde() {
        let cat = MemoryCategory::Goal;
        let json = serde_json::to_string(&cat).unwrap();
        assert_eq!(json, "\"goal\"");
        let parsed: MemoryCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MemoryCategory::Goal);
    }

    #[test]
    fn test_memory_category_from_str_tolerates_case_and_padding() {
        let parsed: MemoryCategory = " Attribute ".parse().unwrap();
        assert_eq!(parsed, MemoryCategory::Attribute);
        assert!("hobby".parse::<MemoryCategory>().is_err());
    }

    #[test]
    fn test_fold_whitespace() {
        assert_eq!(fold_whitespace("  lives   in\tTokyo "), "lives in Tokyo");
        assert_eq!(fold_whitespace("learn Rust"), "learn Rust");
        assert_eq!(fold_whitespace("   "), "");
    }

    #[test]
    fn test_normalize_content_casefolds() {
        assert_eq!(normalize_content("Lives in Tokyo "), "lives in tokyo");
        assert_eq!(
            normalize_content("lives in Tokyo"),
            normalize_content(" Lives  in TOKYO")
        );
    }

    #[test]
    fn test_memory_record_serialize() {
        let record = MemoryRecord {
            id: Uuid::now_v7(),
            category: MemoryCategory::Attribute,
            content: "lives in Tokyo".to_string(),
            session_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"category\":\"attribute\""));
        assert!(json.contains("lives in Tokyo"));
    }

    #[test]
    fn test_extraction_candidate_deserialize() {
        let json = r#"{"category": "request", "content": "keep replies short"}"#;
        let candidate: ExtractionCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.category, MemoryCategory::Request);
        assert_eq!(candidate.content, "keep replies short");
    }
}
