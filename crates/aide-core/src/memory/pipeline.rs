//! Extraction pipeline: dialogue in, deduplicated memory records out.
//!
//! Asks the inference backend to summarize the durable facts visible in a
//! session snapshot, parses the completion as an untrusted feed, and merges
//! well-formed candidates into the store. Backend failures skip the whole
//! cycle (no partial persistence); parse failures discard the cycle's
//! candidates; only store failures propagate.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use aide_types::chat::{ConversationTurn, TurnRole};
use aide_types::error::ExtractionError;
use aide_types::llm::CompletionRequest;
use aide_types::memory::{fold_whitespace, normalize_content, MemoryRecord};

use crate::llm::BoxInferenceBackend;

use super::parser::{parse_completion, ParseOutcome};
use super::store::MemoryStore;

/// Prompt for the extraction call.
///
/// Instructs the model to emit the fixed JSON schema, one item per durable
/// fact, each tagged with one of the four categories. An empty items array
/// is the expected answer for small talk.
const EXTRACTION_PROMPT: &str = r#"From the following conversation between a user and their assistant, extract the user's information worth keeping long-term: attributes, goals, general memories, and requests to the assistant.

Rules:
1. Extract ONLY durable facts about the user, not pleasantries or one-off chatter
2. Each item must be a single, self-contained statement
3. If there is nothing worth keeping, return "items": []
4. Output JSON only, with no markdown code block

Format:
{
    "items": [
        { "category": "attribute", "content": "is a programmer" },
        { "category": "goal", "content": "wants to master Python" },
        { "category": "request", "content": "keep replies short" }
    ]
}

Valid categories: attribute (who the user is), goal (what they want to achieve), memory (other facts worth keeping), request (how the assistant should behave)"#;

/// Converts a turn window into persisted memory records via the backend.
///
/// Merge is a per-candidate read-then-write critical section guarded by a
/// mutex, with the store's unique `(category, normalized content)` constraint
/// as the backstop against duplicate creation under concurrent extraction.
pub struct ExtractionPipeline<M: MemoryStore> {
    backend: Arc<BoxInferenceBackend>,
    store: Arc<M>,
    model: String,
    merge_lock: tokio::sync::Mutex<()>,
}

impl<M: MemoryStore> ExtractionPipeline<M> {
    pub fn new(backend: Arc<BoxInferenceBackend>, store: Arc<M>, model: String) -> Self {
        Self {
            backend,
            store,
            model,
            merge_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Run one extraction cycle against a session snapshot.
    ///
    /// Returns the records actually touched this call: created, or updated
    /// because a candidate matched an existing record's merge key. Running
    /// twice on an identical snapshot creates nothing on the second call.
    #[tracing::instrument(
        name = "extract_memory",
        skip(self, snapshot),
        fields(session_id = %session_id, turn_count = snapshot.len())
    )]
    pub async fn extract(
        &self,
        snapshot: &[ConversationTurn],
        session_id: Uuid,
    ) -> Result<Vec<MemoryRecord>, ExtractionError> {
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }

        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: Self::build_prompt(snapshot),
            json_format: true,
        };

        let response = self.backend.complete(&request).await?;

        let candidates = match parse_completion(&response.content) {
            ParseOutcome::Parsed(candidates) => candidates,
            ParseOutcome::Unparseable => {
                let preview: String = response.content.chars().take(200).collect();
                tracing::warn!(
                    content_preview = %preview,
                    "extraction completion failed both strict and permissive parsing; discarding cycle"
                );
                return Ok(Vec::new());
            }
        };

        let mut touched = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let content = fold_whitespace(&candidate.content);
            if content.is_empty() {
                continue;
            }
            let normalized = normalize_content(&content);

            // Check-then-act must not interleave with another candidate's
            // merge, or concurrent extractions create duplicates.
            let _guard = self.merge_lock.lock().await;

            let now = Utc::now();
            match self
                .store
                .find_by_normalized_content(candidate.category, &normalized)
                .await?
            {
                Some(mut existing) => {
                    self.store.touch(&existing.id, now).await?;
                    existing.updated_at = now;
                    touched.push(existing);
                }
                None => {
                    let record = MemoryRecord {
                        id: Uuid::now_v7(),
                        category: candidate.category,
                        content,
                        session_id: Some(session_id),
                        created_at: now,
                        updated_at: now,
                    };
                    self.store.create(&record).await?;
                    tracing::debug!(
                        category = %record.category,
                        content = %record.content,
                        "created memory record"
                    );
                    touched.push(record);
                }
            }
        }

        Ok(touched)
    }

    /// The extraction prompt: fixed instructions followed by the transcript.
    fn build_prompt(snapshot: &[ConversationTurn]) -> String {
        let transcript: Vec<String> = snapshot
            .iter()
            .map(|t| {
                let speaker = match t.role {
                    TurnRole::User => "User",
                    TurnRole::Assistant => "Assistant",
                };
                format!("{speaker}: {}", t.text)
            })
            .collect();

        format!(
            "{EXTRACTION_PROMPT}\n\n[Conversation]\n{}",
            transcript.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{InMemoryStore, ScriptedBackend};
    use aide_types::llm::BackendError;
    use aide_types::memory::MemoryCategory;

    fn snapshot() -> Vec<ConversationTurn> {
        let now = Utc::now();
        vec![
            ConversationTurn::user("My goal is to learn Rust", now),
            ConversationTurn::assistant("Great goal! Where would you like to start?", now),
        ]
    }

    fn pipeline_with(
        responses: Vec<Result<String, BackendError>>,
    ) -> (ExtractionPipeline<InMemoryStore>, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let backend = Arc::new(BoxInferenceBackend::new(ScriptedBackend::new(responses)));
        let pipeline = ExtractionPipeline::new(backend, store.clone(), "test-model".to_string());
        (pipeline, store)
    }

    #[tokio::test]
    async fn test_extracts_goal_from_conversation() {
        let (pipeline, store) = pipeline_with(vec![Ok(
            r#"{"items": [{"category": "goal", "content": "learn Rust"}]}"#.to_string(),
        )]);

        let touched = pipeline
            .extract(&snapshot(), Uuid::now_v7())
            .await
            .unwrap();

        assert_eq!(touched.len(), 1);
        assert_eq!(touched[0].category, MemoryCategory::Goal);
        assert_eq!(touched[0].content, "learn Rust");

        let records = store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].normalized_content(), "learn rust");
    }

    #[tokio::test]
    async fn test_near_duplicate_candidates_merge_into_one_record() {
        let (pipeline, store) = pipeline_with(vec![
            Ok(r#"{"items": [{"category": "attribute", "content": "lives in Tokyo"}]}"#.to_string()),
            Ok(r#"{"items": [{"category": "attribute", "content": "Lives in Tokyo "}]}"#.to_string()),
        ]);
        let session = Uuid::now_v7();

        let first = pipeline.extract(&snapshot(), session).await.unwrap();
        let second = pipeline.extract(&snapshot(), session).await.unwrap();

        let records = store.records().await;
        assert_eq!(records.len(), 1, "near-duplicate must not create a second record");
        assert_eq!(records[0].content, "lives in Tokyo");
        assert!(second[0].updated_at > first[0].updated_at);
        assert_eq!(first[0].id, second[0].id);
    }

    #[tokio::test]
    async fn test_extract_is_idempotent_on_identical_snapshot() {
        let payload = r#"{"items": [{"category": "goal", "content": "learn Rust"}]}"#;
        let (pipeline, store) =
            pipeline_with(vec![Ok(payload.to_string()), Ok(payload.to_string())]);
        let session = Uuid::now_v7();

        pipeline.extract(&snapshot(), session).await.unwrap();
        let count_after_first = store.records().await.len();
        pipeline.extract(&snapshot(), session).await.unwrap();
        let count_after_second = store.records().await.len();

        assert_eq!(count_after_first, 1);
        assert_eq!(count_after_second, 1);
    }

    #[tokio::test]
    async fn test_same_content_different_category_creates_two_records() {
        let (pipeline, store) = pipeline_with(vec![Ok(r#"{"items": [
            {"category": "goal", "content": "learn Rust"},
            {"category": "memory", "content": "learn Rust"}
        ]}"#
        .to_string())]);

        pipeline.extract(&snapshot(), Uuid::now_v7()).await.unwrap();

        assert_eq!(store.records().await.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_completion_discards_cycle() {
        let (pipeline, store) = pipeline_with(vec![Ok(
            "I could not find anything worth remembering.".to_string()
        )]);

        let touched = pipeline
            .extract(&snapshot(), Uuid::now_v7())
            .await
            .unwrap();

        assert!(touched.is_empty());
        assert!(store.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_skips_cycle_without_persistence() {
        let (pipeline, store) = pipeline_with(vec![Err(BackendError::Timeout(60))]);

        let err = pipeline
            .extract(&snapshot(), Uuid::now_v7())
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Backend(_)));
        assert!(store.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_snapshot_short_circuits() {
        let (pipeline, store) = pipeline_with(vec![]);

        let touched = pipeline.extract(&[], Uuid::now_v7()).await.unwrap();

        assert!(touched.is_empty());
        assert!(store.records().await.is_empty());
        // The scripted backend had no responses queued: reaching it would panic.
    }

    #[tokio::test]
    async fn test_line_fallback_output_still_merges() {
        let (pipeline, store) = pipeline_with(vec![Ok(
            "- goal: learn Rust\n- attribute: lives in Tokyo".to_string()
        )]);

        let touched = pipeline
            .extract(&snapshot(), Uuid::now_v7())
            .await
            .unwrap();

        assert_eq!(touched.len(), 2);
        assert_eq!(store.records().await.len(), 2);
    }

    #[tokio::test]
    async fn test_provenance_records_session_id() {
        let (pipeline, store) = pipeline_with(vec![Ok(
            r#"{"items": [{"category": "goal", "content": "learn Rust"}]}"#.to_string(),
        )]);
        let session = Uuid::now_v7();

        pipeline.extract(&snapshot(), session).await.unwrap();

        assert_eq!(store.records().await[0].session_id, Some(session));
    }

    #[test]
    fn test_build_prompt_contains_transcript_and_schema() {
        let prompt = ExtractionPipeline::<InMemoryStore>::build_prompt(&snapshot());
        assert!(prompt.contains("\"items\""));
        assert!(prompt.contains("User: My goal is to learn Rust"));
        assert!(prompt.contains("Assistant: Great goal!"));
    }
}
