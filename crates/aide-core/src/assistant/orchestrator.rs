//! Assistant orchestrator.
//!
//! Receives user utterances, manages session liveness, produces replies, and
//! schedules extraction off the user-facing latency path. Each session is
//! guarded by its own async mutex: concurrent calls for the same session
//! queue, so turn appends never interleave. Session contexts are exclusively
//! owned here and replaced (never resurrected) after expiry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use aide_types::chat::ConversationTurn;
use aide_types::config::AssistantConfig;
use aide_types::error::{AssistantError, ExtractionError};
use aide_types::llm::CompletionRequest;
use aide_types::memory::MemoryRecord;

use crate::llm::BoxInferenceBackend;
use crate::memory::{ExtractionPipeline, MemoryStore};
use crate::prompt::{DebugView, PromptAssembler};
use crate::session::{SessionContext, SessionPolicy};

/// The assistant: one instance serves every conversation, each identified by
/// the transport-supplied session id.
pub struct Assistant<M: MemoryStore + 'static> {
    backend: Arc<BoxInferenceBackend>,
    store: Arc<M>,
    pipeline: Arc<ExtractionPipeline<M>>,
    config: AssistantConfig,
    policy: SessionPolicy,
    sessions: DashMap<String, Arc<Mutex<SessionContext>>>,
}

impl<M: MemoryStore + 'static> Assistant<M> {
    pub fn new(backend: Arc<BoxInferenceBackend>, store: Arc<M>, config: AssistantConfig) -> Self {
        let policy = SessionPolicy::from(&config);
        let pipeline = Arc::new(ExtractionPipeline::new(
            backend.clone(),
            store.clone(),
            config.model.clone(),
        ));
        Self {
            backend,
            store,
            pipeline,
            config,
            policy,
            sessions: DashMap::new(),
        }
    }

    /// Handle one user utterance and return the assistant's reply.
    ///
    /// Backend failure on the reply path yields the configured fallback text
    /// instead of an error; only store and sequencing failures propagate.
    pub async fn handle_user_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<String, AssistantError> {
        self.handle_user_message_at(session_id, text, Utc::now())
            .await
    }

    /// Clock-injected variant of [`Self::handle_user_message`]. `now` is the
    /// logical time of the call, used for expiry checks and turn timestamps.
    pub async fn handle_user_message_at(
        &self,
        session_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AssistantError> {
        let slot = self.session_slot(session_id, now);
        let mut ctx = slot.lock().await;

        if ctx.is_expired(now) {
            info!(
                session_id,
                discarded_turns = ctx.turn_count(),
                "session expired; starting a fresh context"
            );
            ctx.reset();
            *ctx = SessionContext::new(self.policy.clone(), now);
        }

        ctx.append(ConversationTurn::user(text, now))?;

        let records = self.store.list_all().await?;
        let prompt = PromptAssembler::render(&ctx.snapshot(), &records);

        let request = CompletionRequest {
            model: self.config.model.clone(),
            prompt,
            json_format: false,
        };

        let reply = match self.backend.complete(&request).await {
            Ok(response) => response.content,
            Err(e) => {
                // Fallback text is not appended as an assistant turn and this
                // cycle's extraction is skipped: a canned apology is not
                // dialogue worth extracting from.
                warn!(error = %e, session_id, "reply generation failed; returning fallback");
                return Ok(self.config.reply_fallback.clone());
            }
        };

        ctx.append(ConversationTurn::assistant(reply.clone(), now))?;

        let snapshot = ctx.snapshot();
        let context_id = ctx.id();
        drop(ctx);

        // Off the latency path. The task keeps running against its snapshot
        // even if the session expires meanwhile: it mutates long-term state,
        // not the (possibly discarded) context it was cut from.
        let pipeline = self.pipeline.clone();
        tokio::spawn(async move {
            match pipeline.extract(&snapshot, context_id).await {
                Ok(touched) => debug!(count = touched.len(), "extraction cycle merged"),
                Err(ExtractionError::Backend(e)) => {
                    warn!(error = %e, "extraction cycle skipped")
                }
                Err(ExtractionError::Store(e)) => {
                    tracing::error!(error = %e, "extraction cycle failed to persist")
                }
            }
        });

        Ok(reply)
    }

    /// Run an extraction cycle for a session inline and return the touched
    /// records. Diagnostic/manual counterpart of the background scheduling in
    /// [`Self::handle_user_message`]; backend failures are non-fatal here too.
    pub async fn run_extraction(
        &self,
        session_id: &str,
    ) -> Result<Vec<MemoryRecord>, AssistantError> {
        let slot = self
            .sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AssistantError::UnknownSession(session_id.to_string()))?;

        let ctx = slot.lock().await;
        let snapshot = ctx.snapshot();
        let context_id = ctx.id();
        drop(ctx);

        match self.pipeline.extract(&snapshot, context_id).await {
            Ok(touched) => Ok(touched),
            Err(ExtractionError::Backend(e)) => {
                warn!(error = %e, session_id, "extraction cycle skipped");
                Ok(Vec::new())
            }
            Err(ExtractionError::Store(e)) => Err(AssistantError::Store(e)),
        }
    }

    /// Diagnostic view: the exact prompt a reply call would send right now,
    /// plus its structured breakdown. Read-only; does not touch liveness.
    pub async fn introspect(&self, session_id: &str) -> Result<DebugView, AssistantError> {
        let slot = self
            .sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AssistantError::UnknownSession(session_id.to_string()))?;

        let ctx = slot.lock().await;
        let snapshot = ctx.snapshot();
        drop(ctx);

        let records = self.store.list_all().await?;
        Ok(PromptAssembler::render_debug_view(&snapshot, &records))
    }

    /// Fetch or create the mutex-guarded slot for a session id.
    fn session_slot(&self, session_id: &str, now: DateTime<Utc>) -> Arc<Mutex<SessionContext>> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionContext::new(self.policy.clone(), now))))
            .value()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::InferenceBackend;
    use crate::test_support::InMemoryStore;
    use aide_types::llm::{BackendError, CompletionResponse};
    use aide_types::memory::MemoryCategory;
    use chrono::Duration;

    /// Routes requests by kind: reply calls (json_format off) and extraction
    /// calls (json_format on) get independent canned results, so background
    /// extraction cannot race the reply script.
    struct RoutedBackend {
        reply: Result<String, BackendError>,
        extraction: Result<String, BackendError>,
    }

    impl RoutedBackend {
        fn new(reply: Result<String, BackendError>, extraction: Result<String, BackendError>) -> Self {
            Self { reply, extraction }
        }
    }

    impl InferenceBackend for RoutedBackend {
        fn name(&self) -> &str {
            "routed"
        }

        async fn complete(
            &self,
            request: &aide_types::llm::CompletionRequest,
        ) -> Result<CompletionResponse, BackendError> {
            let result = if request.json_format {
                &self.extraction
            } else {
                &self.reply
            };
            match result {
                Ok(content) => Ok(CompletionResponse {
                    model: request.model.clone(),
                    content: content.clone(),
                }),
                Err(BackendError::Timeout(secs)) => Err(BackendError::Timeout(*secs)),
                Err(BackendError::Unavailable(msg)) => {
                    Err(BackendError::Unavailable(msg.clone()))
                }
                Err(BackendError::InvalidResponse(msg)) => {
                    Err(BackendError::InvalidResponse(msg.clone()))
                }
            }
        }
    }

    fn assistant_with(
        reply: Result<String, BackendError>,
        extraction: Result<String, BackendError>,
    ) -> (Assistant<InMemoryStore>, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let backend = Arc::new(BoxInferenceBackend::new(RoutedBackend::new(
            reply, extraction,
        )));
        let assistant = Assistant::new(backend, store.clone(), AssistantConfig::default());
        (assistant, store)
    }

    fn no_extraction() -> Result<String, BackendError> {
        Err(BackendError::Unavailable("not scripted".to_string()))
    }

    #[tokio::test]
    async fn test_reply_round_trip() {
        let (assistant, _store) =
            assistant_with(Ok("Hello! How can I help?".to_string()), no_extraction());

        let reply = assistant
            .handle_user_message("sess-1", "hello")
            .await
            .unwrap();
        assert_eq!(reply, "Hello! How can I help?");
    }

    #[tokio::test]
    async fn test_backend_timeout_returns_fallback_without_store_mutation() {
        let (assistant, store) = assistant_with(
            Err(BackendError::Timeout(60)),
            Ok(r#"{"items": [{"category": "goal", "content": "should never land"}]}"#.to_string()),
        );

        let reply = assistant
            .handle_user_message("sess-1", "my goal is to learn Rust")
            .await
            .unwrap();

        assert_eq!(reply, AssistantConfig::default().reply_fallback);
        // Extraction was skipped for this cycle entirely.
        assert!(store.records().await.is_empty());

        // The fallback was not appended as a genuine assistant turn.
        let view = assistant.introspect("sess-1").await.unwrap();
        assert!(view.breakdown.short_term.contains("User: my goal is to learn Rust"));
        assert!(!view.breakdown.short_term.contains("Assistant:"));
    }

    #[tokio::test]
    async fn test_goal_scenario_end_to_end() {
        let (assistant, store) = assistant_with(
            Ok("Great goal! Where would you like to start?".to_string()),
            Ok(r#"{"items": [{"category": "goal", "content": "learn Rust"}]}"#.to_string()),
        );

        assistant
            .handle_user_message("sess-1", "My goal is to learn Rust")
            .await
            .unwrap();
        // Deterministic counterpart of the background task; the merge step
        // keeps the two runs from creating duplicates.
        assistant.run_extraction("sess-1").await.unwrap();

        let records = store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, MemoryCategory::Goal);
        assert_eq!(records[0].normalized_content(), "learn rust");
    }

    #[tokio::test]
    async fn test_session_survives_gaps_under_threshold() {
        let (assistant, _store) = assistant_with(Ok("ok".to_string()), no_extraction());
        let t0 = Utc::now();

        assistant
            .handle_user_message_at("sess-1", "my name is Alice", t0)
            .await
            .unwrap();
        assistant
            .handle_user_message_at("sess-1", "hello again", t0 + Duration::seconds(299))
            .await
            .unwrap();

        let view = assistant.introspect("sess-1").await.unwrap();
        assert!(view.breakdown.short_term.contains("my name is Alice"));
        assert!(view.breakdown.short_term.contains("hello again"));
    }

    #[tokio::test]
    async fn test_idle_session_replaced_with_fresh_context() {
        let (assistant, _store) = assistant_with(Ok("ok".to_string()), no_extraction());
        let t0 = Utc::now();

        assistant
            .handle_user_message_at("sess-1", "my name is Alice", t0)
            .await
            .unwrap();
        // 301 seconds of silence, then a new message
        assistant
            .handle_user_message_at("sess-1", "hello", t0 + Duration::seconds(301))
            .await
            .unwrap();

        let view = assistant.introspect("sess-1").await.unwrap();
        // Prior context discarded, not merged into the new one
        assert!(!view.breakdown.short_term.contains("my name is Alice"));
        assert!(view.breakdown.short_term.contains("User: hello"));
    }

    #[tokio::test]
    async fn test_trigger_phrase_expires_session_for_next_message() {
        let (assistant, _store) = assistant_with(Ok("you're welcome!".to_string()), no_extraction());
        let t0 = Utc::now();

        assistant
            .handle_user_message_at("sess-1", "thank you for the help", t0)
            .await
            .unwrap();
        // The trigger turn itself still got a reply in the old context; the
        // next message starts a fresh one regardless of elapsed time.
        assistant
            .handle_user_message_at("sess-1", "what's next?", t0 + Duration::seconds(1))
            .await
            .unwrap();

        let view = assistant.introspect("sess-1").await.unwrap();
        assert!(!view.breakdown.short_term.contains("thank you for the help"));
        assert!(view.breakdown.short_term.contains("what's next?"));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let (assistant, _store) = assistant_with(Ok("ok".to_string()), no_extraction());
        let t0 = Utc::now();

        assistant
            .handle_user_message_at("sess-a", "I live in Tokyo", t0)
            .await
            .unwrap();
        assistant
            .handle_user_message_at("sess-b", "I live in Paris", t0)
            .await
            .unwrap();

        let view_a = assistant.introspect("sess-a").await.unwrap();
        assert!(view_a.breakdown.short_term.contains("Tokyo"));
        assert!(!view_a.breakdown.short_term.contains("Paris"));
    }

    #[tokio::test]
    async fn test_introspection_matches_render_path() {
        let (assistant, store) = assistant_with(Ok("hi!".to_string()), no_extraction());

        assistant
            .handle_user_message("sess-1", "hello")
            .await
            .unwrap();
        let view = assistant.introspect("sess-1").await.unwrap();

        let records = store.records().await;
        let expected = PromptAssembler::render(
            &[
                ConversationTurn::user("hello", Utc::now()),
                ConversationTurn::assistant("hi!", Utc::now()),
            ],
            &records,
        );
        // Timestamps differ but rendered text does not include them.
        assert_eq!(view.prompt, expected);
    }

    #[tokio::test]
    async fn test_introspect_unknown_session() {
        let (assistant, _store) = assistant_with(Ok("ok".to_string()), no_extraction());
        let err = assistant.introspect("nope").await.unwrap_err();
        assert!(matches!(err, AssistantError::UnknownSession(_)));
    }

    #[tokio::test]
    async fn test_long_term_memory_injected_into_prompt() {
        let (assistant, store) = assistant_with(Ok("ok".to_string()), no_extraction());

        let now = Utc::now();
        store
            .create(&MemoryRecord {
                id: uuid::Uuid::now_v7(),
                category: MemoryCategory::Attribute,
                content: "lives in Tokyo".to_string(),
                session_id: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        assistant
            .handle_user_message("sess-1", "where do I live?")
            .await
            .unwrap();

        let view = assistant.introspect("sess-1").await.unwrap();
        assert!(view.breakdown.long_term.contains("lives in Tokyo"));
    }
}
