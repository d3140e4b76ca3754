//! Session context: the ordered turn history of the conversation in flight.
//!
//! Liveness is a pure function of stored timestamps evaluated on access, so
//! the context needs no internal concurrency and tests run against injected
//! clocks. An expired context is terminal: the orchestrator replaces it with
//! a fresh instance, it is never resurrected.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use aide_types::chat::{ConversationTurn, SessionState, TurnRole};
use aide_types::config::AssistantConfig;
use aide_types::error::SessionError;

/// Liveness policy injected into each session context at construction.
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    /// Inactivity span after which the context expires.
    pub idle_threshold: Duration,
    /// Trigger phrase, pre-lowercased for containment matching.
    trigger_phrase: String,
}

impl SessionPolicy {
    pub fn new(idle_threshold: Duration, trigger_phrase: &str) -> Self {
        Self {
            idle_threshold,
            trigger_phrase: trigger_phrase.trim().to_lowercase(),
        }
    }

    /// Whether a user turn's text matches the trigger phrase.
    ///
    /// Case-normalized containment, not full-string equality: "Thank you so
    /// much!" matches the default trigger "thank you".
    pub fn matches_trigger(&self, text: &str) -> bool {
        !self.trigger_phrase.is_empty() && text.to_lowercase().contains(&self.trigger_phrase)
    }
}

impl From<&AssistantConfig> for SessionPolicy {
    fn from(config: &AssistantConfig) -> Self {
        Self::new(
            Duration::seconds(config.idle_threshold_secs as i64),
            &config.reset_trigger_phrase,
        )
    }
}

/// The turn history of the conversation currently considered in progress.
///
/// Turns are chronological and append-only; the sequence is exposed only as
/// an owned snapshot, never as a mutable view.
pub struct SessionContext {
    id: Uuid,
    turns: Vec<ConversationTurn>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
    state: SessionState,
    policy: SessionPolicy,
}

impl SessionContext {
    /// Create a fresh, active context starting at `now`.
    pub fn new(policy: SessionPolicy, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            turns: Vec::new(),
            created_at: now,
            last_activity_at: now,
            state: SessionState::Active,
            policy,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// Append a turn and advance `last_activity_at` to its timestamp.
    ///
    /// Fails with `SessionError::Expired` on an expired context: that is a
    /// sequencing bug in the caller, which must install a fresh context
    /// before writing.
    pub fn append(&mut self, turn: ConversationTurn) -> Result<(), SessionError> {
        if self.state == SessionState::Expired {
            return Err(SessionError::Expired);
        }
        self.last_activity_at = turn.timestamp;
        self.turns.push(turn);
        Ok(())
    }

    /// Pure liveness predicate.
    ///
    /// True when the idle threshold has elapsed since the last activity, or
    /// when the most recent user turn matched the trigger phrase, or when the
    /// context was already reset.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        if self.state == SessionState::Expired {
            return true;
        }
        if now - self.last_activity_at >= self.policy.idle_threshold {
            return true;
        }
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == TurnRole::User)
            .is_some_and(|t| self.policy.matches_trigger(&t.text))
    }

    /// Mark the context expired. Idempotent.
    pub fn reset(&mut self) {
        self.state = SessionState::Expired;
    }

    /// Owned copy of the turn sequence for rendering and extraction.
    pub fn snapshot(&self) -> Vec<ConversationTurn> {
        self.turns.clone()
    }
}
