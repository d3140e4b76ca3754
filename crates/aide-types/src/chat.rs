//! Conversation turn and session state types for Aide.
//!
//! These types model the short-term side of the assistant: the ordered turn
//! history of the conversation currently in flight and its liveness state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// A single turn in a conversation. Immutable once appended to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Convenience constructor for a user turn.
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            timestamp,
        }
    }

    /// Convenience constructor for an assistant turn.
    pub fn assistant(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
            timestamp,
        }
    }
}

/// Liveness state of a session context.
///
/// `Expired` is terminal for an instance: the orchestrator replaces an
/// expired context with a fresh one, it never resurrects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Expired,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Active => write!(f, "active"),
            SessionState::Expired => write!(f, "expired"),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_role_roundtrip() {
        for role in [TurnRole::User, TurnRole::Assistant] {
            let s = role.to_string();
            let parsed: TurnRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_turn_role_serde() {
        let role = TurnRole::Assistant;
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: TurnRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TurnRole::Assistant);
    }

    #[test]
    fn test_turn_constructors() {
        let now = Utc::now();
        let turn = ConversationTurn::user("hello", now);
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.text, "hello");
        assert_eq!(turn.timestamp, now);

        let turn = ConversationTurn::assistant("hi there", now);
        assert_eq!(turn.role, TurnRole::Assistant);
    }

    #[test]
    fn test_session_state_default_is_active() {
        assert_eq!(SessionState::default(), SessionState::Active);
    }

    #[test]
    fn test_session_state_serde() {
        let json = serde_json::to_string(&SessionState::Expired).unwrap();
        assert_eq!(json, "\"expired\"");
    }
}
