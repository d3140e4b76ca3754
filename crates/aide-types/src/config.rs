//! Assistant configuration.
//!
//! Deserialized from `config.toml` in the data directory. Every field has a
//! default so a missing or partial file still yields a working assistant.

use serde::{Deserialize, Serialize};

/// Configuration for the assistant: session liveness policy, inference
/// backend selection, and the user-visible fallback reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Seconds of inactivity after which the current session expires.
    #[serde(default = "default_idle_threshold_secs")]
    pub idle_threshold_secs: u64,

    /// Substring whose presence in a user turn forces the session to expire
    /// (case-normalized containment match).
    #[serde(default = "default_reset_trigger_phrase")]
    pub reset_trigger_phrase: String,

    /// Model identifier passed to the inference backend.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Ollama server.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Per-request timeout for backend calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Fixed reply returned when the backend is unavailable on the reply path.
    #[serde(default = "default_reply_fallback")]
    pub reply_fallback: String,
}

fn default_idle_threshold_secs() -> u64 {
    300
}

fn default_reset_trigger_phrase() -> String {
    "thank you".to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_reply_fallback() -> String {
    "Sorry, I'm having trouble reaching my language model right now. \
     Please try again in a moment."
        .to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            idle_threshold_secs: default_idle_threshold_secs(),
            reset_trigger_phrase: default_reset_trigger_phrase(),
            model: default_model(),
            ollama_url: default_ollama_url(),
            request_timeout_secs: default_request_timeout_secs(),
            reply_fallback: default_reply_fallback(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.idle_threshold_secs, 300);
        assert_eq!(config.reset_trigger_phrase, "thank you");
        assert_eq!(config.model, "llama3.1:8b");
        assert_eq!(config.request_timeout_secs, 60);
        assert!(!config.reply_fallback.is_empty());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AssistantConfig = toml::from_str(
            r#"
model = "qwen2.5:7b"
idle_threshold_secs = 120
"#,
        )
        .unwrap();
        assert_eq!(config.model, "qwen2.5:7b");
        assert_eq!(config.idle_threshold_secs, 120);
        // Unspecified fields keep their defaults
        assert_eq!(config.reset_trigger_phrase, "thank you");
        assert_eq!(config.ollama_url, "http://localhost:11434");
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: AssistantConfig = toml::from_str("").unwrap();
        assert_eq!(config.idle_threshold_secs, 300);
        assert_eq!(config.model, "llama3.1:8b");
    }
}
