//! Configuration loader for Aide.
//!
//! Reads `config.toml` from the data directory (`~/.aide/` in production)
//! and deserializes it into [`AssistantConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::{Path, PathBuf};

use aide_types::config::AssistantConfig;

/// Resolve the data directory: `AIDE_DATA_DIR`, then `~/.aide`, then a
/// relative `.aide` as a last resort.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AIDE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".aide");
    }

    PathBuf::from(".aide")
}

/// Load assistant configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AssistantConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the
///   default.
/// - Otherwise returns the parsed config (missing fields keep defaults).
pub async fn load_assistant_config(data_dir: &Path) -> AssistantConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AssistantConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AssistantConfig::default();
        }
    };

    match toml::from_str::<AssistantConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AssistantConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_assistant_config(tmp.path()).await;
        assert_eq!(config.idle_threshold_secs, 300);
        assert_eq!(config.model, "llama3.1:8b");
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
model = "qwen2.5:7b"
idle_threshold_secs = 120
reset_trigger_phrase = "goodbye"
"#,
        )
        .await
        .unwrap();

        let config = load_assistant_config(tmp.path()).await;
        assert_eq!(config.model, "qwen2.5:7b");
        assert_eq!(config.idle_threshold_secs, 120);
        assert_eq!(config.reset_trigger_phrase, "goodbye");
        // Unspecified fields keep their defaults
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_assistant_config(tmp.path()).await;
        assert_eq!(config.idle_threshold_secs, 300);
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var("AIDE_DATA_DIR", "/tmp/test-aide");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-aide"));
        unsafe {
            std::env::remove_var("AIDE_DATA_DIR");
        }
    }
}
