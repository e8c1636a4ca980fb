use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "vellum.config.json";

/// Vellum configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory the editor state is persisted under
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    /// Quiet period, in milliseconds, between the last edit and the
    /// autosave write
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_storage_dir() -> String {
    ".vellum".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the storage directory
    pub fn storage_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.storage_dir)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "storageDir": "state",
            "debounceMs": 50
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.storage_dir, "state");
        assert_eq!(config.debounce(), Duration::from_millis(50));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage_dir, ".vellum");
        assert_eq!(config.debounce_ms, 500);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{ "debounceMs": 10 }"#).unwrap();
        assert_eq!(config.storage_dir, ".vellum");
        assert_eq!(config.debounce_ms, 10);
    }
}
