//! Configuration schema for chunkcache
//!
//! Configuration is stored at `~/.config/chunkcache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Layer store settings
    pub store: StoreConfig,

    /// Compressor settings
    pub compressor: CompressorConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

impl GeneralConfig {
    /// Whether logs should be emitted as JSON lines
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// Layer store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding per-layer blobs (defaults to the data dir)
    pub root: Option<PathBuf>,
}

/// Compressor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    /// Minimum zero run reported as a hole
    pub hole_threshold: u64,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            hole_threshold: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[compressor]"));
        assert!(toml.contains("hole_threshold = 1024"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[store]
root = "/var/lib/layers"
"#,
        )
        .unwrap();

        assert_eq!(config.store.root, Some(PathBuf::from("/var/lib/layers")));
        assert_eq!(config.compressor.hole_threshold, 1024);
        assert_eq!(config.general.log_format, "text");
    }

    #[test]
    fn json_log_format() {
        let config: Config = toml::from_str("[general]\nlog_format = \"JSON\"\n").unwrap();
        assert!(config.general.json_logs());
        assert!(!GeneralConfig::default().json_logs());
    }
}
