// ⚙️ Configuration - TOML file with an embedded default
//
// Search order:
// 1. $SME_ANALYTICS_CONFIG
// 2. ./config.toml
// 3. Embedded DEFAULT_CONFIG

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "SME_ANALYTICS_CONFIG";

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
bind = "0.0.0.0:3000"

[data]
source = "static"
path = "data/dashboard.json"

[data.status_matrix]
mode = "literal"
seed = 42

[logging]
filter = "info"
"#;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DataConfig {
    pub source: SourceKind,

    /// JSON document used when `source = "json"`
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub status_matrix: MatrixConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Static,
    Json,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MatrixConfig {
    pub mode: MatrixMode,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        MatrixConfig {
            mode: MatrixMode::Literal,
            seed: default_seed(),
        }
    }
}

fn default_seed() -> u64 {
    42
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatrixMode {
    Literal,
    Seeded,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                bind: "0.0.0.0:3000".to_string(),
            },
            data: DataConfig {
                source: SourceKind::Static,
                path: Some(PathBuf::from("data/dashboard.json")),
                status_matrix: MatrixConfig::default(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

/// Parse a TOML document into a Config
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).context("Invalid configuration TOML")
}

/// Load configuration from a specific file
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&contents)
}

/// Load configuration using the search order described above
pub fn load_config() -> Result<Config> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return load_config_from(Path::new(&path));
    }

    let local = Path::new("config.toml");
    if local.exists() {
        return load_config_from(local);
    }

    parse_config(DEFAULT_CONFIG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.data.source, SourceKind::Static);
        assert_eq!(config.data.status_matrix.mode, MatrixMode::Literal);
    }

    #[test]
    fn test_seeded_json_config() {
        let config = parse_config(
            r#"
            [server]
            bind = "127.0.0.1:8080"

            [data]
            source = "json"
            path = "/tmp/feed.json"

            [data.status_matrix]
            mode = "seeded"
            "#,
        )
        .unwrap();

        assert_eq!(config.data.source, SourceKind::Json);
        assert_eq!(config.data.path, Some(PathBuf::from("/tmp/feed.json")));
        assert_eq!(config.data.status_matrix.mode, MatrixMode::Seeded);
        assert_eq!(config.data.status_matrix.seed, 42);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let result = parse_config(
            r#"
            [server]
            bind = "x"
            [data]
            source = "postgres"
            "#,
        );
        assert!(result.is_err());
    }
}
