// ops2batch-config - Unified configuration for the batch client
//
// Supports configuration from multiple sources:
// 1. Environment variables (OPS2BATCH_* prefix, highest priority)
// 2. Config file path from OPS2BATCH_CONFIG
// 3. Default config file location (./ops2batch.toml)
// 4. Built-in defaults (lowest priority)

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod sources;
mod validation;

pub use sources::{load_config, load_from_file_path, EnvSource, ENV_PREFIX};

/// Main runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            graph: GraphConfig::default(),
            http: HttpConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        validation::validate_config(self)
    }

    /// Overlay non-default values from `other` onto `self`.
    pub fn merge(&mut self, other: RuntimeConfig) {
        let defaults = RuntimeConfig::default();
        if other.graph.base_url != defaults.graph.base_url {
            self.graph.base_url = other.graph.base_url;
        }
        if other.graph.version != defaults.graph.version {
            self.graph.version = other.graph.version;
        }
        if other.http.timeout_secs != defaults.http.timeout_secs {
            self.http.timeout_secs = other.http.timeout_secs;
        }
        if other.http.user_agent != defaults.http.user_agent {
            self.http.user_agent = other.http.user_agent;
        }
        if other.log.level != defaults.log.level {
            self.log.level = other.log.level;
        }
        if other.log.format != defaults.log.format {
            self.log.format = other.log.format;
        }
    }
}

/// Graph endpoint family configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Base URI of the Graph endpoint family.
    pub base_url: String,
    /// API version segment of the batch endpoint.
    #[serde(default = "default_graph_version")]
    pub version: String,
}

fn default_graph_version() -> String {
    "beta".to_string()
}

impl GraphConfig {
    /// Absolute URL of the Graph batch endpoint.
    pub fn batch_endpoint(&self) -> String {
        format!(
            "{}/{}/$batch",
            self.base_url.trim_end_matches('/'),
            self.version
        )
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: "https://graph.microsoft.com".to_string(),
            version: default_graph_version(),
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    concat!("ops2batch/", env!("CARGO_PKG_VERSION")).to_string()
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: default_user_agent(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = RuntimeConfig::default();
        assert_eq!(
            config.graph.batch_endpoint(),
            "https://graph.microsoft.com/beta/$batch"
        );
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
        assert_eq!(config.log.format, LogFormat::Text);
        config.validate().unwrap();
    }

    #[test]
    fn batch_endpoint_tolerates_trailing_slash() {
        let graph = GraphConfig {
            base_url: "https://graph.example.com/".to_string(),
            version: "v1.0".to_string(),
        };
        assert_eq!(
            graph.batch_endpoint(),
            "https://graph.example.com/v1.0/$batch"
        );
    }

    #[test]
    fn merge_overlays_non_default_values() {
        let mut base = RuntimeConfig::default();
        let mut other = RuntimeConfig::default();
        other.graph.version = "v1.0".to_string();
        other.http.timeout_secs = 5;
        base.merge(other);
        assert_eq!(base.graph.version, "v1.0");
        assert_eq!(base.http.timeout_secs, 5);
        // untouched fields keep their defaults
        assert_eq!(base.graph.base_url, "https://graph.microsoft.com");
    }

    #[test]
    fn parses_from_toml() {
        let toml = r#"
            [graph]
            base_url = "https://graph.example.com"
            version = "v1.0"

            [log]
            level = "debug"
            format = "json"
        "#;
        let config: RuntimeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.graph.base_url, "https://graph.example.com");
        assert_eq!(config.log.format, LogFormat::Json);
        // http section omitted entirely
        assert_eq!(config.http.timeout_secs, 30);
    }
}
