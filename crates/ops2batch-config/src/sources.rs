//! Configuration source loading.
//!
//! Priority order:
//! 1. Environment variables (`OPS2BATCH_*` prefix)
//! 2. Config file path from `OPS2BATCH_CONFIG`
//! 3. Default config file (`./ops2batch.toml`)
//! 4. Built-in defaults

use std::env;
use std::path::Path;

use anyhow::{Context, Result};

use crate::{LogFormat, RuntimeConfig};

pub const ENV_PREFIX: &str = "OPS2BATCH_";

/// Environment access seam so overrides are testable without touching the
/// process environment.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{ENV_PREFIX}{key}")).ok()
    }
}

/// Load configuration from defaults, config file and environment.
pub fn load_config() -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::default();

    if let Some(file_config) = load_from_file()? {
        config.merge(file_config);
    }

    apply_env_overrides(&mut config, &StdEnvSource)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a specific file path (for a `--config` flag).
pub fn load_from_file_path(path: impl AsRef<Path>) -> Result<RuntimeConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let file_config: RuntimeConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    let mut config = RuntimeConfig::default();
    config.merge(file_config);
    apply_env_overrides(&mut config, &StdEnvSource)?;
    config.validate()?;
    Ok(config)
}

fn load_from_file() -> Result<Option<RuntimeConfig>> {
    if let Ok(path) = env::var("OPS2BATCH_CONFIG") {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: RuntimeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        return Ok(Some(config));
    }

    let default_path = "./ops2batch.toml";
    if Path::new(default_path).exists() {
        let content = std::fs::read_to_string(default_path)
            .with_context(|| format!("Failed to read config file: {default_path}"))?;
        let config: RuntimeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {default_path}"))?;
        return Ok(Some(config));
    }

    Ok(None)
}

fn apply_env_overrides(config: &mut RuntimeConfig, source: &dyn EnvSource) -> Result<()> {
    if let Some(base_url) = source.get("GRAPH_BASE_URL") {
        config.graph.base_url = base_url;
    }
    if let Some(version) = source.get("GRAPH_VERSION") {
        config.graph.version = version;
    }
    if let Some(timeout) = source.get("HTTP_TIMEOUT_SECS") {
        config.http.timeout_secs = timeout
            .parse()
            .with_context(|| format!("{ENV_PREFIX}HTTP_TIMEOUT_SECS is not a number: {timeout}"))?;
    }
    if let Some(user_agent) = source.get("HTTP_USER_AGENT") {
        config.http.user_agent = user_agent;
    }
    if let Some(level) = source.get("LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(format) = source.get("LOG_FORMAT") {
        config.log.format = match format.as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => anyhow::bail!("{ENV_PREFIX}LOG_FORMAT must be 'text' or 'json', got '{other}'"),
        };
    }
    Ok(())
}
