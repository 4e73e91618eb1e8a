//! Configuration validation
//!
//! Validates that required fields are present and values are sensible.

use anyhow::{bail, Result};
use tracing::warn;

use crate::{GraphConfig, HttpConfig, RuntimeConfig};

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_graph_config(&config.graph)?;
    validate_http_config(&config.http)?;
    Ok(())
}

fn validate_graph_config(config: &GraphConfig) -> Result<()> {
    if config.base_url.is_empty() {
        bail!("graph.base_url must not be empty");
    }

    if !config.base_url.starts_with("https://") && !config.base_url.starts_with("http://") {
        bail!(
            "graph.base_url must be an absolute http(s) URL, got '{}'",
            config.base_url
        );
    }

    if config.version.is_empty() {
        bail!("graph.version must not be empty");
    }

    if config.version != "beta" && config.version != "v1.0" {
        warn!(
            version = %config.version,
            "graph.version is neither 'beta' nor 'v1.0'; batch endpoint may not exist"
        );
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<()> {
    if config.timeout_secs == 0 {
        bail!("http.timeout_secs must be greater than 0");
    }

    if config.timeout_secs > 600 {
        warn!(
            timeout_secs = config.timeout_secs,
            "http.timeout_secs is very large; slow batches will hold connections open"
        );
    }

    if config.user_agent.is_empty() {
        bail!("http.user_agent must not be empty");
    }

    Ok(())
}
