//! Native HTTP transport backed by reqwest.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use anyhow::{Context, Result};
use ops2batch_core::BatchError;
use ops2batch_config::HttpConfig;

use crate::http::{BatchHttpRequest, HttpResponse, Transport};

/// Native transport using reqwest. One instance serves either endpoint
/// family; the client holds two so their tuning can diverge.
pub struct NativeTransport {
    client: reqwest::Client,
    user_agent: String,
}

impl NativeTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create reqwest client")?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Create a transport with a custom reqwest client.
    pub fn with_client(client: reqwest::Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl Transport for NativeTransport {
    async fn send(
        &self,
        request: &BatchHttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, BatchError> {
        if cancel.is_cancelled() {
            return Err(BatchError::Cancelled);
        }

        let method: reqwest::Method = request
            .method
            .parse()
            .map_err(|_| BatchError::transport(&request.url, 0, format!("invalid HTTP method '{}'", request.method)))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if request.header_value("user-agent").is_none() {
            builder = builder.header("User-Agent", &self.user_agent);
        }
        builder = builder.body(request.body.clone());

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(BatchError::Cancelled),
            result = builder.send() => result
                .map_err(|e| BatchError::transport(&request.url, 0, e.to_string()))?,
        };

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(BatchError::Cancelled),
            result = response.text() => result
                .map_err(|e| BatchError::transport(&request.url, status, e.to_string()))?,
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
