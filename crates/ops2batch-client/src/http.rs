//! Transport abstraction for the two endpoint families.
//!
//! Both families speak the same shape on the wire: one POST with a framed
//! body, one response with a status and a text body. The client is generic
//! over two [`Transport`] instances so tests and alternative runtimes can
//! swap the HTTP stack without touching dispatch logic.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use ops2batch_core::BatchError;

/// An outbound batch HTTP call, mutated in place by the authentication
/// provider before it is sent.
#[derive(Debug, Clone)]
pub struct BatchHttpRequest {
    pub method: String,
    pub url: String,
    /// Request headers as (name, value) pairs
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl BatchHttpRequest {
    /// A POST carrying a framed batch payload.
    pub fn post(url: impl Into<String>, content_type: impl Into<String>, body: String) -> Self {
        Self {
            method: "POST".to_string(),
            url: url.into(),
            headers: vec![("Content-Type".to_string(), content_type.into())],
            body,
        }
    }

    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Get a header value by name (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP response from a batch endpoint
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Response headers (name, value pairs)
    pub headers: Vec<(String, String)>,
    /// Response body text
    pub body: String,
}

impl HttpResponse {
    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Get a header value by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// One endpoint family's HTTP stack.
///
/// Implementations must be safe for concurrent use; multiple logical
/// sessions may share one transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the request, honoring `cancel`.
    async fn send(
        &self,
        request: &BatchHttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, BatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_sets_method_and_content_type() {
        let request = BatchHttpRequest::post(
            "https://host/sites/a/_api/$batch",
            "multipart/mixed; boundary=batch_x",
            "--batch_x--".to_string(),
        );
        assert_eq!(request.method, "POST");
        assert_eq!(
            request.header_value("content-type"),
            Some("multipart/mixed; boundary=batch_x")
        );
    }

    #[test]
    fn response_success_range() {
        let ok = HttpResponse {
            status: 299,
            headers: vec![],
            body: String::new(),
        };
        assert!(ok.is_success());

        let not_ok = HttpResponse {
            status: 302,
            headers: vec![],
            body: String::new(),
        };
        assert!(!not_ok.is_success());
    }
}
