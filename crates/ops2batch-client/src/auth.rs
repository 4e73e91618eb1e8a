//! Authentication seam.
//!
//! The provider mutates the outbound request in place; the engine never
//! sees credentials. Authentication failures surface as transport
//! failures.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use ops2batch_core::BatchError;

use crate::http::BatchHttpRequest;

#[async_trait]
pub trait AuthenticationProvider: Send + Sync {
    /// Add credentials for `target` to the outbound request.
    async fn authenticate(
        &self,
        target: &str,
        request: &mut BatchHttpRequest,
        cancel: &CancellationToken,
    ) -> Result<(), BatchError>;
}

/// Provider that attaches a fixed bearer token.
///
/// Suited to tests and short-lived tooling; long-running callers implement
/// [`AuthenticationProvider`] against their token source so refresh happens
/// per call.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AuthenticationProvider for StaticTokenProvider {
    async fn authenticate(
        &self,
        _target: &str,
        request: &mut BatchHttpRequest,
        cancel: &CancellationToken,
    ) -> Result<(), BatchError> {
        if cancel.is_cancelled() {
            return Err(BatchError::Cancelled);
        }
        request.header("Authorization", format!("Bearer {}", self.token));
        Ok(())
    }
}
