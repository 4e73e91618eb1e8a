//! Error types for the batching engine.
//!
//! One typed sum covers every failure the engine can surface. Sub-request
//! failures are values, not control flow: parsers return them through
//! `Result` and the dispatcher aborts the batch without reconciling.

use thiserror::Error;

/// Errors raised while framing, dispatching or parsing a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Non-2xx at the HTTP envelope level, or a connection-level failure
    /// (`status` is 0 when no response was received). Authentication
    /// failures surface here as well.
    #[error("transport failure for '{url}': HTTP {status}: {body}")]
    Transport {
        url: String,
        status: u16,
        body: String,
    },

    /// Non-2xx on a single sub-response inside an otherwise successful
    /// batch call.
    #[error("sub-request '{url}' failed with HTTP {status}: {body}")]
    SubRequest {
        url: String,
        status: u16,
        body: String,
    },

    /// A batch payload or response that cannot be framed or parsed.
    #[error("malformed batch payload: {reason}")]
    Malformed { reason: String },

    /// The caller's cancellation token fired mid-dispatch.
    #[error("batch execution cancelled")]
    Cancelled,

    /// An operation was attempted in a state that forbids it.
    #[error("precondition violated: {reason}")]
    Precondition { reason: String },

    /// A request body that must be embedded as a raw JSON fragment is not
    /// valid JSON.
    #[error("request body for '{url}' is not valid JSON: {reason}")]
    InvalidBody { url: String, reason: String },
}

impl BatchError {
    pub fn transport(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    pub fn sub_request(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::SubRequest {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::Precondition {
            reason: reason.into(),
        }
    }

    pub fn invalid_body(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBody {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for BatchError
pub type Result<T> = std::result::Result<T, BatchError>;
