//! JSON-to-model mapping seam.

use async_trait::async_trait;

use ops2batch_core::{BatchError, BatchRequest};

/// Populates a request's bound domain model from its response JSON.
///
/// Implementations read `request.response_json()`, apply the request's
/// `from_json_casting` transform when present, and write the result into
/// the model behind `request.model()`. The engine invokes the helper only
/// for requests that came back with a non-empty body, and runs the
/// request's `post_mapping_json` hook afterwards.
#[async_trait]
pub trait JsonMappingHelper: Send + Sync {
    async fn map(&self, request: &BatchRequest) -> Result<(), BatchError>;
}
