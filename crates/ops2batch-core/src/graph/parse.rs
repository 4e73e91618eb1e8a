//! Parser for Graph batch response envelopes.

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::batch::Batch;
use crate::error::{BatchError, Result};

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    responses: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    id: String,
    status: u16,
    #[serde(default)]
    body: Option<Box<RawValue>>,
}

/// Deserialize the response envelope and bind each sub-response to the
/// originating request at `order = id - 1`.
pub fn apply_response(body: &str, batch: &mut Batch) -> Result<()> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| BatchError::malformed(format!("cannot deserialize batch envelope: {e}")))?;

    for item in envelope.responses {
        let id: usize = item
            .id
            .parse()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                BatchError::malformed(format!("response id '{}' is not a 1-based index", item.id))
            })?;
        let order = id - 1;
        let request = batch.request_mut(order).ok_or_else(|| {
            BatchError::malformed(format!(
                "response id '{}' does not match a queued request",
                item.id
            ))
        })?;

        let body_text = item
            .body
            .map(|raw| raw.get().to_string())
            .unwrap_or_default();
        if !(200..300).contains(&item.status) {
            return Err(BatchError::sub_request(
                request.primary().url.clone(),
                item.status,
                body_text,
            ));
        }
        request.attach_response(body_text, item.status);
    }

    Ok(())
}
