//! JSON envelope serialization for Graph batch calls.
//!
//! Request bodies are embedded as raw JSON fragments via
//! `serde_json::value::RawValue`, so a body object lands in the envelope
//! as an object rather than a JSON-encoded string and no placeholder
//! substitution pass is needed.

use serde::Serialize;
use serde_json::value::RawValue;

use crate::error::{BatchError, Result};
use crate::request::BatchRequest;

/// Service limit on sub-requests per Graph batch call. Larger batches are
/// framed as sequential chunks.
pub const MAX_GRAPH_BATCH_SIZE: usize = 20;

#[derive(Serialize)]
struct Envelope<'a> {
    requests: Vec<Item<'a>>,
}

#[derive(Serialize)]
struct Item<'a> {
    id: String,
    method: &'static str,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<ItemHeaders>,
}

#[derive(Serialize)]
struct ItemHeaders {
    #[serde(rename = "Content-Type")]
    content_type: &'static str,
}

/// Frame `requests` into one or more JSON envelopes of at most
/// [`MAX_GRAPH_BATCH_SIZE`] sub-requests each.
///
/// Each sub-request's `id` is its stringified `order + 1`, which is also
/// the key the response parser uses to locate the originating request.
pub fn frame_envelopes(requests: &[&BatchRequest]) -> Result<Vec<String>> {
    let mut envelopes = Vec::with_capacity(requests.len().div_ceil(MAX_GRAPH_BATCH_SIZE));

    for chunk in requests.chunks(MAX_GRAPH_BATCH_SIZE) {
        let bodies = raw_bodies(chunk)?;
        let items: Vec<Item<'_>> = chunk
            .iter()
            .zip(bodies.iter())
            .map(|(request, body)| Item {
                id: (request.order() + 1).to_string(),
                method: request.method().as_str(),
                url: &request.primary().url,
                body: body.as_deref(),
                headers: body.as_ref().map(|_| ItemHeaders {
                    content_type: "application/json",
                }),
            })
            .collect();

        let envelope = serde_json::to_string(&Envelope { requests: items })
            .map_err(|e| BatchError::malformed(format!("cannot serialize batch envelope: {e}")))?;
        envelopes.push(envelope);
    }

    Ok(envelopes)
}

fn raw_bodies(chunk: &[&BatchRequest]) -> Result<Vec<Option<Box<RawValue>>>> {
    chunk
        .iter()
        .map(|request| {
            request
                .primary()
                .body
                .as_ref()
                .map(|body| {
                    RawValue::from_string(body.clone()).map_err(|e| {
                        BatchError::invalid_body(request.primary().url.clone(), e.to_string())
                    })
                })
                .transpose()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Batch;
    use crate::request::{ApiCall, HttpMethod, Operation};

    fn frame(batch: &Batch) -> Result<Vec<String>> {
        let requests: Vec<&BatchRequest> = batch.requests().collect();
        frame_envelopes(&requests)
    }

    #[test]
    fn single_get_produces_the_minimal_envelope() {
        let mut batch = Batch::new();
        batch
            .add(Operation::new(HttpMethod::Get, ApiCall::graph("me/drive/root")))
            .unwrap();

        let envelopes = frame(&batch).unwrap();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(
            envelopes[0],
            r#"{"requests":[{"id":"1","method":"GET","url":"me/drive/root"}]}"#
        );
    }

    #[test]
    fn body_is_embedded_as_raw_json_with_content_type_header() {
        let mut batch = Batch::new();
        batch
            .add(Operation::new(
                HttpMethod::Post,
                ApiCall::graph("me/drive/items").with_body(r#"{"name":"f"}"#),
            ))
            .unwrap();

        let envelopes = frame(&batch).unwrap();
        let value: serde_json::Value = serde_json::from_str(&envelopes[0]).unwrap();
        let request = &value["requests"][0];
        // an object, not a string-encoded object
        assert!(request["body"].is_object());
        assert_eq!(request["body"]["name"], "f");
        assert_eq!(request["headers"]["Content-Type"], "application/json");
    }

    #[test]
    fn invalid_body_json_is_rejected() {
        let mut batch = Batch::new();
        batch
            .add(Operation::new(
                HttpMethod::Post,
                ApiCall::graph("me/drive/items").with_body("{not json"),
            ))
            .unwrap();

        let err = frame(&batch).unwrap_err();
        assert!(matches!(err, BatchError::InvalidBody { .. }));
    }

    #[test]
    fn ids_follow_order_even_after_dedup_gaps() {
        let mut batch = Batch::new();
        batch
            .add(Operation::new(HttpMethod::Get, ApiCall::graph("me")))
            .unwrap();
        batch
            .add(Operation::new(HttpMethod::Get, ApiCall::graph("me/photo")))
            .unwrap();
        batch.remove(0);

        let envelopes = frame(&batch).unwrap();
        let value: serde_json::Value = serde_json::from_str(&envelopes[0]).unwrap();
        assert_eq!(value["requests"][0]["id"], "2");
    }

    #[test]
    fn batches_above_the_service_limit_are_chunked() {
        let mut batch = Batch::new();
        for i in 0..(MAX_GRAPH_BATCH_SIZE + 5) {
            batch
                .add(Operation::new(
                    HttpMethod::Get,
                    ApiCall::graph(format!("items/{i}")),
                ))
                .unwrap();
        }

        let envelopes = frame(&batch).unwrap();
        assert_eq!(envelopes.len(), 2);
        let first: serde_json::Value = serde_json::from_str(&envelopes[0]).unwrap();
        let second: serde_json::Value = serde_json::from_str(&envelopes[1]).unwrap();
        assert_eq!(
            first["requests"].as_array().unwrap().len(),
            MAX_GRAPH_BATCH_SIZE
        );
        assert_eq!(second["requests"].as_array().unwrap().len(), 5);
        assert_eq!(second["requests"][0]["id"], "21");
    }
}
