//! Line-oriented parser for multipart batch responses.
//!
//! The server returns sub-responses in the same order as the serialized
//! sub-requests, so the parser walks the lines once and binds each parsed
//! status/body pair to the next unconsumed request. The body heuristic is
//! deliberate: the first line starting with `{` after a status line is the
//! whole body. Multi-line or top-level-array bodies are out of contract.

use crate::error::{BatchError, Result};
use crate::request::BatchRequest;

const STATUS_PREFIX: &str = "HTTP/1.1 ";

/// Bind the sub-responses in `body` to `requests`, which must be the same
/// sequence (insertion order) that was framed.
pub fn apply_response(body: &str, requests: &mut [&mut BatchRequest]) -> Result<()> {
    let mut next = 0usize;
    let mut pending_status: Option<u16> = None;

    for line in body.lines() {
        if let Some(tail) = line.strip_prefix(STATUS_PREFIX) {
            let status = parse_status(line, tail)?;
            if status == 204 {
                // No content follows; the empty body is the response.
                take_next(requests, &mut next)?.attach_response(String::new(), status);
                pending_status = None;
            } else {
                pending_status = Some(status);
            }
        } else if line.starts_with('{') {
            if let Some(status) = pending_status.take() {
                let request = take_next(requests, &mut next)?;
                if (200..300).contains(&status) {
                    request.attach_response(line.to_string(), status);
                } else {
                    return Err(BatchError::sub_request(
                        request.primary().url.clone(),
                        status,
                        line,
                    ));
                }
            }
        }
    }

    Ok(())
}

fn parse_status(line: &str, tail: &str) -> Result<u16> {
    tail.get(..3)
        .and_then(|digits| digits.parse::<u16>().ok())
        .ok_or_else(|| BatchError::malformed(format!("cannot parse status line '{line}'")))
}

fn take_next<'a, 'b>(
    requests: &'a mut [&'b mut BatchRequest],
    next: &mut usize,
) -> Result<&'a mut BatchRequest> {
    let idx = *next;
    *next += 1;
    match requests.get_mut(idx) {
        Some(request) => Ok(&mut **request),
        None => Err(BatchError::malformed(
            "server returned more sub-responses than sub-requests",
        )),
    }
}
