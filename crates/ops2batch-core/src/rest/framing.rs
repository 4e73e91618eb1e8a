//! MIME multipart serialization of a REST sub-batch.
//!
//! The payload is built by direct string writing into a pre-allocated
//! buffer. GET operations are plain `application/http` parts; mutations
//! wrap a single-request changeset so the server routes them through its
//! write pipeline. Line endings are CRLF throughout (servers tolerate LF
//! as well).

use uuid::Uuid;

use crate::request::{BatchRequest, HttpMethod};

const CRLF: &str = "\r\n";
const ODATA_VERBOSE: &str = "application/json;odata=verbose";

/// A framed multipart body plus the Content-Type header that names its
/// boundary.
#[derive(Debug, Clone)]
pub struct MultipartPayload {
    pub content_type: String,
    pub body: String,
}

/// Serialize `requests` (one per-site group, ascending order) into a
/// multipart body bounded by `batch_{batch_id}`.
pub fn frame_multipart(batch_id: Uuid, requests: &[&BatchRequest]) -> MultipartPayload {
    let boundary = format!("batch_{batch_id}");
    let mut buf = String::with_capacity(requests.len() * 256);

    for request in requests {
        buf.push_str("--");
        buf.push_str(&boundary);
        buf.push_str(CRLF);
        match request.method() {
            HttpMethod::Get => write_get_part(&mut buf, request),
            HttpMethod::Post | HttpMethod::Patch | HttpMethod::Delete => {
                write_changeset_part(&mut buf, request)
            }
        }
    }

    buf.push_str("--");
    buf.push_str(&boundary);
    buf.push_str("--");
    buf.push_str(CRLF);

    MultipartPayload {
        content_type: format!("multipart/mixed; boundary={boundary}"),
        body: buf,
    }
}

fn write_get_part(buf: &mut String, request: &BatchRequest) {
    buf.push_str("Content-Type: application/http");
    buf.push_str(CRLF);
    buf.push_str("Content-Transfer-Encoding: binary");
    buf.push_str(CRLF);
    buf.push_str(CRLF);
    buf.push_str("GET ");
    buf.push_str(&request.primary().url);
    buf.push_str(" HTTP/1.1");
    buf.push_str(CRLF);
    buf.push_str("Accept: ");
    buf.push_str(ODATA_VERBOSE);
    buf.push_str(CRLF);
    buf.push_str(CRLF);
}

/// A mutation rides inside its own single-request changeset. DELETE is
/// framed the same way minus the body and its length/type headers.
fn write_changeset_part(buf: &mut String, request: &BatchRequest) {
    let changeset = format!("changeset_{}", Uuid::new_v4());
    buf.push_str("Content-Type: multipart/mixed; boundary=");
    buf.push_str(&changeset);
    buf.push_str(CRLF);
    buf.push_str(CRLF);

    buf.push_str("--");
    buf.push_str(&changeset);
    buf.push_str(CRLF);
    buf.push_str("Content-Type: application/http");
    buf.push_str(CRLF);
    buf.push_str("Content-Transfer-Encoding: binary");
    buf.push_str(CRLF);
    buf.push_str(CRLF);

    buf.push_str(request.method().as_str());
    buf.push(' ');
    buf.push_str(&request.primary().url);
    buf.push_str(" HTTP/1.1");
    buf.push_str(CRLF);
    buf.push_str("Accept: ");
    buf.push_str(ODATA_VERBOSE);
    buf.push_str(CRLF);
    if let Some(body) = request.primary().body.as_deref() {
        buf.push_str("Content-Type: ");
        buf.push_str(ODATA_VERBOSE);
        buf.push_str(CRLF);
        buf.push_str(&format!("Content-Length: {}", body.len()));
        buf.push_str(CRLF);
    }
    buf.push_str("If-Match: *");
    buf.push_str(CRLF);
    buf.push_str(CRLF);
    if let Some(body) = request.primary().body.as_deref() {
        buf.push_str(body);
        buf.push_str(CRLF);
    }

    buf.push_str("--");
    buf.push_str(&changeset);
    buf.push_str("--");
    buf.push_str(CRLF);
}
