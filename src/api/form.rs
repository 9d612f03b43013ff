//! multipart/form-data encoding for upload bodies
//!
//! The body carries a single `file` field. In-memory payloads are encoded into
//! one buffer; streamed payloads become `prefix ++ stream ++ suffix` so the
//! file content is never buffered.

use crate::transport::{Payload, RequestBody};
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::{self, StreamExt};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Form field carrying the file content
pub const FILE_FIELD: &str = "file";

const BOUNDARY_PREFIX: &str = "----objstore";
const BOUNDARY_RANDOM_LEN: usize = 24;

/// A single-file multipart form
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    filename: String,
    content_type: String,
}

impl MultipartForm {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self::with_boundary(generate_boundary(), filename, content_type)
    }

    pub fn with_boundary(
        boundary: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            boundary: boundary.into(),
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request `Content-Type` header
    pub fn content_type_header(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    fn prefix(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(128 + self.filename.len());
        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"\r\nContent-Disposition: form-data; name=\"");
        buf.put_slice(FILE_FIELD.as_bytes());
        buf.put_slice(b"\"; filename=\"");
        buf.put_slice(escape_quoted(&self.filename).as_bytes());
        buf.put_slice(b"\"\r\nContent-Type: ");
        buf.put_slice(self.content_type.as_bytes());
        buf.put_slice(b"\r\n\r\n");
        buf.freeze()
    }

    fn suffix(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(8 + self.boundary.len());
        buf.put_slice(b"\r\n--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"--\r\n");
        buf.freeze()
    }

    /// Encode the payload into a request body
    pub fn encode(&self, payload: Payload) -> RequestBody {
        let prefix = self.prefix();
        let suffix = self.suffix();
        let framing = (prefix.len() + suffix.len()) as u64;

        match payload {
            Payload::Bytes(data) => {
                let mut buf = BytesMut::with_capacity(prefix.len() + data.len() + suffix.len());
                buf.put_slice(&prefix);
                buf.put_slice(&data);
                buf.put_slice(&suffix);
                RequestBody::Bytes(buf.freeze())
            }
            Payload::Stream { stream: body, length } => {
                let stream = stream::once(async move { Ok(prefix) })
                    .chain(body)
                    .chain(stream::once(async move { Ok(suffix) }))
                    .boxed();
                RequestBody::Stream {
                    stream,
                    length: length.map(|len| len + framing),
                }
            }
        }
    }
}

fn generate_boundary() -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", BOUNDARY_PREFIX, random)
}

/// Escape a value for a quoted header parameter
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
