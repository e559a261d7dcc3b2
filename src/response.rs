//! The logical response flowing back through the pipeline.

use crate::body::ByteStream;
use crate::error::Result;

use bytes::Bytes;
use http::header::IntoHeaderName;
use http::{HeaderMap, HeaderValue, StatusCode};

/// A logical HTTP response: status, headers, optional body.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<ByteStream>,
}

impl Response {
    /// Creates a response with the given status and no body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Appends a header field, replacing any existing value for the name.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attaches a body.
    pub fn body(mut self, body: ByteStream) -> Self {
        self.body = Some(body);
        self
    }

    /// The response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The header fields.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the header fields.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Whether a body is attached.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Mutable access to the body, if any.
    pub fn body_mut(&mut self) -> Option<&mut ByteStream> {
        self.body.as_mut()
    }

    /// Removes and returns the body.
    pub fn take_body(&mut self) -> Option<ByteStream> {
        self.body.take()
    }

    /// Collects the body into one buffer, bounded by `max_bytes`.
    ///
    /// A response without a body collects to an empty buffer.
    pub async fn collect_body(&mut self, max_bytes: u64) -> Result<Bytes> {
        match &mut self.body {
            Some(body) => body.collect(max_bytes).await,
            None => Ok(Bytes::new()),
        }
    }
}
