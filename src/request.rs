//! The logical request pushed through the pipeline.
//!
//! A [`Request`] pairs an HTTP method and target with header fields and an
//! optional [`ByteStream`] body. Construction is builder-style:
//!
//! ```rust
//! use catena::{body::ByteStream, Request};
//! use http::header::CONTENT_TYPE;
//! use http::{HeaderValue, Uri};
//!
//! let request = Request::post(Uri::from_static("https://example.com/upload"))
//!     .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
//!     .body(ByteStream::from_bytes("payload"));
//! assert!(request.has_body());
//! ```
//!
//! [`ByteStream`]: crate::body::ByteStream

use crate::body::ByteStream;
use crate::error::Result;

use http::header::IntoHeaderName;
use http::{HeaderMap, HeaderValue, Method, Uri};

/// A logical HTTP request: method, target, headers, optional body.
#[derive(Debug)]
pub struct Request {
    method: Method,
    target: Uri,
    headers: HeaderMap,
    body: Option<ByteStream>,
}

impl Request {
    /// Creates a request with the given method and target and no body.
    pub fn new(method: Method, target: Uri) -> Self {
        Self {
            method,
            target,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Convenience constructor for a GET request.
    pub fn get(target: Uri) -> Self {
        Self::new(Method::GET, target)
    }

    /// Convenience constructor for a POST request.
    pub fn post(target: Uri) -> Self {
        Self::new(Method::POST, target)
    }

    /// Convenience constructor for a PUT request.
    pub fn put(target: Uri) -> Self {
        Self::new(Method::PUT, target)
    }

    /// Convenience constructor for a DELETE request.
    pub fn delete(target: Uri) -> Self {
        Self::new(Method::DELETE, target)
    }

    /// Appends a header field. Names compare case-insensitively; appending
    /// an existing name replaces its value.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attaches a body.
    pub fn body(mut self, body: ByteStream) -> Self {
        self.body = Some(body);
        self
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target.
    pub fn target(&self) -> &Uri {
        &self.target
    }

    /// The header fields.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the header fields, for interceptors that decorate
    /// the request on its way down the chain.
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

    /// Replaces the body, returning the previous one. Interceptors use this
    /// to substitute or wrap a body before calling the rest of the chain.
    pub fn replace_body(&mut self, body: ByteStream) -> Option<ByteStream> {
        self.body.replace(body)
    }

    /// Duplicates the request for replay.
    ///
    /// Succeeds when the request has no body or a `Multiple`-mode body;
    /// fails with [`crate::Error::StreamConsumed`] otherwise. The retry
    /// layer uses this before every additional attempt.
    pub fn try_clone(&self) -> Result<Request> {
        let body = match &self.body {
            Some(body) => Some(body.try_clone()?),
            None => None,
        };
        Ok(Request {
            method: self.method.clone(),
            target: self.target.clone(),
            headers: self.headers.clone(),
            body,
        })
    }
}
