//! Error handling for the catena pipeline.
//!
//! This module provides centralized error handling for everything that can go
//! wrong between building a request and receiving a response: stream
//! consumption bugs, oversized bodies, multipart encoding failures, transport
//! failures, and interceptor failures. All errors implement the standard
//! `Error` trait and chain their sources for diagnostics.

use bytes::Bytes;
use http::{Method, StatusCode, Uri};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of low-level failures reported by the terminal transport.
///
/// The retry layer treats the connection/DNS/timeout/transient-TLS class as
/// retryable by default; malformed requests, certificate trust failures, and
/// cancellation are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransportErrorCode {
    /// The remote end refused the connection.
    ConnectionRefused,
    /// The connection was reset or closed mid-exchange.
    ConnectionReset,
    /// Host name resolution failed.
    DnsFailure,
    /// The exchange did not complete within the transport's deadline.
    Timeout,
    /// The TLS handshake failed for a transient reason.
    TlsHandshake,
    /// The request could not be serialized onto the wire.
    MalformedRequest,
    /// The peer's certificate chain is not trusted.
    CertificateTrust,
    /// The enclosing task was cancelled.
    Cancelled,
}

/// Reasons a multipart form could not be encoded.
///
/// These are terminal conditions: they are raised when `encode()` or
/// `write_encoded_data()` runs, never at `append` time, and are never
/// retryable.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// A file-backed part does not resolve to an existing local file.
    #[error("file for part \"{name}\" is not an accessible local file: {path:?}")]
    PartFileUnreadable {
        /// Name of the offending part.
        name: String,
        /// Path the part referenced.
        path: PathBuf,
    },

    /// The destination of `write_encoded_data` already exists.
    #[error("destination already exists: {path:?}")]
    DestinationExists {
        /// Path that was refused.
        path: PathBuf,
    },
}

/// Context captured when a dispatch fails, wrapped around the original error.
///
/// The dispatcher builds exactly one of these per failed `send`; errors that
/// already carry a `RequestFailure` pass through unwrapped so the innermost
/// context survives.
#[derive(Debug, Error)]
#[error("{cause}")]
pub struct RequestFailure {
    /// Method of the failed request.
    pub method: Method,
    /// Target the request was sent to.
    pub target: Uri,
    /// Whether the request carried a body when it failed.
    pub had_request_body: bool,
    /// Response status, when a response was obtained before the failure.
    pub status: Option<StatusCode>,
    /// Human-readable description of where the failure originated. Names the
    /// failing interceptor when one failed, otherwise the transport.
    pub cause: String,
    /// The original error.
    #[source]
    pub source: Error,
}

/// Errors that can happen when using catena.
#[derive(Debug, Error)]
pub enum Error {
    /// A `Single`-mode byte stream was iterated more than once.
    #[error("stream already consumed")]
    StreamConsumed,

    /// Collecting a body exceeded the caller's byte ceiling.
    #[error("body exceeded the maximum of {limit} bytes")]
    BodyTooLarge {
        /// The ceiling that was exceeded.
        limit: u64,
    },

    /// Multipart encoding failed.
    #[error("multipart encoding failed")]
    Encoding(#[from] EncodingError),

    /// The terminal transport reported a failure.
    #[error("transport error ({code:?}): {message}")]
    Transport {
        /// Classification used by the retry layer.
        code: TransportErrorCode,
        /// Description reported by the transport.
        message: String,
        /// The transport's own error, when it has one.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A status-validation policy rejected the response status.
    #[error("unacceptable status code: {status}")]
    UnacceptableStatus {
        /// The rejected status.
        status: StatusCode,
        /// The response body, collected for inspection.
        body: Option<Bytes>,
    },

    /// The enclosing task was cancelled. Never retryable.
    #[error("request cancelled")]
    Cancelled,

    /// I/O error while streaming a body or writing an encoding to disk.
    #[error("I/O error")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Composite envelope: a dispatch failed, with full request context.
    #[error("{} {} failed: {}", .0.method, .0.target, .0.cause)]
    Request(#[source] Box<RequestFailure>),
}

impl Error {
    /// Returns a transport error with the given classification and message.
    pub fn transport(code: TransportErrorCode, message: impl Into<String>) -> Self {
        Error::Transport {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// The dispatch context attached to this error, if it has been wrapped.
    pub fn request_failure(&self) -> Option<&RequestFailure> {
        match self {
            Error::Request(failure) => Some(failure),
            _ => None,
        }
    }

    /// The innermost error, looking through the dispatch envelope.
    pub fn root(&self) -> &Error {
        match self {
            Error::Request(failure) => failure.source.root(),
            other => other,
        }
    }
}

/// Result type alias for operations that can fail with a catena error.
pub type Result<T> = std::result::Result<T, Error>;
