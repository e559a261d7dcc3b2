//! The terminal transport contract.
//!
//! The transport is an external collaborator: it owns sockets, TLS, and
//! connection management, none of which live in this crate. The pipeline
//! only requires one asynchronous operation, and expects the transport to
//! report failures as [`Error::Transport`] with a [`TransportErrorCode`]
//! classification so the retry layer can tell transient failures apart from
//! permanent ones.
//!
//! [`Error::Transport`]: crate::Error::Transport
//! [`TransportErrorCode`]: crate::TransportErrorCode

use crate::error::Result;
use crate::request::Request;
use crate::response::Response;

use async_trait::async_trait;
use std::sync::Arc;

/// The external collaborator that actually performs network I/O.
///
/// Implementations must not mutate the request or its body, must be safe to
/// share across concurrent sends, and should surface cancellation as
/// [`crate::Error::Cancelled`] rather than a transport failure.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one request/response exchange.
    async fn send(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: Request) -> Result<Response> {
        (**self).send(request).await
    }
}
