//! The interceptor contract and the `Next` continuation.
//!
//! Interceptors are invoked in registration order on the way down; each one
//! receives the request and a [`Next`] value representing the rest of the
//! chain, terminated by the transport call. Control returns in exactly the
//! reverse order, producing the classic before/after nesting:
//! `1-before, 2-before, transport, 2-after, 1-after`.
//!
//! An interceptor may mutate the request before calling `next`, substitute
//! or wrap its body, inspect or replace the response after `next` returns,
//! short-circuit by returning a response without calling `next`, or catch an
//! error from `next` and recover or rethrow.

use crate::dispatch::transport::Transport;
use crate::error::{Error, RequestFailure, Result};
use crate::request::Request;
use crate::response::Response;

use async_trait::async_trait;
use http::{Method, Uri};
use std::sync::Arc;

/// A composable wrapper around the terminal transport call.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Identity used in diagnostics when this interceptor fails.
    fn name(&self) -> &str {
        "interceptor"
    }

    /// Processes `request`, calling `next` zero or one times to run the rest
    /// of the chain.
    async fn intercept(&self, request: Request, next: Next<'_>) -> Result<Response>;
}

/// The continuation representing the remainder of the chain, ending in the
/// transport call.
///
/// `Next` is cheap to clone; an interceptor that needs to run the downstream
/// chain more than once (the retry layer does) clones it per attempt.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    transport: &'a dyn Transport,
    interceptors: &'a [Arc<dyn Interceptor>],
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        transport: &'a dyn Transport,
        interceptors: &'a [Arc<dyn Interceptor>],
    ) -> Self {
        Self {
            transport,
            interceptors,
        }
    }

    /// Runs the remainder of the chain with `request`.
    pub async fn run(self, request: Request) -> Result<Response> {
        let method = request.method().clone();
        let target = request.target().clone();
        let had_body = request.has_body();
        match self.interceptors.split_first() {
            Some((head, rest)) => {
                let next = Next::new(self.transport, rest);
                head.intercept(request, next).await.map_err(|err| {
                    let cause = format!("interceptor \"{}\" failed", head.name());
                    wrap_failure(err, method, target, had_body, cause)
                })
            }
            None => {
                tracing::debug!(%method, %target, "terminal transport call");
                self.transport.send(request).await.map_err(|err| {
                    wrap_failure(err, method, target, had_body, "transport call failed".into())
                })
            }
        }
    }
}

/// Wraps `err` into the composite dispatch envelope, unless it already
/// carries one. The innermost wrap wins so the original context survives
/// nested calls.
pub(crate) fn wrap_failure(
    err: Error,
    method: Method,
    target: Uri,
    had_request_body: bool,
    cause: String,
) -> Error {
    if matches!(err, Error::Request(_)) {
        return err;
    }
    let status = match &err {
        Error::UnacceptableStatus { status, .. } => Some(*status),
        _ => None,
    };
    Error::Request(Box::new(RequestFailure {
        method,
        target,
        had_request_body,
        status,
        cause,
        source: err,
    }))
}
