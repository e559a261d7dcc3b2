//! Failure classification and replay with exponential backoff.
//!
//! [`RetryPolicy`] is an interceptor: attempt 0 runs the rest of the chain,
//! and a failed attempt is replayed while the attempt count is within the
//! retry limit, the request method is in the retryable set, and the outcome
//! is a retryable status code or a retryable transport error. The delay
//! before attempt `n + 1` is `backoff_base^n * backoff_scale` seconds.
//!
//! Replay goes through [`Request::try_clone`], so it is only possible when
//! the request body is absent or `Multiple`-mode; the policy never converts
//! body modes, and a non-replayable body simply ends the retry loop with the
//! original failure. Attempt counters are local to each `send` call, so
//! concurrent sends through one policy instance never interfere.
//!
//! # Examples
//!
//! ```rust
//! use catena::retry::RetryPolicy;
//! use http::Method;
//!
//! let policy = RetryPolicy::new()
//!     .retry_limit(4)
//!     .backoff_scale(0.25)
//!     .retryable_methods([Method::GET, Method::HEAD]);
//! ```
//!
//! [`Request::try_clone`]: crate::Request::try_clone

use crate::dispatch::{Interceptor, Next};
use crate::error::{Error, Result, TransportErrorCode};
use crate::request::Request;
use crate::response::Response;

use async_trait::async_trait;
use http::Method;
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

/// Classifies failures and replays the chain with exponential backoff.
///
/// All configuration is immutable after construction.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    retry_limit: u32,
    backoff_base: u32,
    backoff_scale: f64,
    retryable_methods: HashSet<Method>,
    retryable_status_codes: BTreeSet<u16>,
    retryable_error_codes: BTreeSet<TransportErrorCode>,
}

impl RetryPolicy {
    /// Creates a policy with the default configuration: 2 additional
    /// attempts, base 2 backoff scaled by 0.5 seconds, idempotent-leaning
    /// methods, and transient status and transport error classes.
    pub fn new() -> Self {
        Self {
            retry_limit: 2,
            backoff_base: 2,
            backoff_scale: 0.5,
            retryable_methods: default_retryable_methods(),
            retryable_status_codes: default_retryable_status_codes(),
            retryable_error_codes: default_retryable_error_codes(),
        }
    }

    /// Maximum number of additional attempts after the initial one.
    pub fn retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    /// Exponential backoff base. Clamped to at least 2.
    pub fn backoff_base(mut self, backoff_base: u32) -> Self {
        self.backoff_base = backoff_base.max(2);
        self
    }

    /// Backoff scale factor in seconds.
    pub fn backoff_scale(mut self, backoff_scale: f64) -> Self {
        self.backoff_scale = backoff_scale;
        self
    }

    /// Replaces the retryable HTTP method set.
    pub fn retryable_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.retryable_methods = methods.into_iter().collect();
        self
    }

    /// Replaces the retryable HTTP status code set.
    pub fn retryable_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_status_codes = codes.into_iter().collect();
        self
    }

    /// Replaces the retryable transport error code set.
    pub fn retryable_error_codes(
        mut self,
        codes: impl IntoIterator<Item = TransportErrorCode>,
    ) -> Self {
        self.retryable_error_codes = codes.into_iter().collect();
        self
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = (self.backoff_base as f64).powi(attempt as i32);
        Duration::from_secs_f64(factor * self.backoff_scale)
    }

    fn is_retryable_outcome(&self, outcome: &Result<Response>) -> bool {
        match outcome {
            Ok(response) => self
                .retryable_status_codes
                .contains(&response.status().as_u16()),
            Err(err) => match err.root() {
                Error::Transport { code, .. } => self.retryable_error_codes.contains(code),
                Error::UnacceptableStatus { status, .. } => {
                    self.retryable_status_codes.contains(&status.as_u16())
                }
                // Cancellation and everything else (encoding, consumption,
                // oversized bodies) is not transient.
                _ => false,
            },
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interceptor for RetryPolicy {
    fn name(&self) -> &str {
        "retry"
    }

    async fn intercept(&self, request: Request, next: Next<'_>) -> Result<Response> {
        if !self.retryable_methods.contains(request.method()) {
            return next.run(request).await;
        }

        // Attempt state is stack-local: concurrent sends never share it.
        let mut attempt: u32 = 0;
        let mut request = request;
        loop {
            let replay = request.try_clone();
            let outcome = next.run(request).await;

            if attempt >= self.retry_limit || !self.is_retryable_outcome(&outcome) {
                return outcome;
            }
            // A non-replayable body is a caller error; surface the original
            // outcome rather than converting the body mode.
            let fresh = match replay {
                Ok(fresh) => fresh,
                Err(_) => return outcome,
            };

            let delay = self.backoff_delay(attempt);
            attempt += 1;
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "retrying request after transient failure"
            );
            tokio::time::sleep(delay).await;
            request = fresh;
        }
    }
}

fn default_retryable_methods() -> HashSet<Method> {
    [
        Method::GET,
        Method::HEAD,
        Method::OPTIONS,
        Method::PUT,
        Method::DELETE,
        Method::TRACE,
    ]
    .into_iter()
    .collect()
}

fn default_retryable_status_codes() -> BTreeSet<u16> {
    [408_u16, 500, 502, 503, 504].into_iter().collect()
}

fn default_retryable_error_codes() -> BTreeSet<TransportErrorCode> {
    [
        TransportErrorCode::ConnectionRefused,
        TransportErrorCode::ConnectionReset,
        TransportErrorCode::DnsFailure,
        TransportErrorCode::Timeout,
        TransportErrorCode::TlsHandshake,
    ]
    .into_iter()
    .collect()
}
