//! Response status validation.
//!
//! [`StatusValidator`] is an interceptor that rejects responses whose status
//! falls outside the acceptable set. Rejection collects the response body
//! (bounded) and surfaces it inside [`Error::UnacceptableStatus`] so callers
//! and the retry layer can inspect what the server said.
//!
//! [`Error::UnacceptableStatus`]: crate::Error::UnacceptableStatus

use crate::dispatch::{Interceptor, Next};
use crate::error::{Error, Result};
use crate::request::Request;
use crate::response::Response;

use async_trait::async_trait;
use std::ops::RangeInclusive;

/// How much of a rejected response body is kept for inspection.
const ERROR_BODY_CEILING: u64 = 1024 * 1024;

/// Rejects responses whose status is outside the acceptable ranges.
///
/// Defaults to accepting `200..=299`.
#[derive(Debug, Clone)]
pub struct StatusValidator {
    acceptable: Vec<RangeInclusive<u16>>,
}

impl StatusValidator {
    /// Creates a validator accepting the 2xx class.
    pub fn new() -> Self {
        Self {
            acceptable: vec![200..=299],
        }
    }

    /// Replaces the acceptable status ranges.
    pub fn acceptable(mut self, ranges: impl IntoIterator<Item = RangeInclusive<u16>>) -> Self {
        self.acceptable = ranges.into_iter().collect();
        self
    }

    fn accepts(&self, status: u16) -> bool {
        self.acceptable.iter().any(|range| range.contains(&status))
    }
}

impl Default for StatusValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interceptor for StatusValidator {
    fn name(&self) -> &str {
        "status-validator"
    }

    async fn intercept(&self, request: Request, next: Next<'_>) -> Result<Response> {
        let mut response = next.run(request).await?;
        let status = response.status();
        if self.accepts(status.as_u16()) {
            return Ok(response);
        }
        tracing::debug!(%status, "response status rejected by validation policy");
        let body = match response.take_body() {
            Some(mut body) => match body.collect(ERROR_BODY_CEILING).await {
                Ok(body) => Some(body),
                Err(err) => {
                    tracing::debug!(error = %err, "could not collect rejected response body");
                    None
                }
            },
            None => None,
        };
        Err(Error::UnacceptableStatus { status, body })
    }
}
