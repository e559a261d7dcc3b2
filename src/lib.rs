//! Catena is a client-side HTTP request pipeline: it turns a logical request
//! into bytes for a transport and a byte stream back into a logical
//! response, letting cross-cutting concerns (authentication, logging, retry,
//! multipart encoding, progress reporting) compose as interceptors without
//! each one re-implementing I/O. The concrete socket/TLS transport stays an
//! external collaborator behind the [`Transport`] trait.
//!
//! # Quick Start
//!
//! ```rust
//! use catena::{Dispatcher, Request, Response, Result, Transport};
//! use catena::retry::RetryPolicy;
//! use catena::validate::StatusValidator;
//! use async_trait::async_trait;
//! use http::{StatusCode, Uri};
//!
//! struct AlwaysOk;
//!
//! #[async_trait]
//! impl Transport for AlwaysOk {
//!     async fn send(&self, _request: Request) -> Result<Response> {
//!         Ok(Response::new(StatusCode::OK))
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let dispatcher = Dispatcher::builder(AlwaysOk)
//!     .interceptor(RetryPolicy::new())
//!     .interceptor(StatusValidator::new())
//!     .build();
//!
//! let response = dispatcher
//!     .send(Request::get(Uri::from_static("https://example.com/data")))
//!     .await?;
//! assert_eq!(response.status(), StatusCode::OK);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`body`] - Lazy, possibly-replayable byte streams and bounded collection
//! - [`dispatch`] - The interceptor chain, dispatcher, and transport contract
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`multipart`] - multipart/form-data assembly with a memory-vs-disk strategy
//! - [`progress`] - Per-chunk cumulative progress reporting
//! - [`retry`] - Failure classification and exponential-backoff replay
//! - [`validate`] - Response status validation

pub mod body;
pub mod dispatch;
pub mod error;
pub mod multipart;
pub mod progress;
pub mod request;
pub mod response;
pub mod retry;
pub mod validate;

pub use body::{ByteStream, IterationMode, Length};
pub use dispatch::{Dispatcher, DispatcherBuilder, Interceptor, Next, Transport};
pub use error::{EncodingError, Error, RequestFailure, Result, TransportErrorCode};
pub use multipart::{MultipartForm, DEFAULT_MEMORY_THRESHOLD};
pub use progress::{Progress, ProgressCallback};
pub use request::Request;
pub use response::Response;
pub use retry::RetryPolicy;
pub use validate::StatusValidator;
