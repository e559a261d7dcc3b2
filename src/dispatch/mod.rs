//! The middleware chain and its terminal transport call.
//!
//! A [`Dispatcher`] pushes a request through an ordered list of
//! [`Interceptor`]s and hands it to the terminal [`Transport`], then routes
//! the response back through the chain in reverse order. Interceptors
//! compose around a continuation ([`Next`]) and may mutate the request,
//! substitute bodies, short-circuit, or recover from downstream failures.
//!
//! # Overview
//!
//! - [`transport`] - The external collaborator performing the actual I/O
//! - [`interceptor`] - The interceptor contract and the `Next` continuation
//! - [`dispatcher`] - Chain composition, error wrapping, and the builder
//!
//! # Examples
//!
//! ```rust
//! use catena::dispatch::{Dispatcher, Transport};
//! use catena::{Request, Response, Result};
//! use async_trait::async_trait;
//! use http::{StatusCode, Uri};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Transport for Echo {
//!     async fn send(&self, _request: Request) -> Result<Response> {
//!         Ok(Response::new(StatusCode::OK))
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let dispatcher = Dispatcher::builder(Echo).build();
//! let response = dispatcher
//!     .send(Request::get(Uri::from_static("https://example.com/")))
//!     .await?;
//! assert_eq!(response.status(), StatusCode::OK);
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;
pub mod interceptor;
pub mod transport;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use interceptor::{Interceptor, Next};
pub use transport::Transport;
