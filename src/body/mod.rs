//! Lazy byte-stream bodies.
//!
//! This module contains the [`ByteStream`] abstraction used for request and
//! response bodies: a lazily-produced sequence of byte chunks with a declared
//! total-length hint and an explicit replay contract. Bodies may come from
//! memory, disk, or a generator without forcing full materialization.
//!
//! # Overview
//!
//! - [`stream`] - The `ByteStream` type, its sources, and chunk production
//! - [`collect`] - Bounded materialization of a stream into one buffer
//!
//! # Examples
//!
//! ## Replaying an in-memory body
//!
//! ```rust
//! use catena::body::{ByteStream, IterationMode, Length};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> catena::Result<()> {
//! let mut body = ByteStream::from_bytes("hello");
//! assert_eq!(body.length(), Length::Known(5));
//! assert_eq!(body.mode(), IterationMode::Multiple);
//!
//! // `Multiple` streams may be collected repeatedly.
//! assert_eq!(&body.collect(1024).await?[..], b"hello");
//! assert_eq!(&body.collect(1024).await?[..], b"hello");
//! # Ok(())
//! # }
//! ```

pub mod collect;
pub mod stream;

pub use stream::{ByteStream, ChunkStream, IterationMode, Length, DEFAULT_FILE_CHUNK_SIZE};
