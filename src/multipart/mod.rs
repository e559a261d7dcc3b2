//! multipart/form-data assembly and encoding.
//!
//! A [`MultipartForm`] collects named parts in insertion order and encodes
//! them with CRLF-delimited, boundary-prefixed framing. Encoding decides a
//! memory-vs-disk strategy per form: payloads up to the caller's threshold
//! are built in one buffer, larger ones are staged through a temporary file
//! that is deleted once the resulting stream is consumed or abandoned.
//!
//! # Overview
//!
//! - [`form`] - Part accumulation, boundary handling, size accounting
//! - [`encoder`] - The wire encoding and the strategy decision point
//!
//! # Examples
//!
//! ```rust
//! use catena::multipart::MultipartForm;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> catena::Result<()> {
//! let mut form = MultipartForm::new();
//! form.append_bytes("alpha", "field", None, None);
//! form.append_bytes(&b"\x00\x01"[..], "blob", Some("raw.bin"), Some("application/octet-stream"));
//!
//! assert!(form.content_type().starts_with("multipart/form-data; boundary="));
//! let encoded = form.encode().await?;
//! assert!(encoded.len() > 0);
//! # Ok(())
//! # }
//! ```

pub mod encoder;
pub mod form;

pub use encoder::DEFAULT_MEMORY_THRESHOLD;
pub use form::MultipartForm;
