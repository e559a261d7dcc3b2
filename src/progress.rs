//! Progress reporting for byte streams.
//!
//! Progress is observed per chunk: wrapping a [`ByteStream`] with
//! [`ByteStream::observe`] invokes a callback with the cumulative byte count
//! after every chunk, alongside the stream's declared total. The callback
//! runs on the consuming task, in chunk emission order.
//!
//! [`ByteStream`]: crate::body::ByteStream
//! [`ByteStream::observe`]: crate::body::ByteStream::observe
//!
//! # Examples
//!
//! ```rust
//! use catena::body::ByteStream;
//! use catena::progress::ProgressCallback;
//! use futures::StreamExt;
//! use std::sync::{Arc, Mutex};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> catena::Result<()> {
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! let callback: ProgressCallback =
//!     Arc::new(move |progress| sink.lock().unwrap().push(progress.completed));
//!
//! let mut body = ByteStream::from_bytes("hello").observe(callback);
//! body.produce()?.for_each(|_| async {}).await;
//! assert_eq!(*seen.lock().unwrap(), vec![5]);
//! # Ok(())
//! # }
//! ```

use crate::body::Length;

use std::sync::Arc;

/// Callback invoked with cumulative progress after each observed chunk.
pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Cumulative bytes observed so far, against a possibly-unknown total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Bytes observed so far in the current iteration.
    pub completed: u64,
    /// Declared total of the underlying stream.
    pub total: Length,
}

impl Progress {
    /// Fraction of the total completed, when a meaningful one exists.
    ///
    /// Absent when the total is unknown or zero.
    pub fn fraction_completed(&self) -> Option<f64> {
        match self.total {
            Length::Known(total) if total > 0 => Some(self.completed as f64 / total as f64),
            _ => None,
        }
    }
}
