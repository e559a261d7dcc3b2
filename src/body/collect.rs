//! Bounded materialization of a [`ByteStream`] into a single buffer.
//!
//! The ceiling is enforced incrementally: collection fails the moment the
//! running total would exceed the caller's maximum, before further chunks
//! are pulled, so memory stays bounded. A declared `Known` length is
//! enforced the same way; producers are not trusted to honor it.

use crate::body::stream::{ByteStream, Length};
use crate::error::{Error, Result};

use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;

impl ByteStream {
    /// Consumes the stream fully, concatenating chunks in order.
    ///
    /// Fails with [`Error::BodyTooLarge`] as soon as the accumulated size
    /// would exceed `max_bytes`, or exceed a `Known` declared length. The
    /// result is never silently truncated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use catena::body::ByteStream;
    /// use catena::Error;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> catena::Result<()> {
    /// let mut body = ByteStream::from_bytes("0123456789");
    /// assert_eq!(&body.collect(10).await?[..], b"0123456789");
    ///
    /// let err = body.collect(9).await.unwrap_err();
    /// assert!(matches!(err, Error::BodyTooLarge { limit: 9 }));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn collect(&mut self, max_bytes: u64) -> Result<Bytes> {
        let ceiling = match self.length() {
            Length::Known(declared) => declared.min(max_bytes),
            Length::Unknown => max_bytes,
        };
        let mut chunks = self.produce()?;
        let capacity = ceiling.min(64 * 1024) as usize;
        let mut collected = BytesMut::with_capacity(capacity);
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            let total = collected.len() as u64 + chunk.len() as u64;
            if total > ceiling {
                return Err(Error::BodyTooLarge { limit: ceiling });
            }
            collected.put(chunk);
        }
        Ok(collected.freeze())
    }
}
