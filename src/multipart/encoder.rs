//! The multipart wire encoding and the memory-vs-disk strategy.
//!
//! Framing, per part in order: `--boundary\r\n`, a `Content-Disposition`
//! header with the part name and optional filename, an optional
//! `Content-Type` header, a blank line, the payload bytes, `\r\n`. After the
//! last part, the closing `--boundary--\r\n`. A form with zero parts encodes
//! to a genuinely empty payload with no boundaries at all; downstream
//! transports relying on RFC-strict framing must not be handed an empty
//! form.

use crate::body::{ByteStream, Length};
use crate::error::{EncodingError, Error, Result};
use crate::multipart::form::{MultipartForm, Part, PartSource};

use bytes::Bytes;
use futures::StreamExt;
use std::io::{Cursor, ErrorKind};
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Threshold above which [`MultipartForm::into_body`] stages the encoding
/// through a temporary file instead of memory.
pub const DEFAULT_MEMORY_THRESHOLD: u64 = 10 * 1024 * 1024;

/// Chunk size used when streaming a disk-staged encoding.
const ENCODED_FILE_CHUNK_SIZE: usize = 64 * 1024;

impl MultipartForm {
    /// Builds the full multipart body in one buffer.
    ///
    /// A form with zero parts returns an empty buffer.
    pub async fn encode(self) -> Result<Bytes> {
        if self.is_empty() {
            return Ok(Bytes::new());
        }
        let boundary = self.boundary().to_owned();
        let mut cursor = Cursor::new(Vec::new());
        write_parts(self.parts, &boundary, &mut cursor).await?;
        Ok(Bytes::from(cursor.into_inner()))
    }

    /// Streams the same encoding to `path`.
    ///
    /// Fails with an encoding error if the destination already exists; no
    /// silent overwrite. A failure mid-encoding removes the destination
    /// again, so a failed call never leaves a partial file behind. Returns
    /// the encoded byte count.
    pub async fn write_encoded_data(self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(EncodingError::DestinationExists {
                    path: path.to_path_buf(),
                }
                .into());
            }
            Err(err) => return Err(err.into()),
        };
        let boundary = self.boundary().to_owned();
        let outcome = if self.is_empty() {
            Ok(0)
        } else {
            write_parts(self.parts, &boundary, &mut file).await
        };
        let outcome = match outcome {
            Ok(written) => file.flush().await.map(|_| written).map_err(Error::from),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(written) => Ok(written),
            Err(err) => {
                // This call created the destination; a partial encoding must
                // not survive the failure.
                drop(file);
                let _ = tokio::fs::remove_file(path).await;
                Err(err)
            }
        }
    }

    /// The strategy decision point: turns the form into a request body.
    ///
    /// When the form's [`content_length`](MultipartForm::content_length) is
    /// within `threshold` (callers usually pass
    /// [`DEFAULT_MEMORY_THRESHOLD`]), the encoding is materialized in
    /// memory. Otherwise it is written to a fresh temporary file and
    /// returned as a stream of fixed-size chunks; the file is deleted once
    /// the stream and its iterations have been dropped.
    pub async fn into_body(self, threshold: u64) -> Result<ByteStream> {
        if self.content_length().await? <= threshold {
            let encoded = self.encode().await?;
            return Ok(ByteStream::from_bytes(encoded));
        }

        let boundary = self.boundary().to_owned();
        let temp = tempfile::NamedTempFile::new()?.into_temp_path();
        let mut file = OpenOptions::new().write(true).open(&temp).await?;
        let written = write_parts(self.parts, &boundary, &mut file).await?;
        file.flush().await?;
        drop(file);
        tracing::debug!(bytes = written, path = %temp.display(), "staged multipart encoding on disk");
        Ok(ByteStream::from_temp_file(
            temp,
            ENCODED_FILE_CHUNK_SIZE,
            Length::Known(written),
        ))
    }
}

/// Writes the framed parts followed by the closing boundary, returning the
/// number of bytes written.
async fn write_parts<W: AsyncWrite + Unpin>(
    parts: Vec<Part>,
    boundary: &str,
    writer: &mut W,
) -> Result<u64> {
    let mut written: u64 = 0;
    for mut part in parts {
        let header = part_header(boundary, &part);
        writer.write_all(header.as_bytes()).await?;
        written += header.len() as u64;
        written += match &mut part.source {
            PartSource::Bytes(data) => {
                writer.write_all(data).await?;
                data.len() as u64
            }
            PartSource::File(path) => {
                let mut file = File::open(&path).await.map_err(|_| {
                    EncodingError::PartFileUnreadable {
                        name: part.name.clone(),
                        path: path.clone(),
                    }
                })?;
                tokio::io::copy(&mut file, writer).await?
            }
            PartSource::Stream { stream, .. } => {
                let mut chunks = stream.produce()?;
                let mut payload: u64 = 0;
                while let Some(chunk) = chunks.next().await {
                    let chunk = chunk?;
                    writer.write_all(&chunk).await?;
                    payload += chunk.len() as u64;
                }
                payload
            }
        };
        writer.write_all(b"\r\n").await?;
        written += 2;
    }
    let closing = format!("--{boundary}--\r\n");
    writer.write_all(closing.as_bytes()).await?;
    written += closing.len() as u64;
    Ok(written)
}

fn part_header(boundary: &str, part: &Part) -> String {
    let mut header = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"",
        part.name
    );
    if let Some(file_name) = &part.file_name {
        header.push_str(&format!("; filename=\"{file_name}\""));
    }
    header.push_str("\r\n");
    if let Some(mime_type) = &part.mime_type {
        header.push_str(&format!("Content-Type: {mime_type}\r\n"));
    }
    header.push_str("\r\n");
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_parts_encode_to_an_empty_buffer() {
        let form = MultipartForm::with_boundary("B");
        assert!(form.encode().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn single_part_framing_is_bit_exact() {
        let mut form = MultipartForm::with_boundary("B");
        form.append_bytes("x", "a", None, None);
        let encoded = form.encode().await.unwrap();
        assert_eq!(
            &encoded[..],
            b"--B\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nx\r\n--B--\r\n"
        );
    }

    #[tokio::test]
    async fn filename_and_content_type_are_emitted_when_present() {
        let mut form = MultipartForm::with_boundary("B");
        form.append_bytes("x", "a", Some("a.txt"), Some("text/plain"));
        let encoded = form.encode().await.unwrap();
        let expected = b"--B\r\nContent-Disposition: form-data; name=\"a\"; filename=\"a.txt\"\r\n\
                         Content-Type: text/plain\r\n\r\nx\r\n--B--\r\n";
        assert_eq!(&encoded[..], &expected[..]);
    }
}
