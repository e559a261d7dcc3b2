//! Part accumulation and size accounting for multipart forms.

use crate::body::ByteStream;
use crate::error::{EncodingError, Result};

use bytes::Bytes;
use std::path::PathBuf;

/// One body part: a name, optional filename and MIME type, and a payload
/// source.
pub(crate) struct Part {
    pub(crate) name: String,
    pub(crate) file_name: Option<String>,
    pub(crate) mime_type: Option<String>,
    pub(crate) source: PartSource,
}

pub(crate) enum PartSource {
    Bytes(Bytes),
    /// Resolved to an existing local file at encode time, never at append
    /// time.
    File(PathBuf),
    Stream {
        stream: ByteStream,
        length: u64,
    },
}

/// An ordered sequence of body parts plus a boundary token.
///
/// Created empty, mutated by `append_*` calls, and consumed exactly once by
/// [`encode`](MultipartForm::encode), [`write_encoded_data`](MultipartForm::write_encoded_data),
/// or [`into_body`](MultipartForm::into_body). Appending is purely
/// structural and infallible; parts keep insertion order and names are not
/// deduplicated.
pub struct MultipartForm {
    boundary: String,
    pub(crate) parts: Vec<Part>,
}

impl MultipartForm {
    /// Creates an empty form with a generated boundary.
    ///
    /// The generated token is unique enough not to collide with ordinary
    /// content; the encoder does not scan payloads for collisions, so a
    /// caller needing that guarantee must supply a boundary known not to
    /// appear in its data via [`MultipartForm::with_boundary`].
    pub fn new() -> Self {
        let boundary = format!(
            "catena.boundary.{:08x}{:08x}",
            rand::random::<u32>(),
            rand::random::<u32>()
        );
        Self::with_boundary(boundary)
    }

    /// Creates an empty form with a caller-supplied boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// The boundary token separating parts.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The `Content-Type` header value for this form.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Appends an in-memory part.
    pub fn append_bytes(
        &mut self,
        data: impl Into<Bytes>,
        name: impl Into<String>,
        file_name: Option<&str>,
        mime_type: Option<&str>,
    ) {
        self.parts.push(Part {
            name: name.into(),
            file_name: file_name.map(String::from),
            mime_type: mime_type.map(String::from),
            source: PartSource::Bytes(data.into()),
        });
    }

    /// Appends a file-backed part. The path is not touched until encoding.
    pub fn append_file(
        &mut self,
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        file_name: Option<&str>,
        mime_type: Option<&str>,
    ) {
        self.parts.push(Part {
            name: name.into(),
            file_name: file_name.map(String::from),
            mime_type: mime_type.map(String::from),
            source: PartSource::File(path.into()),
        });
    }

    /// Appends a part backed by a generic byte stream with a declared
    /// length.
    pub fn append_stream(
        &mut self,
        stream: ByteStream,
        length: u64,
        name: impl Into<String>,
        file_name: Option<&str>,
        mime_type: Option<&str>,
    ) {
        self.parts.push(Part {
            name: name.into(),
            file_name: file_name.map(String::from),
            mime_type: mime_type.map(String::from),
            source: PartSource::Stream { stream, length },
        });
    }

    /// Number of appended parts.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Whether any parts have been appended.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Sum of per-part payload sizes.
    ///
    /// This is the simplified accounting used for the memory-vs-disk
    /// decision: it excludes the envelope framing (boundary lines and
    /// per-part headers), which the actual encoded byte count includes.
    /// File-backed parts are measured here, so a part whose path does not
    /// resolve to a readable local file fails with an encoding error.
    pub async fn content_length(&self) -> Result<u64> {
        let mut total: u64 = 0;
        for part in &self.parts {
            total += match &part.source {
                PartSource::Bytes(data) => data.len() as u64,
                PartSource::Stream { length, .. } => *length,
                PartSource::File(path) => {
                    let metadata = tokio::fs::metadata(path).await.map_err(|_| {
                        EncodingError::PartFileUnreadable {
                            name: part.name.clone(),
                            path: path.clone(),
                        }
                    })?;
                    if !metadata.is_file() {
                        return Err(EncodingError::PartFileUnreadable {
                            name: part.name.clone(),
                            path: path.clone(),
                        }
                        .into());
                    }
                    metadata.len()
                }
            };
        }
        Ok(total)
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}
