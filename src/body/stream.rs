//! The [`ByteStream`] type: lazy, possibly-replayable chunk sequences.
//!
//! A `ByteStream` owns a chunk source, a declared [`Length`], and an
//! [`IterationMode`] fixed at construction. `Single` streams may be produced
//! exactly once; `Multiple` streams restart their underlying producer from
//! the beginning on every production, so the producer itself must be
//! replayable (an in-memory buffer, a re-openable file, or an idempotent
//! generator). Nothing is cached between iterations.

use crate::error::{Error, Result};
use crate::progress::{Progress, ProgressCallback};

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Chunk size used when streaming a file from disk.
pub const DEFAULT_FILE_CHUNK_SIZE: usize = 64 * 1024;

/// A produced sequence of chunks. Delivery is strictly sequential and in
/// emission order.
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

/// Declared total length of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// The total number of bytes is known up front.
    Known(u64),
    /// The producer does not know how many bytes it will emit.
    Unknown,
}

impl Length {
    /// The known byte count, if there is one.
    pub fn known(&self) -> Option<u64> {
        match self {
            Length::Known(n) => Some(*n),
            Length::Unknown => None,
        }
    }
}

/// Whether a stream may be consumed once or repeatedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationMode {
    /// The stream can be consumed exactly once; a second production attempt
    /// fails with [`Error::StreamConsumed`].
    Single,
    /// The stream can be consumed repeatedly, replaying the same bytes each
    /// time.
    Multiple,
}

type MapFn = Arc<dyn Fn(Bytes) -> Bytes + Send + Sync>;
type GeneratorFn = Arc<dyn Fn() -> ChunkStream + Send + Sync>;

enum Source {
    Empty,
    Chunks(Vec<Bytes>),
    File {
        path: PathBuf,
        chunk_size: usize,
        temp: Option<Arc<TempPath>>,
    },
    Generator(GeneratorFn),
    OneShot(Option<ChunkStream>),
    Mapped {
        inner: Box<ByteStream>,
        map: MapFn,
    },
    Observed {
        inner: Box<ByteStream>,
        callback: ProgressCallback,
    },
}

/// A lazily-produced, possibly-replayable sequence of byte chunks.
///
/// Exclusively owned by whichever request or response currently references
/// it; production takes `&mut self` so two consumers can never interleave on
/// the same instance.
pub struct ByteStream {
    source: Source,
    length: Length,
    mode: IterationMode,
    consumed: bool,
}

impl ByteStream {
    /// An empty stream: `Length::Known(0)`, yields zero chunks, replayable.
    pub fn empty() -> Self {
        Self {
            source: Source::Empty,
            length: Length::Known(0),
            mode: IterationMode::Multiple,
            consumed: false,
        }
    }

    /// A replayable stream over one in-memory buffer, emitted as one chunk.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        if data.is_empty() {
            return Self::empty();
        }
        let length = Length::Known(data.len() as u64);
        Self {
            source: Source::Chunks(vec![data]),
            length,
            mode: IterationMode::Multiple,
            consumed: false,
        }
    }

    /// A replayable stream over a fixed chunk list, preserving the chunk
    /// boundaries on every iteration.
    pub fn from_chunks(chunks: Vec<Bytes>) -> Self {
        if chunks.is_empty() {
            return Self::empty();
        }
        let total: u64 = chunks.iter().map(|c| c.len() as u64).sum();
        Self {
            source: Source::Chunks(chunks),
            length: Length::Known(total),
            mode: IterationMode::Multiple,
            consumed: false,
        }
    }

    /// A replayable stream over a local file, re-opened on every iteration
    /// and read in [`DEFAULT_FILE_CHUNK_SIZE`] chunks.
    pub fn from_file(path: impl Into<PathBuf>, length: Length) -> Self {
        Self {
            source: Source::File {
                path: path.into(),
                chunk_size: DEFAULT_FILE_CHUNK_SIZE,
                temp: None,
            },
            length,
            mode: IterationMode::Multiple,
            consumed: false,
        }
    }

    /// A replayable stream over a temporary file owned by the stream. The
    /// file is deleted once the last handle to it is dropped.
    pub(crate) fn from_temp_file(temp: TempPath, chunk_size: usize, length: Length) -> Self {
        let path = temp.to_path_buf();
        Self {
            source: Source::File {
                path,
                chunk_size,
                temp: Some(Arc::new(temp)),
            },
            length,
            mode: IterationMode::Multiple,
            consumed: false,
        }
    }

    /// A stream backed by a producer factory. Each iteration of a `Multiple`
    /// stream calls the factory again, so the factory must replay the same
    /// bytes on every call.
    pub fn generator<F>(factory: F, length: Length, mode: IterationMode) -> Self
    where
        F: Fn() -> ChunkStream + Send + Sync + 'static,
    {
        Self {
            source: Source::Generator(Arc::new(factory)),
            length,
            mode,
            consumed: false,
        }
    }

    /// A `Single`-mode stream wrapping one already-constructed chunk
    /// sequence.
    pub fn once<S>(chunks: S, length: Length) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            source: Source::OneShot(Some(chunks.boxed())),
            length,
            mode: IterationMode::Single,
            consumed: false,
        }
    }

    /// The declared total length.
    pub fn length(&self) -> Length {
        self.length
    }

    /// The consumption contract fixed at construction.
    pub fn mode(&self) -> IterationMode {
        self.mode
    }

    /// Whether production has already started at least once.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Starts producing chunks.
    ///
    /// For `Single` streams the first call marks the stream consumed and any
    /// subsequent call fails with [`Error::StreamConsumed`]. For `Multiple`
    /// streams every call restarts the producer from the beginning.
    pub fn produce(&mut self) -> Result<ChunkStream> {
        if self.consumed && self.mode == IterationMode::Single {
            return Err(Error::StreamConsumed);
        }
        self.consumed = true;
        self.open()
    }

    fn open(&mut self) -> Result<ChunkStream> {
        match &mut self.source {
            Source::Empty => Ok(stream::empty().boxed()),
            Source::Chunks(chunks) => {
                let chunks = chunks.clone();
                Ok(stream::iter(chunks.into_iter().map(Ok)).boxed())
            }
            Source::File {
                path,
                chunk_size,
                temp,
            } => Ok(file_chunk_stream(path.clone(), *chunk_size, temp.clone())),
            Source::Generator(factory) => Ok(factory()),
            Source::OneShot(slot) => slot.take().ok_or(Error::StreamConsumed),
            Source::Mapped { inner, map } => {
                let map = map.clone();
                let chunks = inner.produce()?;
                Ok(chunks.map(move |chunk| chunk.map(|c| map(c))).boxed())
            }
            Source::Observed { inner, callback } => {
                let callback = callback.clone();
                let total = inner.length();
                let chunks = inner.produce()?;
                let mut completed: u64 = 0;
                Ok(chunks
                    .map(move |chunk| {
                        if let Ok(data) = &chunk {
                            completed += data.len() as u64;
                            callback(&Progress { completed, total });
                        }
                        chunk
                    })
                    .boxed())
            }
        }
    }

    /// Returns a fresh stream over the same source.
    ///
    /// Only `Multiple` streams are replayable; cloning a `Single` stream
    /// fails with [`Error::StreamConsumed`]. This is the contract the retry
    /// layer relies on to re-send a body.
    pub fn try_clone(&self) -> Result<ByteStream> {
        if self.mode == IterationMode::Single {
            return Err(Error::StreamConsumed);
        }
        let source = match &self.source {
            Source::Empty => Source::Empty,
            Source::Chunks(chunks) => Source::Chunks(chunks.clone()),
            Source::File {
                path,
                chunk_size,
                temp,
            } => Source::File {
                path: path.clone(),
                chunk_size: *chunk_size,
                temp: temp.clone(),
            },
            Source::Generator(factory) => Source::Generator(factory.clone()),
            // One-shot sources are always `Single`, so this arm is
            // unreachable through the mode check above.
            Source::OneShot(_) => return Err(Error::StreamConsumed),
            Source::Mapped { inner, map } => Source::Mapped {
                inner: Box::new(inner.try_clone()?),
                map: map.clone(),
            },
            Source::Observed { inner, callback } => Source::Observed {
                inner: Box::new(inner.try_clone()?),
                callback: callback.clone(),
            },
        };
        Ok(ByteStream {
            source,
            length: self.length,
            mode: self.mode,
            consumed: false,
        })
    }

    /// Lazily applies `map` to every chunk, preserving the source's length,
    /// mode, and chunk boundaries.
    pub fn map_chunks<F>(self, map: F) -> ByteStream
    where
        F: Fn(Bytes) -> Bytes + Send + Sync + 'static,
    {
        let length = self.length;
        let mode = self.mode;
        ByteStream {
            source: Source::Mapped {
                inner: Box::new(self),
                map: Arc::new(map),
            },
            length,
            mode,
            consumed: false,
        }
    }

    /// Invokes `callback` with cumulative [`Progress`] after every chunk.
    ///
    /// The counter is local to each iteration, so replaying a `Multiple`
    /// stream reports from zero again. Chunk boundaries, length, and mode
    /// are unchanged.
    pub fn observe(self, callback: ProgressCallback) -> ByteStream {
        let length = self.length;
        let mode = self.mode;
        ByteStream {
            source: Source::Observed {
                inner: Box::new(self),
                callback,
            },
            length,
            mode,
            consumed: false,
        }
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            Source::Empty => "Empty",
            Source::Chunks(_) => "Chunks",
            Source::File { .. } => "File",
            Source::Generator(_) => "Generator",
            Source::OneShot(_) => "OneShot",
            Source::Mapped { .. } => "Mapped",
            Source::Observed { .. } => "Observed",
        };
        f.debug_struct("ByteStream")
            .field("source", &source)
            .field("length", &self.length)
            .field("mode", &self.mode)
            .field("consumed", &self.consumed)
            .finish()
    }
}

impl From<Bytes> for ByteStream {
    fn from(data: Bytes) -> Self {
        ByteStream::from_bytes(data)
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(data: Vec<u8>) -> Self {
        ByteStream::from_bytes(data)
    }
}

impl From<&'static str> for ByteStream {
    fn from(data: &'static str) -> Self {
        ByteStream::from_bytes(data)
    }
}

enum FileState {
    Opening(PathBuf),
    Reading(File),
    Finished,
}

/// Streams a file in fixed-size chunks, opening it lazily on the first
/// poll. The optional temp guard keeps a temporary file alive until the
/// stream is fully consumed or abandoned.
fn file_chunk_stream(
    path: PathBuf,
    chunk_size: usize,
    temp: Option<Arc<TempPath>>,
) -> ChunkStream {
    stream::unfold((FileState::Opening(path), temp), move |(state, temp)| {
        async move {
            let mut file = match state {
                FileState::Opening(path) => match File::open(&path).await {
                    Ok(file) => file,
                    Err(err) => return Some((Err(err.into()), (FileState::Finished, temp))),
                },
                FileState::Reading(file) => file,
                FileState::Finished => return None,
            };
            let mut buf = vec![0u8; chunk_size];
            match file.read(&mut buf).await {
                Ok(0) => None,
                Ok(n) => {
                    buf.truncate(n);
                    Some((Ok(Bytes::from(buf)), (FileState::Reading(file), temp)))
                }
                Err(err) => Some((Err(err.into()), (FileState::Finished, temp))),
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_stream_yields_no_chunks() {
        let mut body = ByteStream::empty();
        assert_eq!(body.length(), Length::Known(0));
        let mut chunks = body.produce().unwrap();
        assert!(chunks.next().await.is_none());
    }

    #[tokio::test]
    async fn single_mode_second_production_fails() {
        let mut body = ByteStream::once(
            stream::iter(vec![Ok(Bytes::from_static(b"one"))]),
            Length::Known(3),
        );
        assert!(body.produce().is_ok());
        assert!(matches!(body.produce(), Err(Error::StreamConsumed)));
    }

    #[tokio::test]
    async fn single_mode_fails_even_after_partial_iteration() {
        let mut body = ByteStream::once(
            stream::iter(vec![Ok(Bytes::from_static(b"a")), Ok(Bytes::from_static(b"b"))]),
            Length::Known(2),
        );
        let mut chunks = body.produce().unwrap();
        // Read one chunk, then abandon the iteration.
        assert_eq!(chunks.next().await.unwrap().unwrap(), "a");
        drop(chunks);
        assert!(matches!(body.produce(), Err(Error::StreamConsumed)));
    }

    #[tokio::test]
    async fn multiple_mode_replays_identical_chunk_boundaries() {
        let chunks = vec![
            Bytes::from_static(b"hello"),
            Bytes::from_static(b", "),
            Bytes::from_static(b"world"),
        ];
        let mut body = ByteStream::from_chunks(chunks.clone());
        for _ in 0..3 {
            let observed: Vec<Bytes> = body
                .produce()
                .unwrap()
                .map(|c| c.unwrap())
                .collect::<Vec<_>>()
                .await;
            assert_eq!(observed, chunks);
        }
    }

    #[tokio::test]
    async fn map_chunks_preserves_length_and_boundaries() {
        let body = ByteStream::from_chunks(vec![
            Bytes::from_static(b"ab"),
            Bytes::from_static(b"cd"),
        ]);
        let mut upper = body.map_chunks(|chunk| {
            Bytes::from(chunk.iter().map(u8::to_ascii_uppercase).collect::<Vec<u8>>())
        });
        assert_eq!(upper.length(), Length::Known(4));
        assert_eq!(upper.mode(), IterationMode::Multiple);
        let observed: Vec<Bytes> = upper
            .produce()
            .unwrap()
            .map(|c| c.unwrap())
            .collect::<Vec<_>>()
            .await;
        assert_eq!(observed, vec![Bytes::from_static(b"AB"), Bytes::from_static(b"CD")]);
    }

    #[test]
    fn try_clone_refuses_single_mode() {
        let body = ByteStream::once(stream::empty(), Length::Unknown);
        assert!(matches!(body.try_clone(), Err(Error::StreamConsumed)));
    }
}
