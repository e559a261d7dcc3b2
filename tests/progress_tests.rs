//! Tests for per-chunk progress observation.

use catena::body::{ByteStream, IterationMode, Length};
use catena::progress::{Progress, ProgressCallback};

use bytes::Bytes;
use futures::StreamExt;
use std::sync::{Arc, Mutex};

fn recording_callback() -> (ProgressCallback, Arc<Mutex<Vec<Progress>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: ProgressCallback = Arc::new(move |progress: &Progress| {
        sink.lock().unwrap().push(*progress);
    });
    (callback, seen)
}

#[tokio::test]
async fn cumulative_bytes_follow_chunk_sizes() {
    let (callback, seen) = recording_callback();
    let mut body = ByteStream::from_chunks(vec![
        Bytes::from(vec![0u8; 5]),
        Bytes::from(vec![0u8; 2]),
        Bytes::from(vec![0u8; 6]),
    ])
    .observe(callback);

    body.produce().unwrap().for_each(|_| async {}).await;

    let seen = seen.lock().unwrap();
    let completed: Vec<u64> = seen.iter().map(|p| p.completed).collect();
    assert_eq!(completed, vec![5, 7, 13]);

    let fractions: Vec<f64> = seen.iter().map(|p| p.fraction_completed().unwrap()).collect();
    assert_eq!(fractions, vec![5.0 / 13.0, 7.0 / 13.0, 1.0]);
}

#[tokio::test]
async fn unknown_totals_report_no_fraction() {
    let (callback, seen) = recording_callback();
    let mut body = ByteStream::generator(
        || futures::stream::iter(vec![Ok(Bytes::from_static(b"abc"))]).boxed(),
        Length::Unknown,
        IterationMode::Multiple,
    )
    .observe(callback);

    body.produce().unwrap().for_each(|_| async {}).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].completed, 3);
    assert_eq!(seen[0].fraction_completed(), None);
}

#[tokio::test]
async fn replaying_an_observed_stream_counts_from_zero_again() {
    let (callback, seen) = recording_callback();
    let mut body = ByteStream::from_bytes("1234").observe(callback);

    for _ in 0..2 {
        body.produce().unwrap().for_each(|_| async {}).await;
    }

    let completed: Vec<u64> = seen.lock().unwrap().iter().map(|p| p.completed).collect();
    assert_eq!(completed, vec![4, 4]);
}

#[tokio::test]
async fn observation_preserves_collection_results() {
    let (callback, seen) = recording_callback();
    let mut body = ByteStream::from_chunks(vec![
        Bytes::from_static(b"ob"),
        Bytes::from_static(b"served"),
    ])
    .observe(callback);

    assert_eq!(&body.collect(1024).await.unwrap()[..], b"observed");
    assert_eq!(seen.lock().unwrap().last().unwrap().completed, 8);
}
