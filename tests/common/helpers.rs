//! Shared test helpers: a scripted mock transport and a trace-recording
//! interceptor.

#![allow(dead_code)]

use catena::{Error, Request, Response, Result, Transport, TransportErrorCode};

use async_trait::async_trait;
use bytes::Bytes;
use catena::body::ByteStream;
use http::StatusCode;
use std::sync::{Arc, Mutex};

/// One scripted transport outcome.
#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    /// Respond with this status and an empty body.
    Status(u16),
    /// Fail with a transport error of this classification.
    Fail(TransportErrorCode),
}

/// A transport that replays a fixed script of outcomes.
///
/// The script and call records live behind a single mutex; when the script
/// runs out, the last entry repeats. Request bodies are drained and recorded
/// so tests can assert exactly what would have gone on the wire per attempt.
pub struct MockTransport {
    state: Mutex<MockState>,
}

struct MockState {
    script: Vec<Scripted>,
    cursor: usize,
    calls: usize,
    bodies: Vec<Option<Bytes>>,
}

impl MockTransport {
    pub fn scripted(script: Vec<Scripted>) -> Arc<Self> {
        assert!(!script.is_empty(), "script must have at least one outcome");
        Arc::new(Self {
            state: Mutex::new(MockState {
                script,
                cursor: 0,
                calls: 0,
                bodies: Vec::new(),
            }),
        })
    }

    pub fn always_status(status: u16) -> Arc<Self> {
        Self::scripted(vec![Scripted::Status(status)])
    }

    pub fn always_failing(code: TransportErrorCode) -> Arc<Self> {
        Self::scripted(vec![Scripted::Fail(code)])
    }

    /// Number of times `send` was invoked.
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    /// The body bytes observed per call, in call order.
    pub fn bodies(&self) -> Vec<Option<Bytes>> {
        self.state.lock().unwrap().bodies.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, mut request: Request) -> Result<Response> {
        let body = match request.take_body() {
            Some(mut body) => Some(body.collect(u64::MAX).await?),
            None => None,
        };
        let outcome = {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            state.bodies.push(body);
            let outcome = state.script[state.cursor];
            if state.cursor + 1 < state.script.len() {
                state.cursor += 1;
            }
            outcome
        };
        match outcome {
            Scripted::Status(status) => {
                let status = StatusCode::from_u16(status).expect("valid scripted status");
                Ok(Response::new(status).body(ByteStream::from_bytes("mock body")))
            }
            Scripted::Fail(code) => Err(Error::transport(code, "scripted transport failure")),
        }
    }
}

/// Interceptor that records `"{label}-before"` and `"{label}-after"` around
/// the rest of the chain.
pub struct TraceInterceptor {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl TraceInterceptor {
    pub fn new(label: &'static str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self { label, log }
    }
}

#[async_trait]
impl catena::Interceptor for TraceInterceptor {
    fn name(&self) -> &str {
        self.label
    }

    async fn intercept(&self, request: Request, next: catena::Next<'_>) -> Result<Response> {
        self.log.lock().unwrap().push(format!("{}-before", self.label));
        let outcome = next.run(request).await;
        self.log.lock().unwrap().push(format!("{}-after", self.label));
        outcome
    }
}

/// A transport that records a trace entry for the terminal call.
pub struct TracingTerminal {
    log: Arc<Mutex<Vec<String>>>,
}

impl TracingTerminal {
    pub fn new(log: Arc<Mutex<Vec<String>>>) -> Self {
        Self { log }
    }
}

#[async_trait]
impl Transport for TracingTerminal {
    async fn send(&self, _request: Request) -> Result<Response> {
        self.log.lock().unwrap().push("transport".to_string());
        Ok(Response::new(StatusCode::OK))
    }
}
