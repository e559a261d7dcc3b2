//! Tests for middleware chain ordering, short-circuiting, and error
//! wrapping.

use catena::body::ByteStream;
use catena::{Dispatcher, Error, Interceptor, Next, Request, Response, Result};

use async_trait::async_trait;
use http::{HeaderValue, StatusCode, Uri};
use std::sync::{Arc, Mutex};

mod common;
use common::helpers::*;

fn target() -> Uri {
    Uri::from_static("https://api.example.com/v1/items")
}

#[tokio::test]
async fn interceptors_nest_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::builder(TracingTerminal::new(log.clone()))
        .interceptor(TraceInterceptor::new("A", log.clone()))
        .interceptor(TraceInterceptor::new("B", log.clone()))
        .build();

    dispatcher.send(Request::get(target())).await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["A-before", "B-before", "transport", "B-after", "A-after"]
    );
}

struct ShortCircuit;

#[async_trait]
impl Interceptor for ShortCircuit {
    fn name(&self) -> &str {
        "short-circuit"
    }

    async fn intercept(&self, _request: Request, _next: Next<'_>) -> Result<Response> {
        Ok(Response::new(StatusCode::NO_CONTENT))
    }
}

#[tokio::test]
async fn an_interceptor_may_short_circuit_without_calling_next() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let transport = MockTransport::always_status(200);
    let dispatcher = Dispatcher::builder(transport.clone())
        .interceptor(TraceInterceptor::new("outer", log.clone()))
        .interceptor(ShortCircuit)
        .build();

    let response = dispatcher.send(Request::get(target())).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(transport.calls(), 0);
    assert_eq!(*log.lock().unwrap(), vec!["outer-before", "outer-after"]);
}

struct DecorateRequest;

#[async_trait]
impl Interceptor for DecorateRequest {
    async fn intercept(&self, mut request: Request, next: Next<'_>) -> Result<Response> {
        request
            .headers_mut()
            .insert("authorization", HeaderValue::from_static("Bearer token"));
        request.replace_body(ByteStream::from_bytes("substituted"));
        next.run(request).await
    }
}

#[tokio::test]
async fn an_interceptor_may_mutate_the_request_and_substitute_the_body() {
    let transport = MockTransport::always_status(200);
    let dispatcher = Dispatcher::builder(transport.clone())
        .interceptor(DecorateRequest)
        .build();

    dispatcher
        .send(Request::post(target()).body(ByteStream::from_bytes("original")))
        .await
        .unwrap();

    assert_eq!(
        transport.bodies(),
        vec![Some(bytes::Bytes::from_static(b"substituted"))]
    );
}

struct Recover;

#[async_trait]
impl Interceptor for Recover {
    fn name(&self) -> &str {
        "recover"
    }

    async fn intercept(&self, request: Request, next: Next<'_>) -> Result<Response> {
        match next.run(request).await {
            Ok(response) => Ok(response),
            Err(_) => Ok(Response::new(StatusCode::OK)),
        }
    }
}

#[tokio::test]
async fn an_interceptor_may_recover_from_a_downstream_failure() {
    let transport = MockTransport::always_failing(catena::TransportErrorCode::ConnectionReset);
    let dispatcher = Dispatcher::builder(transport.clone())
        .interceptor(Recover)
        .build();

    let response = dispatcher.send(Request::get(target())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn transport_failures_are_wrapped_with_request_context() {
    let transport = MockTransport::always_failing(catena::TransportErrorCode::DnsFailure);
    let dispatcher = Dispatcher::builder(transport).build();

    let err = dispatcher
        .send(Request::get(target()))
        .await
        .unwrap_err();

    let failure = err.request_failure().expect("composite envelope");
    assert_eq!(failure.method, http::Method::GET);
    assert_eq!(failure.target, target());
    assert!(!failure.had_request_body);
    assert_eq!(failure.cause, "transport call failed");
    assert!(matches!(
        failure.source,
        Error::Transport {
            code: catena::TransportErrorCode::DnsFailure,
            ..
        }
    ));
}

struct Exploding;

#[async_trait]
impl Interceptor for Exploding {
    fn name(&self) -> &str {
        "exploding"
    }

    async fn intercept(&self, _request: Request, _next: Next<'_>) -> Result<Response> {
        Err(Error::Cancelled)
    }
}

#[tokio::test]
async fn interceptor_failures_name_the_interceptor_and_are_wrapped_once() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let transport = MockTransport::always_status(200);
    let dispatcher = Dispatcher::builder(transport)
        .interceptor(TraceInterceptor::new("outer", log))
        .interceptor(Exploding)
        .build();

    let err = dispatcher.send(Request::get(target())).await.unwrap_err();
    let failure = err.request_failure().unwrap();
    // The innermost wrap names the failing interceptor; the outer trace
    // interceptor's rethrow does not re-wrap it.
    assert_eq!(failure.cause, "interceptor \"exploding\" failed");
    assert!(matches!(failure.source, Error::Cancelled));
}

#[tokio::test]
async fn concurrent_sends_on_one_dispatcher_are_independent() {
    let transport = MockTransport::always_status(200);
    let dispatcher = Dispatcher::builder(transport.clone()).build();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            dispatcher.send(Request::get(target())).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(transport.calls(), 8);
}
