//! Mock transport for testing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;

use crate::transport::{Transport, TransportFuture};

/// A configurable canned response for [`MockTransport`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Reply with `status` and `body`.
    Reply { status: u16, body: String },
    /// Reply with `status`, send `prefix`, then fail the body stream as if the
    /// connection had been reset.
    BrokenBody { status: u16, prefix: &'static str },
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        MockResponse::Reply {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        MockResponse::Reply {
            status,
            body: body.into(),
        }
    }
}

/// What the client handed to the transport.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub content_type: Option<String>,
}

/// A hand-rolled mock implementing [`Transport`] for tests.
///
/// Supports:
/// - A fixed response (used for every call), **or**
/// - A sequence of responses (one per call, repeating the last if exhausted).
/// - Call counting via [`call_count()`](MockTransport::call_count).
/// - Request recording via [`requests()`](MockTransport::requests).
pub struct MockTransport {
    responses: Mutex<Vec<MockResponse>>,
    fallback: MockResponse,
    requests: Mutex<Vec<RecordedRequest>>,
    call_count: AtomicUsize,
}

impl MockTransport {
    /// Create a mock that always returns `response`.
    pub fn new(response: MockResponse) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: response,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns responses in order, repeating the last one.
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        // Reverse so we can pop() from the front cheaply.
        responses.reverse();
        let fallback = responses.first().cloned().unwrap();
        Self {
            responses: Mutex::new(responses),
            fallback,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `execute()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self) -> MockResponse {
        let mut seq = self.responses.lock().unwrap();
        if let Some(resp) = seq.pop() {
            resp
        } else {
            self.fallback.clone()
        }
    }
}

impl Transport for MockTransport {
    fn execute<'a>(&'a self, request: reqwest::Request) -> TransportFuture<'a> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method().clone(),
            url: request.url().to_string(),
            content_type: request
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        });
        let response = self.next_response();

        Box::pin(async move {
            match response {
                MockResponse::Reply { status, body } => {
                    let response = http::Response::builder()
                        .status(status)
                        .body(body)
                        .unwrap();
                    Ok(reqwest::Response::from(response))
                }
                MockResponse::BrokenBody { status, prefix } => {
                    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
                        Ok(Bytes::from_static(prefix.as_bytes())),
                        Err(std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            "connection reset",
                        )),
                    ];
                    let body = reqwest::Body::wrap_stream(futures_util::stream::iter(chunks));
                    let response = http::Response::builder()
                        .status(status)
                        .body(body)
                        .unwrap();
                    Ok(reqwest::Response::from(response))
                }
            }
        })
    }
}
