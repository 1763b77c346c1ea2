use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

use serde_json::Value;

use crate::{client_utils, ClientError, ClientResult, Transport, TransportRequest};

/// Result for a mocked `send` call.
/// It can either be a response body or an error to return.
pub enum MockResult {
    Response(Value),
    Error(ClientError),
}

impl MockResult {
    /// Construct a result that yields the provided body.
    pub fn response(body: Value) -> Self {
        Self::Response(body)
    }

    /// Construct a result that yields the provided error.
    pub fn error(error: ClientError) -> Self {
        Self::Error(error)
    }
}

impl From<Value> for MockResult {
    fn from(body: Value) -> Self {
        Self::response(body)
    }
}

impl From<ClientError> for MockResult {
    fn from(error: ClientError) -> Self {
        Self::error(error)
    }
}

#[derive(Default)]
struct MockTransportState {
    mocked_results: VecDeque<MockResult>,
    tracked_requests: Vec<TransportRequest>,
}

impl MockTransportState {
    fn reset(&mut self) {
        self.tracked_requests.clear();
    }

    fn restore(&mut self) {
        self.mocked_results.clear();
        self.reset();
    }
}

/// A transport for tests that tracks requests and yields predefined results.
///
/// Response bodies go through the same `success: false` normalization as the
/// HTTP transport, so a mocked failure envelope surfaces as a remote error.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockTransportState>,
}

impl MockTransport {
    /// Construct a new mock transport instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue one or more mocked results.
    pub fn enqueue_results<I>(&self, results: I) -> &Self
    where
        I: IntoIterator<Item = MockResult>,
    {
        let mut state = self.lock();
        state.mocked_results.extend(results);
        drop(state);
        self
    }

    /// Convenience to enqueue a single mocked result.
    pub fn enqueue<R>(&self, result: R) -> &Self
    where
        R: Into<MockResult>,
    {
        self.enqueue_results(std::iter::once(result.into()))
    }

    /// Retrieve the tracked requests accumulated so far.
    pub fn tracked_requests(&self) -> Vec<TransportRequest> {
        self.lock().tracked_requests.clone()
    }

    /// Number of results still waiting to be consumed.
    pub fn pending_results(&self) -> usize {
        self.lock().mocked_results.len()
    }

    /// Reset tracked requests without touching enqueued results.
    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Clear both tracked requests and enqueued results.
    pub fn restore(&self) {
        self.lock().restore();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockTransportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> ClientResult<Value> {
        let mut state = self.lock();
        state.tracked_requests.push(request);

        let result = state.mocked_results.pop_front().ok_or_else(|| {
            ClientError::Invariant("mock", "no mocked results available".into())
        })?;
        drop(state);

        match result {
            MockResult::Response(body) => client_utils::normalize_envelope(body),
            MockResult::Error(error) => Err(error),
        }
    }
}
