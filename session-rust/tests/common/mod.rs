use drivegen_sdk::{drivegen_sdk_test::MockTransport, ClientResult, Transport, TransportRequest};
use serde_json::Value;
use tokio::sync::Notify;

/// Wraps a `MockTransport` and parks every call until the test releases it,
/// so a test can observe a session while a request is in flight.
#[derive(Default)]
pub struct GatedTransport {
    pub mock: MockTransport,
    entered: Notify,
    release: Notify,
}

impl GatedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once a call has reached the transport.
    pub async fn wait_until_entered(&self) {
        self.entered.notified().await;
    }

    /// Let one parked call continue.
    pub fn release_one(&self) {
        self.release.notify_one();
    }
}

#[async_trait::async_trait]
impl Transport for GatedTransport {
    async fn send(&self, request: TransportRequest) -> ClientResult<Value> {
        self.entered.notify_one();
        self.release.notified().await;
        self.mock.send(request).await
    }
}
