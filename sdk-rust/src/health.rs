use crate::{
    api::{HealthResponse, HEALTH_PATH},
    transport::call,
    HealthReport, HealthState, Transport, TransportRequest,
};
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};
use tracing::warn;

/// Probes the service's health endpoint.
pub struct HealthClient {
    transport: Arc<dyn Transport>,
}

impl HealthClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// A failed probe is itself a health result: it yields an `Error` report
    /// with the API marked as not connected.
    pub async fn check(&self) -> HealthReport {
        match call::<HealthResponse>(
            self.transport.as_ref(),
            TransportRequest::get(HEALTH_PATH),
            "health",
        )
        .await
        {
            Ok(response) => HealthReport {
                status: response.status,
                all_configured: response
                    .configuration
                    .and_then(|configuration| configuration.all_configured),
                services: response.services,
            },
            Err(error) => {
                warn!(%error, "health check failed");
                HealthReport {
                    status: HealthState::Error,
                    all_configured: None,
                    services: BTreeMap::from([(
                        "api".to_string(),
                        Value::String("not connected".to_string()),
                    )]),
                }
            }
        }
    }
}
