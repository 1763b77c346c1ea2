use crate::{ClientError, ClientResult};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// A single call against the generation service, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    /// Path below the base URL, including any query string.
    pub path: String,
    pub body: Option<Value>,
}

impl TransportRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: None,
        }
    }

    pub fn post<B: Serialize>(path: impl Into<String>, body: &B) -> ClientResult<Self> {
        let body = serde_json::to_value(body).map_err(|error| {
            ClientError::InvalidInput(format!("Failed to serialize request body: {error}"))
        })?;
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        })
    }
}

/// Outbound boundary to the generation service.
///
/// Implementations resolve to the decoded JSON body of a successful call.
/// Every failure shape (connection error, failed status, `success: false`
/// envelope) resolves to an `Err`, so callers handle one failure path.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> ClientResult<Value>;
}

/// Send a request and decode the body into `R`.
pub async fn call<R: DeserializeOwned>(
    transport: &(impl Transport + ?Sized),
    request: TransportRequest,
    endpoint: &'static str,
) -> ClientResult<R> {
    let body = transport.send(request).await?;
    serde_json::from_value(body).map_err(|error| {
        ClientError::Invariant(endpoint, format!("Failed to parse response: {error}"))
    })
}
