use crate::{
    client_utils, opentelemetry::trace_request, ClientError, ClientResult, Transport,
    TransportRequest,
};
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Talks to the generation service over HTTP with JSON bodies.
pub struct HttpTransport {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct HttpTransportOptions {
    pub base_url: Option<String>,
    /// Forwarded as a bearer token when present.
    pub api_key: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl HttpTransport {
    #[must_use]
    pub fn new(options: HttpTransportOptions) -> Self {
        let HttpTransportOptions {
            base_url,
            api_key,
            headers,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let client = client.unwrap_or_else(Client::new);
        let headers = headers.unwrap_or_default();
        let api_key = api_key.filter(|key| !key.trim().is_empty());

        Self {
            base_url,
            api_key,
            client,
            headers,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request_headers(&self) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        if let Some(api_key) = &self.api_key {
            let auth_header =
                HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|error| {
                    ClientError::InvalidInput(format!("Invalid API key header value: {error}"))
                })?;
            headers.insert(header::AUTHORIZATION, auth_header);
        }

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
                ClientError::InvalidInput(format!("Invalid header name '{key}': {error}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                ClientError::InvalidInput(format!("Invalid header value for '{key}': {error}"))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> ClientResult<Value> {
        trace_request(request, |request| async move {
            let headers = self.request_headers()?;
            let url = self.url(&request.path);
            client_utils::send_json(
                &self.client,
                request.method,
                &url,
                request.body.as_ref(),
                headers,
            )
            .await
        })
        .await
    }
}
