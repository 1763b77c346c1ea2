use crate::{ClientError, ClientResult, TransportRequest};
use opentelemetry::trace::Status;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info_span, warn, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub struct RequestSpan {
    span: Span,
    method: String,
    path: String,
    start_time: Instant,
    outcome: Option<&'static str>,
    ended: bool,
}

impl RequestSpan {
    pub fn new(request: &TransportRequest) -> Self {
        let span = info_span!("drivegen.request");
        let method = request.method.to_string();
        // Query strings carry user input, keep them out of span attributes.
        let path = request
            .path
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string();
        span.set_attribute("http.request.method", method.clone());
        span.set_attribute("url.path", path.clone());
        span.set_attribute("drivegen.request.has_body", request.body.is_some());

        Self {
            span,
            method,
            path,
            start_time: Instant::now(),
            outcome: None,
            ended: false,
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub async fn instrument_future<F>(&self, future: F) -> F::Output
    where
        F: std::future::Future,
    {
        future.instrument(self.span()).await
    }

    pub fn on_response(&mut self, _body: &Value) {
        self.outcome = Some("success");
        debug!(method = %self.method, path = %self.path, "request succeeded");
    }

    pub fn on_error(&mut self, error: &ClientError) {
        self.outcome = Some(match error.kind() {
            crate::ErrorKind::Transport => "transport_error",
            crate::ErrorKind::Remote => "remote_error",
            crate::ErrorKind::Validation | crate::ErrorKind::Storage => "local_error",
        });
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
        warn!(method = %self.method, path = %self.path, %error, "request failed");
    }

    pub fn on_end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;

        self.span
            .set_attribute("drivegen.duration_seconds", self.elapsed_seconds());
        if let Some(outcome) = self.outcome {
            self.span.set_attribute("drivegen.outcome", outcome);
        }
    }

    fn elapsed_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

impl Drop for RequestSpan {
    fn drop(&mut self) {
        self.on_end();
    }
}

pub async fn trace_request<F, Fut>(request: TransportRequest, f: F) -> ClientResult<Value>
where
    F: FnOnce(TransportRequest) -> Fut,
    Fut: std::future::Future<Output = ClientResult<Value>>,
{
    let mut span = RequestSpan::new(&request);
    let result = span.instrument_future(f(request)).await;

    match &result {
        Ok(body) => span.on_response(body),
        Err(error) => span.on_error(error),
    }

    span.on_end();
    result
}
