use crate::{ClientError, ClientResult};
use reqwest::{header::HeaderMap, Client, Method};
use serde_json::Value;

const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";

/// Send a JSON request and normalize the response.
/// Errors on a failed status code and on a `success: false` envelope.
pub async fn send_json(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<&Value>,
    headers: HeaderMap,
) -> ClientResult<Value> {
    let mut builder = client.request(method, url).headers(headers);
    if let Some(body) = body {
        builder = builder.json(body);
    }

    let response = builder.send().await?;
    let status = response.status();
    let text = response.text().await?;

    let parsed = if text.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(error) if status.is_success() => {
                return Err(ClientError::Invariant(
                    "http",
                    format!("Failed to parse response body: {error}"),
                ));
            }
            Err(_) => Value::Null,
        }
    };

    if !status.is_success() {
        return Err(match error_message(&parsed) {
            Some(message) => ClientError::Remote(message),
            None => ClientError::StatusCode(status, text),
        });
    }

    normalize_envelope(parsed)
}

/// Reject a `{ success: false, error }` body. Any other body passes through.
pub fn normalize_envelope(body: Value) -> ClientResult<Value> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message =
            error_message(&body).unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
        return Err(ClientError::Remote(message));
    }
    Ok(body)
}

/// Pull a human readable message out of an error body. Understands the
/// service's `error` field and the framework's `detail` field, which is either
/// a string or a list of validation issues.
fn error_message(body: &Value) -> Option<String> {
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        if !message.trim().is_empty() {
            return Some(message.to_string());
        }
    }

    match body.get("detail")? {
        Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
        Value::Array(issues) => {
            let messages: Vec<&str> = issues
                .iter()
                .filter_map(|issue| issue.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
