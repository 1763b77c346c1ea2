use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::{net::TcpListener, sync::oneshot};

/// A local stand-in for the generation service, bound to an ephemeral port.
pub struct StubServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router())
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
                .expect("stub server failed");
        });

        Ok(Self {
            base_url: format!("http://{addr}/api"),
            shutdown: Some(tx),
            handle,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/health",
            get(|headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                Json(json!({
                    "status": "healthy",
                    "configuration": { "all_configured": true },
                    "services": {
                        "vector_store": "ready",
                        "authorization": authorized,
                    }
                }))
            }),
        )
        .route(
            "/api/narrative",
            post(|Json(body): Json<Value>| async move {
                let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
                if prompt == "fail" {
                    return Json(json!({ "success": false, "error": "model overloaded" }));
                }
                Json(json!({
                    "success": true,
                    "narrative": format!("Story of {prompt}"),
                    "usage": { "total_tokens": 42 }
                }))
            }),
        )
        .route(
            "/api/history",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let limit = params
                    .get("limit")
                    .and_then(|limit| limit.parse::<usize>().ok())
                    .unwrap_or(20);
                let history: Vec<Value> = [("a/1", "coupe"), ("b 2", "wagon"), ("c", "roadster")]
                    .iter()
                    .take(limit)
                    .map(|(id, prompt)| {
                        json!({
                            "id": id,
                            "prompt": prompt,
                            "narrative": "",
                            "image_url": format!("/images/{prompt}.png"),
                            "created_at": "2024-05-01T12:00:00"
                        })
                    })
                    .collect();
                Json(json!({ "success": true, "count": history.len(), "history": history }))
            }),
        )
        .route(
            "/api/history/{id}",
            delete(|Path(id): Path<String>| async move {
                match id.as_str() {
                    "a/1" => (StatusCode::NO_CONTENT, String::new()),
                    "b 2" => (
                        StatusCode::OK,
                        json!({ "success": true, "message": "Record deleted" }).to_string(),
                    ),
                    _ => (
                        StatusCode::NOT_FOUND,
                        json!({ "detail": "Record not found" }).to_string(),
                    ),
                }
            }),
        )
        .route(
            "/api/search",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream exploded".to_string(),
                )
            }),
        )
}
