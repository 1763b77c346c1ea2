use drivegen_sdk::{ConfigStore, HttpTransport, HttpTransportOptions, DEFAULT_BASE_URL};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

/// Builds a transport from `DRIVEGEN_BASE_URL` and `DRIVEGEN_API_KEY`,
/// falling back to the key saved in the local config file.
pub fn get_transport() -> Arc<HttpTransport> {
    let base_url =
        std::env::var("DRIVEGEN_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let api_key = std::env::var("DRIVEGEN_API_KEY").ok().or_else(|| {
        let path = ConfigStore::default_path().ok()?;
        let store = ConfigStore::load(path).ok()?;
        store.api_key().map(str::to_string)
    });

    Arc::new(HttpTransport::new(HttpTransportOptions {
        base_url: Some(base_url),
        api_key,
        ..Default::default()
    }))
}
