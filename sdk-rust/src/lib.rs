pub mod api;
mod client_utils;
mod config_store;
pub mod drivegen_sdk_test;
mod errors;
mod health;
mod history;
mod http_transport;
mod opentelemetry;
mod search;
mod transport;
mod types;

pub use config_store::{ConfigStore, HealthStatus};
pub use errors::*;
pub use health::HealthClient;
pub use history::{HistoryClient, DEFAULT_HISTORY_LIMIT};
pub use http_transport::{HttpTransport, HttpTransportOptions, DEFAULT_BASE_URL};
pub use search::{similarity, SimilaritySearchClient, DEFAULT_SEARCH_RESULTS};
pub use transport::{call, Transport, TransportRequest};
pub use types::*;
