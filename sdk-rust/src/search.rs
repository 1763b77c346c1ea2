use crate::{
    api::{SearchRequest, SearchResponse, SEARCH_PATH},
    transport::call,
    ClientError, ClientResult, SearchResult, Transport, TransportRequest,
};
use std::sync::Arc;

pub const DEFAULT_SEARCH_RESULTS: usize = 5;

/// Convert a vector distance into a percentage, clamped to `[0, 100]`.
#[must_use]
pub fn similarity(distance: f64) -> f64 {
    let score = (1.0 - distance) * 100.0;
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

impl SearchResult {
    /// Similarity percentage, if the service reported a distance.
    #[must_use]
    pub fn similarity(&self) -> Option<f64> {
        self.distance.map(similarity)
    }
}

/// Semantic search over past generations.
pub struct SimilaritySearchClient {
    transport: Arc<dyn Transport>,
}

impl SimilaritySearchClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Return up to `k` records closest to `text`, in the order the service
    /// ranked them. An empty list means nothing matched.
    pub async fn query(&self, text: &str, k: usize) -> ClientResult<Vec<SearchResult>> {
        let query = text.trim();
        if query.is_empty() {
            return Err(ClientError::InvalidInput(
                "Search query must not be empty".to_string(),
            ));
        }
        if k == 0 {
            return Err(ClientError::InvalidInput(
                "Number of results must be at least 1".to_string(),
            ));
        }

        let request = TransportRequest::post(
            SEARCH_PATH,
            &SearchRequest {
                query: query.to_string(),
                n_results: k,
            },
        )?;
        let SearchResponse { results } = call(self.transport.as_ref(), request, "search").await?;
        Ok(results)
    }
}
