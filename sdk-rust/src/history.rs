use crate::{
    api::{HistoryResponse, HISTORY_PATH},
    transport::call,
    ClientError, ClientResult, HistoryRecord, Transport, TransportRequest,
};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Reads and deletes persisted generations.
///
/// Keeps a local copy of the last listing, most recent first. The copy is only
/// replaced by a successful listing and only loses an entry once the service
/// has confirmed the delete, so it never runs ahead of the remote store.
pub struct HistoryClient {
    transport: Arc<dyn Transport>,
    cache: Vec<HistoryRecord>,
}

impl HistoryClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache: Vec::new(),
        }
    }

    /// Fetch up to `limit` records in the service's order and replace the
    /// local copy with them. On failure the local copy is left as it was.
    pub async fn list(&mut self, limit: usize) -> ClientResult<Vec<HistoryRecord>> {
        let request = TransportRequest::get(format!("{HISTORY_PATH}?limit={limit}"));
        let HistoryResponse { history } =
            call(self.transport.as_ref(), request, "history").await?;

        debug!(count = history.len(), "history refreshed");
        self.cache.clone_from(&history);
        Ok(history)
    }

    /// Delete a record remotely, then drop it from the local copy.
    pub async fn delete(&mut self, id: &str) -> ClientResult<()> {
        if id.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "History record id must not be empty".to_string(),
            ));
        }

        let path = format!("{HISTORY_PATH}/{}", urlencoding::encode(id));
        self.transport.send(TransportRequest::delete(path)).await?;

        let before = self.cache.len();
        self.cache.retain(|record| record.id != id);
        debug!(id, removed = before - self.cache.len(), "history record deleted");
        Ok(())
    }

    /// Records from the last successful listing, most recent first.
    #[must_use]
    pub fn records(&self) -> &[HistoryRecord] {
        &self.cache
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HistoryRecord> {
        self.cache.iter().find(|record| record.id == id)
    }
}
