use std::sync::Arc;

use tracing::warn;

use crate::traits::KeyValueStore;

const PROCESSED_PREFIX: &str = "processed:";
const PROCESSED_VALUE: &str = "1";

/// Remembers which comments have been handled. Markers are never removed.
pub struct DedupStore {
    store: Arc<dyn KeyValueStore>,
}

impl DedupStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(comment_id: &str) -> String {
        format!("{PROCESSED_PREFIX}{comment_id}")
    }

    /// A failed read counts as "not processed": the comment gets another attempt.
    pub async fn is_processed(&self, comment_id: &str) -> bool {
        match self.store.get(&Self::key(comment_id)).await {
            Ok(value) => value.is_some_and(|v| !v.is_empty() && v != "0"),
            Err(e) => {
                warn!(comment_id, error = %e, "Dedup read failed, treating comment as unseen");
                false
            }
        }
    }

    pub async fn mark_processed(&self, comment_id: &str) {
        if let Err(e) = self.store.set(&Self::key(comment_id), PROCESSED_VALUE).await {
            warn!(comment_id, error = %e, "Failed to mark comment processed");
        }
    }
}
