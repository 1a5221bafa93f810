use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{info, warn};

use shotbot_common::{EntityId, ShotbotError};

use crate::traits::{EntitySource, KeyValueStore};

/// Store key holding the JSON-encoded canonical name list.
pub const DIRECTORY_KEY: &str = "all-player-names";

/// Canonical player names, loaded once and memoized for the process lifetime.
///
/// Lookup order on a cold start: in-process copy, then the shared store,
/// then the external source. A copy found in the store is always preferred
/// over re-fetching, however old it is.
pub struct EntityDirectory {
    source: Arc<dyn EntitySource>,
    store: Arc<dyn KeyValueStore>,
    names: Mutex<Option<Arc<Vec<String>>>>,
}

impl EntityDirectory {
    pub fn new(source: Arc<dyn EntitySource>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            source,
            store,
            names: Mutex::new(None),
        }
    }

    /// All canonical names. Fails only when nothing is cached and the source is unreachable.
    pub async fn names(&self) -> Result<Arc<Vec<String>>> {
        let mut memo = self.names.lock().await;
        if let Some(names) = memo.as_ref() {
            return Ok(names.clone());
        }

        if let Some(names) = self.load_from_store().await {
            info!(count = names.len(), "Loaded player directory from store");
            let names = Arc::new(names);
            *memo = Some(names.clone());
            return Ok(names);
        }

        let names = self
            .source
            .all_names()
            .await
            .map_err(|e| ShotbotError::Directory(format!("{e:#}")))?;
        info!(count = names.len(), "Fetched player directory from source");

        match serde_json::to_string(&names) {
            Ok(encoded) => {
                if let Err(e) = self.store.set(DIRECTORY_KEY, &encoded).await {
                    warn!(error = %e, "Failed to store player directory");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode player directory"),
        }

        let names = Arc::new(names);
        *memo = Some(names.clone());
        Ok(names)
    }

    /// Drop the in-process copy. The next `names()` call goes back to the store.
    pub async fn invalidate(&self) {
        *self.names.lock().await = None;
    }

    /// Look up the id for a canonical name through the external source.
    pub async fn entity_id(&self, canonical_name: &str) -> Result<Option<EntityId>> {
        self.source.entity_id(canonical_name).await
    }

    async fn load_from_store(&self) -> Option<Vec<String>> {
        let raw = match self.store.get(DIRECTORY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Player directory read failed, falling back to source");
                return None;
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(names) if !names.is_empty() => Some(names),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Stored player directory is corrupt, refetching");
                None
            }
        }
    }
}
