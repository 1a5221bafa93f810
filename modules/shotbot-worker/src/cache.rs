use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use shotbot_common::{ChartKind, EntityId};

use crate::traits::KeyValueStore;

/// Identifies one day's chart for one player and chart kind.
/// A new day is a new key, so yesterday's upload is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub entity_id: EntityId,
    pub kind: ChartKind,
    pub date: NaiveDate,
}

impl CacheKey {
    pub fn new(entity_id: EntityId, kind: ChartKind, date: NaiveDate) -> Self {
        Self {
            entity_id,
            kind,
            date,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.date.format("%Y-%m-%d"),
            self.entity_id,
            self.kind
        )
    }
}

/// Chart URL cache over the shared key-value store.
///
/// Store failures never reach the caller: a failed read is a miss and a
/// failed write is logged and dropped.
pub struct ArtifactCache {
    store: Arc<dyn KeyValueStore>,
}

impl ArtifactCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        let key = key.to_string();
        match self.store.get(&key).await {
            Ok(Some(url)) if !url.is_empty() => {
                debug!(key = %key, url = %url, "Artifact cache hit");
                Some(url)
            }
            Ok(_) => {
                debug!(key = %key, "Artifact cache miss");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Artifact cache read failed, treating as miss");
                None
            }
        }
    }

    pub async fn put(&self, key: &CacheKey, url: &str) {
        let key = key.to_string();
        if let Err(e) = self.store.set(&key, url).await {
            warn!(key = %key, error = %e, "Artifact cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn key_format_is_date_id_kind() {
        let key = CacheKey::new(EntityId(201939), ChartKind::Scatter, day(2024, 1, 1));
        assert_eq!(key.to_string(), "2024-01-01-201939-scatter");
    }

    #[tokio::test]
    async fn entries_do_not_carry_over_to_the_next_day() {
        let cache = ArtifactCache::new(Arc::new(MemoryStore::new()));
        let monday = CacheKey::new(EntityId(201939), ChartKind::Hex, day(2024, 1, 1));
        let tuesday = CacheKey::new(EntityId(201939), ChartKind::Hex, day(2024, 1, 2));

        cache.put(&monday, "https://i.imgur.com/a.png").await;
        assert_eq!(cache.get(&monday).await.as_deref(), Some("https://i.imgur.com/a.png"));
        assert_eq!(cache.get(&tuesday).await, None);
    }

    #[tokio::test]
    async fn kinds_are_cached_separately() {
        let cache = ArtifactCache::new(Arc::new(MemoryStore::new()));
        let scatter = CacheKey::new(EntityId(2544), ChartKind::Scatter, day(2024, 1, 1));
        let hex = CacheKey::new(EntityId(2544), ChartKind::Hex, day(2024, 1, 1));

        cache.put(&scatter, "https://i.imgur.com/s.png").await;
        assert_eq!(cache.get(&hex).await, None);
    }
}
