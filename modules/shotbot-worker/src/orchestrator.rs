use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;

use shotbot_common::{Comment, EntityMatch, MarkPolicy, Query, ResultEntry};

use crate::cache::{ArtifactCache, CacheKey};
use crate::dedup::DedupStore;
use crate::directory::EntityDirectory;
use crate::extractor::{QueryExtractor, MAX_QUERY_SIZE_PER_COMMENT};
use crate::reply;
use crate::resolver::{EntityResolver, ResolveError};
use crate::traits::{
    ChartGenerator, CommentSource, EntitySource, KeyValueStore, ReplySink, Uploader,
};

/// Everything the orchestrator talks to, constructed once by the caller.
#[derive(TypedBuilder)]
pub struct BotDeps {
    pub comments: Arc<dyn CommentSource>,
    pub replies: Arc<dyn ReplySink>,
    pub entities: Arc<dyn EntitySource>,
    pub generator: Arc<dyn ChartGenerator>,
    pub uploader: Arc<dyn Uploader>,
    /// Shared by the artifact cache, dedup markers and the stored directory.
    pub store: Arc<dyn KeyValueStore>,
    #[builder(default = Duration::from_secs(120))]
    pub generate_timeout: Duration,
    #[builder(default = Duration::from_secs(60))]
    pub upload_timeout: Duration,
    #[builder(default)]
    pub mark_policy: MarkPolicy,
    #[builder(default = MAX_QUERY_SIZE_PER_COMMENT)]
    pub max_queries_per_comment: usize,
}

/// Outcome counts for one pass over the comment window.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IterationStats {
    pub comments_seen: u32,
    pub already_processed: u32,
    pub queries: u32,
    pub unresolved: u32,
    pub lookup_failures: u32,
    pub cache_hits: u32,
    pub charts_uploaded: u32,
    pub no_data: u32,
    pub generate_failures: u32,
    pub upload_failures: u32,
    pub timeouts: u32,
    pub replies_posted: u32,
    pub reply_failures: u32,
    pub marked_processed: u32,
}

impl fmt::Display for IterationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Iteration Complete ===")?;
        writeln!(f, "Comments seen:      {}", self.comments_seen)?;
        writeln!(f, "Already processed:  {}", self.already_processed)?;
        writeln!(f, "Queries:            {}", self.queries)?;
        writeln!(f, "Unresolved:         {}", self.unresolved)?;
        writeln!(f, "Lookup failures:    {}", self.lookup_failures)?;
        writeln!(f, "Cache hits:         {}", self.cache_hits)?;
        writeln!(f, "Charts uploaded:    {}", self.charts_uploaded)?;
        writeln!(f, "No data:            {}", self.no_data)?;
        writeln!(f, "Generate failures:  {}", self.generate_failures)?;
        writeln!(f, "Upload failures:    {}", self.upload_failures)?;
        writeln!(f, "Timeouts:           {}", self.timeouts)?;
        writeln!(f, "Replies posted:     {}", self.replies_posted)?;
        writeln!(f, "Reply failures:     {}", self.reply_failures)?;
        write!(f, "Marked processed:   {}", self.marked_processed)
    }
}

enum Delivery {
    NothingToSend,
    Posted,
    Failed,
}

/// Drives polling iterations: dedup, extract, resolve, cache or generate,
/// upload, reply, mark.
pub struct RequestOrchestrator {
    comments: Arc<dyn CommentSource>,
    replies: Arc<dyn ReplySink>,
    generator: Arc<dyn ChartGenerator>,
    uploader: Arc<dyn Uploader>,
    resolver: EntityResolver,
    cache: ArtifactCache,
    dedup: DedupStore,
    extractor: QueryExtractor,
    generate_timeout: Duration,
    upload_timeout: Duration,
    mark_policy: MarkPolicy,
}

impl RequestOrchestrator {
    pub fn new(deps: BotDeps) -> Self {
        let directory = Arc::new(EntityDirectory::new(deps.entities, deps.store.clone()));
        Self {
            comments: deps.comments,
            replies: deps.replies,
            generator: deps.generator,
            uploader: deps.uploader,
            resolver: EntityResolver::new(directory),
            cache: ArtifactCache::new(deps.store.clone()),
            dedup: DedupStore::new(deps.store),
            extractor: QueryExtractor::new(deps.max_queries_per_comment),
            generate_timeout: deps.generate_timeout,
            upload_timeout: deps.upload_timeout,
            mark_policy: deps.mark_policy,
        }
    }

    /// Poll forever, sleeping `interval` between passes. Iteration errors are
    /// logged and the next pass starts after the usual sleep.
    pub async fn run(&self, interval: Duration) {
        loop {
            match self.run_iteration().await {
                Ok(stats) => info!("{stats}"),
                Err(e) => error!(error = %e, "Iteration failed"),
            }
            debug!(secs = interval.as_secs(), "Sleeping until next poll");
            tokio::time::sleep(interval).await;
        }
    }

    pub async fn run_iteration(&self) -> Result<IterationStats> {
        self.run_iteration_at(Local::now().date_naive()).await
    }

    /// One pass over the current comment window, with cache keys dated `today`.
    ///
    /// Fails only when the comment source or the entity directory is
    /// unavailable. The comment being processed at that point stays unmarked.
    pub async fn run_iteration_at(&self, today: NaiveDate) -> Result<IterationStats> {
        let mut stats = IterationStats::default();
        let comments = self
            .comments
            .comments()
            .await
            .context("Failed to fetch comments")?;

        for comment in &comments {
            stats.comments_seen += 1;
            if self.dedup.is_processed(&comment.id).await {
                stats.already_processed += 1;
                continue;
            }
            self.process_comment(comment, today, &mut stats).await?;
        }

        Ok(stats)
    }

    async fn process_comment(
        &self,
        comment: &Comment,
        today: NaiveDate,
        stats: &mut IterationStats,
    ) -> Result<()> {
        let queries = self.extractor.extract(&comment.body);
        if queries.is_empty() {
            self.mark(&comment.id, stats).await;
            return Ok(());
        }

        info!(comment_id = %comment.id, queries = queries.len(), "Found requests");
        stats.queries += queries.len() as u32;

        let mut entries = Vec::new();
        for query in &queries {
            if let Some(entry) = self.answer_query(query, today, stats).await? {
                entries.push(entry);
            }
        }

        let delivery = if entries.is_empty() {
            debug!(comment_id = %comment.id, "No results, not replying");
            Delivery::NothingToSend
        } else {
            let body = reply::compose(&entries, self.extractor.max_queries());
            match self.replies.reply(&comment.id, &body).await {
                Ok(()) => {
                    info!(comment_id = %comment.id, results = entries.len(), "Replied");
                    stats.replies_posted += 1;
                    Delivery::Posted
                }
                Err(e) => {
                    error!(comment_id = %comment.id, error = %e, "Failed to post reply");
                    stats.reply_failures += 1;
                    Delivery::Failed
                }
            }
        };

        match (self.mark_policy, delivery) {
            (MarkPolicy::AfterDelivery, Delivery::Failed) => {
                info!(comment_id = %comment.id, "Leaving comment unmarked for retry");
            }
            _ => self.mark(&comment.id, stats).await,
        }
        Ok(())
    }

    /// Produce one result entry, or `None` when the query is skipped.
    /// Errors only when the entity directory is unavailable.
    async fn answer_query(
        &self,
        query: &Query,
        today: NaiveDate,
        stats: &mut IterationStats,
    ) -> Result<Option<ResultEntry>> {
        let entity = match self.resolver.resolve(&query.raw_text).await {
            Ok(Some(entity)) => entity,
            Ok(None) => {
                debug!(query = query.raw_text.as_str(), "Unresolved query");
                stats.unresolved += 1;
                return Ok(None);
            }
            Err(ResolveError::Directory(e)) => return Err(e),
            Err(e @ ResolveError::Lookup { .. }) => {
                warn!(query = query.raw_text.as_str(), error = %e, "Skipping query");
                stats.lookup_failures += 1;
                return Ok(None);
            }
        };
        info!(
            query = query.raw_text.as_str(),
            name = entity.canonical_name.as_str(),
            entity_id = %entity.entity_id,
            "Best match"
        );

        let label = entity.display_name();
        let key = CacheKey::new(entity.entity_id, query.kind, today);
        if let Some(url) = self.cache.get(&key).await {
            stats.cache_hits += 1;
            self.cache.put(&key, &url).await;
            return Ok(Some(ResultEntry::new(label, url)));
        }

        let Some(path) = self.generate(&entity, query, stats).await else {
            return Ok(None);
        };
        let Some(url) = self.upload(&path, stats).await else {
            return Ok(None);
        };

        stats.charts_uploaded += 1;
        self.cache.put(&key, &url).await;
        Ok(Some(ResultEntry::new(label, url)))
    }

    async fn generate(
        &self,
        entity: &EntityMatch,
        query: &Query,
        stats: &mut IterationStats,
    ) -> Option<PathBuf> {
        let generation = self.generator.generate(entity, query.kind);
        match tokio::time::timeout(self.generate_timeout, generation).await {
            Ok(Ok(Some(path))) => Some(path),
            Ok(Ok(None)) => {
                info!(name = entity.canonical_name.as_str(), kind = %query.kind, "No shot data, skipping");
                stats.no_data += 1;
                None
            }
            Ok(Err(e)) => {
                error!(name = entity.canonical_name.as_str(), error = %e, "Chart generation failed");
                stats.generate_failures += 1;
                None
            }
            Err(_) => {
                warn!(
                    name = entity.canonical_name.as_str(),
                    timeout_secs = self.generate_timeout.as_secs(),
                    "Chart generation timed out"
                );
                stats.timeouts += 1;
                None
            }
        }
    }

    async fn upload(&self, path: &std::path::Path, stats: &mut IterationStats) -> Option<String> {
        match tokio::time::timeout(self.upload_timeout, self.uploader.upload(path)).await {
            Ok(Ok(url)) => {
                info!(path = %path.display(), url = url.as_str(), "Uploaded chart");
                Some(url)
            }
            Ok(Err(e)) => {
                error!(path = %path.display(), error = %e, "Upload failed");
                stats.upload_failures += 1;
                None
            }
            Err(_) => {
                warn!(
                    path = %path.display(),
                    timeout_secs = self.upload_timeout.as_secs(),
                    "Upload timed out"
                );
                stats.timeouts += 1;
                None
            }
        }
    }

    async fn mark(&self, comment_id: &str, stats: &mut IterationStats) {
        self.dedup.mark_processed(comment_id).await;
        stats.marked_processed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_summary_lists_every_counter() {
        let stats = IterationStats {
            comments_seen: 3,
            replies_posted: 1,
            timeouts: 2,
            ..Default::default()
        };
        let summary = stats.to_string();
        assert!(summary.contains("Comments seen:      3"));
        assert!(summary.contains("Replies posted:     1"));
        assert!(summary.contains("Timeouts:           2"));
        assert!(summary.ends_with("Marked processed:   0"));
    }
}
