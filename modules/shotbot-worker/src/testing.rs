// Test mocks for the bot pipeline.
//
// One mock per trait boundary:
// - MockCommentSource (CommentSource) - fixed comment window, replaceable between polls
// - RecordingReplySink (ReplySink) - records every posted reply, can be told to fail
// - MockEntitySource (EntitySource) - in-memory roster, counts bulk fetches
// - MockChartGenerator (ChartGenerator) - fake artifact paths, per-player no-data/failure
// - MockUploader (Uploader) - deterministic URLs derived from the artifact file name
// - FaultyStore (KeyValueStore) - MemoryStore with switchable read/write failures
//
// Plus `TestBot`, which wires all of them into a RequestOrchestrator.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use shotbot_common::{ChartKind, Comment, EntityId, EntityMatch, MarkPolicy};

use crate::extractor::MAX_QUERY_SIZE_PER_COMMENT;
use crate::orchestrator::{BotDeps, RequestOrchestrator};
use crate::store::MemoryStore;
use crate::traits::{
    ChartGenerator, CommentSource, EntitySource, KeyValueStore, ReplySink, Uploader,
};

// ---------------------------------------------------------------------------
// MockCommentSource
// ---------------------------------------------------------------------------

/// Returns the same window on every poll until `set_comments` replaces it.
#[derive(Default)]
pub struct MockCommentSource {
    comments: Mutex<Vec<Comment>>,
    unreachable: AtomicBool,
}

impl MockCommentSource {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self {
            comments: Mutex::new(comments),
            unreachable: AtomicBool::new(false),
        }
    }

    pub fn set_comments(&self, comments: Vec<Comment>) {
        *self.comments.lock().unwrap() = comments;
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl CommentSource for MockCommentSource {
    async fn comments(&self) -> Result<Vec<Comment>> {
        if self.unreachable.load(Ordering::SeqCst) {
            bail!("MockCommentSource: unreachable");
        }
        Ok(self.comments.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// RecordingReplySink
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedReply {
    pub comment_id: String,
    pub body: String,
}

/// Records replies. While `failing` is set every post errors and nothing is recorded.
#[derive(Default)]
pub struct RecordingReplySink {
    posted: Mutex<Vec<PostedReply>>,
    attempts: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingReplySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn posted(&self) -> Vec<PostedReply> {
        self.posted.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplySink for RecordingReplySink {
    async fn reply(&self, comment_id: &str, body: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            bail!("RecordingReplySink: post rejected for {comment_id}");
        }
        self.posted.lock().unwrap().push(PostedReply {
            comment_id: comment_id.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockEntitySource
// ---------------------------------------------------------------------------

/// In-memory roster. Builder pattern: `.unreachable()`, `.failing_lookup()`.
pub struct MockEntitySource {
    players: Vec<(String, EntityId)>,
    unreachable: bool,
    failing_lookups: HashSet<String>,
    fetches: AtomicUsize,
}

impl MockEntitySource {
    pub fn new(players: &[(&str, u64)]) -> Self {
        Self {
            players: players
                .iter()
                .map(|(name, id)| (name.to_string(), EntityId(*id)))
                .collect(),
            unreachable: false,
            failing_lookups: HashSet::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// A slice of the real league roster, in "Last, First" form.
    pub fn nba() -> Self {
        Self::new(&[
            ("Abdul-Jabbar, Kareem", 76003),
            ("Antetokounmpo, Giannis", 203507),
            ("Bryant, Kobe", 977),
            ("Curry, Seth", 203552),
            ("Curry, Stephen", 201939),
            ("Davis, Anthony", 203076),
            ("Duncan, Tim", 1495),
            ("Durant, Kevin", 201142),
            ("Green, Draymond", 203110),
            ("Harden, James", 201935),
            ("James, LeBron", 2544),
            ("Johnson, Magic", 77142),
            ("Leonard, Kawhi", 202695),
            ("Nene", 2403),
            ("Nowitzki, Dirk", 1717),
            ("Paul, Chris", 101108),
            ("Thompson, Klay", 202691),
            ("Westbrook, Russell", 201566),
        ])
    }

    /// Bulk fetches fail.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Id lookups for `canonical_name` fail.
    pub fn failing_lookup(mut self, canonical_name: &str) -> Self {
        self.failing_lookups.insert(canonical_name.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntitySource for MockEntitySource {
    async fn all_names(&self) -> Result<Vec<String>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            bail!("MockEntitySource: roster unreachable");
        }
        Ok(self.players.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn entity_id(&self, canonical_name: &str) -> Result<Option<EntityId>> {
        if self.failing_lookups.contains(canonical_name) {
            bail!("MockEntitySource: lookup failed for {canonical_name}");
        }
        Ok(self
            .players
            .iter()
            .find(|(name, _)| name == canonical_name)
            .map(|(_, id)| *id))
    }
}

// ---------------------------------------------------------------------------
// MockChartGenerator
// ---------------------------------------------------------------------------

/// Returns `charts/{id}-{kind}.png` without touching the filesystem.
/// Builder pattern: `.no_data_for()`, `.failing_for()`, `.with_delay()`.
#[derive(Default)]
pub struct MockChartGenerator {
    no_data: HashSet<EntityId>,
    failing: HashSet<EntityId>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(EntityId, ChartKind)>>,
}

impl MockChartGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_data_for(mut self, id: u64) -> Self {
        self.no_data.insert(EntityId(id));
        self
    }

    pub fn failing_for(mut self, id: u64) -> Self {
        self.failing.insert(EntityId(id));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(EntityId, ChartKind)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChartGenerator for MockChartGenerator {
    async fn generate(&self, entity: &EntityMatch, kind: ChartKind) -> Result<Option<PathBuf>> {
        self.calls.lock().unwrap().push((entity.entity_id, kind));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&entity.entity_id) {
            bail!("MockChartGenerator: renderer crashed for {}", entity.entity_id);
        }
        if self.no_data.contains(&entity.entity_id) {
            return Ok(None);
        }
        Ok(Some(artifact_path(entity.entity_id, kind)))
    }
}

/// Path the mock generator returns for a player and kind.
pub fn artifact_path(id: EntityId, kind: ChartKind) -> PathBuf {
    PathBuf::from(format!("charts/{id}-{kind}.png"))
}

// ---------------------------------------------------------------------------
// MockUploader
// ---------------------------------------------------------------------------

/// Uploads succeed with `https://i.imgur.com/{file stem}.png`.
#[derive(Default)]
pub struct MockUploader {
    failing_stems: HashSet<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail uploads of the artifact for this player and kind.
    pub fn failing_for(mut self, id: u64, kind: ChartKind) -> Self {
        self.failing_stems.insert(format!("{id}-{kind}"));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Uploader for MockUploader {
    async fn upload(&self, path: &Path) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing_stems.contains(&stem) {
            bail!("MockUploader: upload rejected for {stem}");
        }
        Ok(uploaded_url(&stem))
    }
}

pub fn uploaded_url(stem: &str) -> String {
    format!("https://i.imgur.com/{stem}.png")
}

// ---------------------------------------------------------------------------
// FaultyStore
// ---------------------------------------------------------------------------

/// `MemoryStore` whose reads and writes can be switched to fail.
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl KeyValueStore for FaultyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("FaultyStore: read of {key} failed");
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("FaultyStore: write of {key} failed");
        }
        self.inner.set(key, value).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TestBot
// ---------------------------------------------------------------------------

/// All mocks wired into one orchestrator, with handles kept for assertions.
pub struct TestBot {
    pub comments: Arc<MockCommentSource>,
    pub replies: Arc<RecordingReplySink>,
    pub entities: Arc<MockEntitySource>,
    pub generator: Arc<MockChartGenerator>,
    pub uploader: Arc<MockUploader>,
    pub store: Arc<FaultyStore>,
    pub orchestrator: RequestOrchestrator,
}

/// Builder pattern: swap in configured mocks, then `.build()`.
pub struct TestBotBuilder {
    comments: Vec<Comment>,
    entities: MockEntitySource,
    generator: MockChartGenerator,
    uploader: MockUploader,
    store: Arc<FaultyStore>,
    mark_policy: MarkPolicy,
    generate_timeout: Duration,
    upload_timeout: Duration,
    max_queries_per_comment: usize,
}

impl TestBot {
    pub fn builder() -> TestBotBuilder {
        TestBotBuilder {
            comments: Vec::new(),
            entities: MockEntitySource::nba(),
            generator: MockChartGenerator::new(),
            uploader: MockUploader::new(),
            store: Arc::new(FaultyStore::new()),
            mark_policy: MarkPolicy::default(),
            generate_timeout: Duration::from_secs(5),
            upload_timeout: Duration::from_secs(5),
            max_queries_per_comment: MAX_QUERY_SIZE_PER_COMMENT,
        }
    }
}

impl TestBotBuilder {
    pub fn comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }

    pub fn entities(mut self, entities: MockEntitySource) -> Self {
        self.entities = entities;
        self
    }

    pub fn generator(mut self, generator: MockChartGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn uploader(mut self, uploader: MockUploader) -> Self {
        self.uploader = uploader;
        self
    }

    /// Share a store with another bot, e.g. to simulate a restart.
    pub fn store(mut self, store: Arc<FaultyStore>) -> Self {
        self.store = store;
        self
    }

    pub fn mark_policy(mut self, mark_policy: MarkPolicy) -> Self {
        self.mark_policy = mark_policy;
        self
    }

    pub fn generate_timeout(mut self, timeout: Duration) -> Self {
        self.generate_timeout = timeout;
        self
    }

    pub fn upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    pub fn max_queries_per_comment(mut self, max: usize) -> Self {
        self.max_queries_per_comment = max;
        self
    }

    pub fn build(self) -> TestBot {
        let comments = Arc::new(MockCommentSource::new(self.comments));
        let replies = Arc::new(RecordingReplySink::new());
        let entities = Arc::new(self.entities);
        let generator = Arc::new(self.generator);
        let uploader = Arc::new(self.uploader);

        let deps = BotDeps::builder()
            .comments(comments.clone())
            .replies(replies.clone())
            .entities(entities.clone())
            .generator(generator.clone())
            .uploader(uploader.clone())
            .store(self.store.clone())
            .generate_timeout(self.generate_timeout)
            .upload_timeout(self.upload_timeout)
            .mark_policy(self.mark_policy)
            .max_queries_per_comment(self.max_queries_per_comment)
            .build();

        TestBot {
            comments,
            replies,
            entities,
            generator,
            uploader,
            store: self.store,
            orchestrator: RequestOrchestrator::new(deps),
        }
    }
}
