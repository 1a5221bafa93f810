// Trait abstractions for the collaborators the orchestrator talks to.
//
// CommentSource / ReplySink - the social platform (pull comments, post replies).
// EntitySource - the canonical player directory and id lookup.
// ChartGenerator / Uploader - produce an artifact and host it.
// KeyValueStore - backing store shared by the artifact cache, dedup markers
//   and the memoized directory.
//
// Production impls live next to the clients they wrap; in-memory mocks live
// in `testing.rs`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use shotbot_common::{ChartKind, Comment, EntityId, EntityMatch};

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CommentSource: Send + Sync {
    /// The current window of comments. The same comment may show up on consecutive polls.
    async fn comments(&self) -> Result<Vec<Comment>>;
}

#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Post `body` as a reply to the comment with `comment_id`.
    async fn reply(&self, comment_id: &str, body: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Every canonical "Last, First" name, in one bulk call.
    async fn all_names(&self) -> Result<Vec<String>>;

    /// Map a canonical name to its id. `None` when the name is unknown.
    async fn entity_id(&self, canonical_name: &str) -> Result<Option<EntityId>>;
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ChartGenerator: Send + Sync {
    /// Render a chart. `Ok(None)` means there is no data for this player.
    async fn generate(&self, entity: &EntityMatch, kind: ChartKind) -> Result<Option<PathBuf>>;
}

#[async_trait]
pub trait Uploader: Send + Sync {
    /// Host a local file and return its public URL.
    async fn upload(&self, path: &Path) -> Result<String>;
}

#[async_trait]
impl Uploader for imgur_client::ImgurClient {
    async fn upload(&self, path: &Path) -> Result<String> {
        let image = self.upload_from_path(path).await?;
        Ok(image.link)
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
