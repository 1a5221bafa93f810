use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use nba_stats_client::{Player, StatsClient};
use reddit_client::{RedditClient, RedditComment};
use shotbot_common::{Comment, EntityId};

use crate::traits::{CommentSource, EntitySource, ReplySink};

/// Comment stream and reply target for one subreddit.
pub struct SubredditFeed {
    client: Arc<RedditClient>,
    subreddit: String,
    skip_author: Option<String>,
}

impl SubredditFeed {
    pub fn new(client: Arc<RedditClient>, subreddit: impl Into<String>) -> Self {
        Self {
            client,
            subreddit: subreddit.into(),
            skip_author: None,
        }
    }

    /// Ignore comments written by this account (the bot's own replies).
    pub fn skip_author(mut self, author: impl Into<String>) -> Self {
        self.skip_author = Some(author.into());
        self
    }

    fn is_own(&self, comment: &RedditComment) -> bool {
        match (&self.skip_author, &comment.author) {
            (Some(own), Some(author)) => own.eq_ignore_ascii_case(author),
            _ => false,
        }
    }
}

#[async_trait]
impl CommentSource for SubredditFeed {
    async fn comments(&self) -> Result<Vec<Comment>> {
        let fetched = self.client.subreddit_comments(&self.subreddit).await?;
        let comments: Vec<Comment> = fetched
            .into_iter()
            .filter(|c| !self.is_own(c))
            .map(|c| Comment::new(c.id, c.body))
            .collect();
        debug!(subreddit = self.subreddit.as_str(), count = comments.len(), "Polled comments");
        Ok(comments)
    }
}

#[async_trait]
impl ReplySink for SubredditFeed {
    async fn reply(&self, comment_id: &str, body: &str) -> Result<()> {
        self.client.reply(comment_id, body).await?;
        Ok(())
    }
}

struct Roster {
    names: Vec<String>,
    ids: HashMap<String, EntityId>,
}

impl Roster {
    fn from_players(players: Vec<Player>) -> Self {
        let mut names = Vec::with_capacity(players.len());
        let mut ids = HashMap::with_capacity(players.len());
        for player in players {
            let name = player.display_last_comma_first;
            if name.trim().is_empty() || ids.contains_key(&name) {
                continue;
            }
            ids.insert(name.clone(), EntityId(player.person_id));
            names.push(name);
        }
        Self { names, ids }
    }
}

/// Player names and ids from stats.nba.com.
///
/// Both operations are served from one `commonallplayers` call, fetched on
/// first use. A failed fetch is retried on the next call.
pub struct StatsEntitySource {
    client: StatsClient,
    roster: OnceCell<Roster>,
}

impl StatsEntitySource {
    pub fn new(client: StatsClient) -> Self {
        Self {
            client,
            roster: OnceCell::new(),
        }
    }

    async fn roster(&self) -> Result<&Roster> {
        let roster = self
            .roster
            .get_or_try_init(|| async {
                let players = self.client.all_players().await?;
                let roster = Roster::from_players(players);
                info!(players = roster.names.len(), "Loaded player roster");
                Ok::<_, anyhow::Error>(roster)
            })
            .await?;
        Ok(roster)
    }
}

#[async_trait]
impl EntitySource for StatsEntitySource {
    async fn all_names(&self) -> Result<Vec<String>> {
        Ok(self.roster().await?.names.clone())
    }

    async fn entity_id(&self, canonical_name: &str) -> Result<Option<EntityId>> {
        Ok(self.roster().await?.ids.get(canonical_name).copied())
    }
}
