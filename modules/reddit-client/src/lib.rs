pub mod error;
pub mod types;

pub use error::{RedditError, Result};
pub use types::{Credentials, RedditComment};

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use types::{Listing, SubmitResponse, TokenResponse};

const AUTH_BASE_URL: &str = "https://www.reddit.com";
const API_BASE_URL: &str = "https://oauth.reddit.com";

/// Comments requested per listing call (Reddit's max page size).
const COMMENT_PAGE_SIZE: u32 = 100;

/// Refresh the token this long before Reddit says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct AccessToken {
    value: String,
    expires_at: Instant,
}

pub struct RedditClient {
    client: reqwest::Client,
    credentials: Credentials,
    auth_base_url: String,
    api_base_url: String,
    token: Mutex<Option<AccessToken>>,
}

impl RedditClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            auth_base_url: AUTH_BASE_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
            token: Mutex::new(None),
        }
    }

    /// Point both the OAuth and API endpoints at another host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base = base_url.into().trim_end_matches('/').to_string();
        self.auth_base_url = base.clone();
        self.api_base_url = base;
        self
    }

    /// Return a valid bearer token, running the password grant when the cached one is stale.
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!(username = %self.credentials.username, "Requesting Reddit access token");

        let url = format!("{}/api/v1/access_token", self.auth_base_url);
        let resp = self
            .client
            .post(&url)
            .header("User-Agent", &self.credentials.user_agent)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RedditError::Auth(format!("status {}: {}", status.as_u16(), body)));
        }

        // Reddit reports bad credentials as 200 with an `error` field.
        let token: TokenResponse = resp.json().await?;
        let value = match (token.access_token, token.error) {
            (Some(value), None) => value,
            (_, Some(error)) => return Err(RedditError::Auth(error)),
            (None, None) => return Err(RedditError::Auth("no access_token in response".into())),
        };

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        *guard = Some(AccessToken {
            value: value.clone(),
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        });
        Ok(value)
    }

    /// Fetch the newest comments posted anywhere in a subreddit.
    pub async fn subreddit_comments(&self, subreddit: &str) -> Result<Vec<RedditComment>> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/r/{}/comments?limit={}&raw_json=1",
            self.api_base_url, subreddit, COMMENT_PAGE_SIZE
        );
        let resp = self
            .client
            .get(&url)
            .header("User-Agent", &self.credentials.user_agent)
            .bearer_auth(&token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RedditError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let listing: Listing<RedditComment> = resp.json().await?;
        let comments: Vec<RedditComment> = listing
            .data
            .children
            .into_iter()
            .filter(|thing| thing.kind == "t1")
            .map(|thing| thing.data)
            .collect();

        tracing::debug!(subreddit, count = comments.len(), "Fetched comments");
        Ok(comments)
    }

    /// Post a reply to a comment. `comment_id` may be bare (`abc123`) or a fullname (`t1_abc123`).
    pub async fn reply(&self, comment_id: &str, text: &str) -> Result<()> {
        let token = self.access_token().await?;
        let thing_id = if comment_id.starts_with("t1_") {
            comment_id.to_string()
        } else {
            format!("t1_{comment_id}")
        };

        let url = format!("{}/api/comment", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .header("User-Agent", &self.credentials.user_agent)
            .bearer_auth(&token)
            .form(&[
                ("api_type", "json"),
                ("thing_id", thing_id.as_str()),
                ("text", text),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RedditError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let submit: SubmitResponse = resp.json().await?;
        if !submit.json.errors.is_empty() {
            let message = submit
                .json
                .errors
                .iter()
                .map(|e| {
                    e.iter()
                        .filter_map(|v| v.as_str())
                        .collect::<Vec<_>>()
                        .join(": ")
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(RedditError::Rejected(message));
        }

        tracing::info!(thing_id, "Reply posted");
        Ok(())
    }
}
