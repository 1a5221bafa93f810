use serde::Deserialize;

/// Script-app credentials for the OAuth password grant.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

// --- OAuth ---

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

// --- Listings ---

#[derive(Debug, Deserialize)]
pub(crate) struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData<T> {
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thing<T> {
    pub kind: String,
    pub data: T,
}

/// A comment as returned by `/r/{subreddit}/comments`.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditComment {
    /// Base-36 id without the `t1_` prefix.
    pub id: String,
    /// Fullname, e.g. `t1_abc123`.
    pub name: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub link_id: Option<String>,
    #[serde(default)]
    pub subreddit: Option<String>,
    #[serde(default)]
    pub created_utc: Option<f64>,
}

// --- Comment submission ---

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    pub json: SubmitJson,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitJson {
    #[serde(default)]
    pub errors: Vec<Vec<serde_json::Value>>,
}
