use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImgurError>;

#[derive(Debug, Error)]
pub enum ImgurError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Failed to read image {path}: {message}")]
    Io { path: String, message: String },
}

impl ImgurError {
    /// HTTP status reported by Imgur, if the failure came from the API.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ImgurError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ImgurError {
    fn from(err: reqwest::Error) -> Self {
        ImgurError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ImgurError {
    fn from(err: serde_json::Error) -> Self {
        ImgurError::Parse(err.to_string())
    }
}
