pub mod error;
pub mod types;

pub use error::{ImgurError, Result};
pub use types::UploadedImage;

use std::path::Path;

use reqwest::multipart::{Form, Part};
use types::{ApiResponse, ErrorData};

const BASE_URL: &str = "https://api.imgur.com/3";

pub struct ImgurClient {
    client: reqwest::Client,
    client_id: String,
    base_url: String,
}

impl ImgurClient {
    pub fn new(client_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Upload a local image anonymously. Returns the hosted image metadata.
    pub async fn upload_from_path(&self, path: &Path) -> Result<UploadedImage> {
        let bytes = tokio::fs::read(path).await.map_err(|e| ImgurError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.png".to_string());

        tracing::info!(path = %path.display(), size = bytes.len(), "Uploading image to Imgur");

        let form = Form::new()
            .part("image", Part::bytes(bytes).file_name(file_name))
            .text("type", "file");

        let url = format!("{}/image", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ImgurError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let api_resp: ApiResponse<UploadedImage> = resp.json().await?;
        if !api_resp.success {
            return Err(ImgurError::Api {
                status: api_resp.status,
                message: "upload reported success=false".to_string(),
            });
        }

        tracing::info!(id = %api_resp.data.id, link = %api_resp.data.link, "Imgur upload complete");
        Ok(api_resp.data)
    }
}

/// Pull the human-readable message out of an Imgur error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiResponse<ErrorData>>(body)
        .map(|r| r.data.message())
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_reads_string_and_object_forms() {
        let plain = r#"{"data":{"error":"File type invalid","request":"/3/image"},"success":false,"status":400}"#;
        assert_eq!(error_message(plain), "File type invalid");

        let nested = r#"{"data":{"error":{"code":1003,"message":"Rate limit"}},"success":false,"status":429}"#;
        assert_eq!(error_message(nested), "Rate limit");

        assert_eq!(error_message("<html>bad gateway</html>"), "<html>bad gateway</html>");
    }
}
