use serde::Deserialize;

/// Envelope wrapping every Imgur API response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub data: T,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: u16,
}

/// Metadata for an uploaded image.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub id: String,
    pub link: String,
    #[serde(default)]
    pub deletehash: Option<String>,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Error payload. Imgur returns `error` either as a plain string or as an object
/// with a `message` field depending on the endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorData {
    pub error: serde_json::Value,
}

impl ErrorData {
    pub(crate) fn message(&self) -> String {
        match &self.error {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Object(map) => map
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| self.error.to_string()),
            other => other.to_string(),
        }
    }
}
