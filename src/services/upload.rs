//! Image upload — external media API client behind an object-safe trait.
//!
//! DESIGN
//! ======
//! Profile pictures are stored by an external Cloudinary-style media service;
//! the database only keeps the resulting URL and public id. Handlers depend
//! on the [`ImageUpload`] trait so tests can substitute a mock, and the real
//! client is optional at startup: without credentials the server runs with
//! uploads disabled.

use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Request(String),
    #[error("upload api error: {0}")]
    Api(String),
}

/// Result of a successful upload.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UploadedImage {
    #[serde(rename = "secure_url")]
    pub url: String,
    pub public_id: String,
}

/// Media upload collaborator. Object-safe so state can hold `Arc<dyn ImageUpload>`.
#[async_trait::async_trait]
pub trait ImageUpload: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<UploadedImage, UploadError>;
}

/// Upload API credentials loaded from environment.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl UploadConfig {
    /// Load from `MEDIA_CLOUD_NAME`, `MEDIA_API_KEY`, `MEDIA_API_SECRET`.
    /// Returns `None` if any are missing (uploads will be disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let cloud_name = std::env::var("MEDIA_CLOUD_NAME").ok()?;
        let api_key = std::env::var("MEDIA_API_KEY").ok()?;
        let api_secret = std::env::var("MEDIA_API_SECRET").ok()?;
        Some(Self { cloud_name, api_key, api_secret })
    }
}

/// Reqwest-backed uploader for the external media API.
pub struct CloudUploader {
    config: UploadConfig,
    client: reqwest::Client,
}

impl CloudUploader {
    #[must_use]
    pub fn new(config: UploadConfig) -> Self {
        Self { config, client: reqwest::Client::new() }
    }

    fn upload_url(&self) -> String {
        format!("https://api.cloudinary.com/v1_1/{}/image/upload", self.config.cloud_name)
    }
}

/// Canonical parameter string covered by the request signature.
#[must_use]
pub(crate) fn signing_payload(public_id: &str, timestamp: u64) -> String {
    format!("public_id={public_id}&timestamp={timestamp}")
}

/// Hex sha256 over the payload plus the API secret.
#[must_use]
pub(crate) fn sign_request(payload: &str, api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(api_secret.as_bytes());
    let bytes = hasher.finalize();
    bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
}

/// Derive a stable public id from an uploaded filename: extension stripped,
/// non-alphanumeric runs collapsed to `_`.
#[must_use]
pub(crate) fn public_id_from_filename(filename: &str) -> String {
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _ext)| stem);
    let mut out = String::with_capacity(stem.len());
    let mut last_was_sep = true;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    let trimmed = out.trim_end_matches('_');
    if trimmed.is_empty() { "image".to_owned() } else { trimmed.to_owned() }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[async_trait::async_trait]
impl ImageUpload for CloudUploader {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<UploadedImage, UploadError> {
        let public_id = public_id_from_filename(filename);
        let timestamp = unix_timestamp();
        let signature = sign_request(&signing_payload(&public_id, timestamp), &self.config.api_secret);

        let form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(filename.to_owned()))
            .text("api_key", self.config.api_key.clone())
            .text("public_id", public_id)
            .text("timestamp", timestamp.to_string())
            .text("signature", signature);

        let resp = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(UploadError::Api(format!("{status}: {body}")));
        }

        resp.json::<UploadedImage>()
            .await
            .map_err(|e| UploadError::Api(e.to_string()))
    }
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
