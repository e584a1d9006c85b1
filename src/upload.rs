//! Reference document upload.
//!
//! Thin collaborator around the core: one multipart POST per file, no
//! retry, no chunking. Success renders the backend's JSON confirmation;
//! failure carries the body's `detail` field when present.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use serde::Deserialize;
use tracing::info;

/// Fixed metadata literal sent alongside every upload.
pub const UPLOAD_METADATA: &str = "uploaded-from-frontend";

/// Backend confirmation for an accepted upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    /// `"ok"` when the document was indexed, `"empty"` when no text could
    /// be extracted.
    pub status: String,
    /// Number of indexed chunks, when the backend reports it.
    #[serde(default)]
    pub added_chunks: Option<usize>,
}

/// Uploads documents to the backend's `/upload` endpoint.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    url: String,
}

impl UploadClient {
    /// Create an upload client for the configured backend.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            url: config.upload_url(),
        }
    }

    /// Upload one document.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] when the request cannot be sent and
    /// [`ClientError::Upload`] for a non-success response, carrying the
    /// backend's `detail` message when the JSON body provides one.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadResponse> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_owned());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("metadata", UPLOAD_METADATA);

        let response = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Http(format!("upload request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Upload(detail_message(&body, status)));
        }

        let confirmation: UploadResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Upload(format!("invalid upload response: {e}")))?;
        info!(
            "uploaded {filename}: status={} chunks={:?}",
            confirmation.status, confirmation.added_chunks
        );
        Ok(confirmation)
    }

    /// Read a file from disk and upload it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the upload fails.
    pub async fn upload_path(&self, path: &std::path::Path) -> Result<UploadResponse> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document");
        self.upload(filename, bytes).await
    }
}

/// Extract the `detail` field from an error response body, falling back to
/// a generic message.
fn detail_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or_else(|| format!("upload failed with HTTP {}", status.as_u16()))
}
