use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, COOKIE},
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::ClassificationResult,
    protocol::{HistoryEntry, UploadResponse},
};
use tracing::{debug, info};

pub mod coordinator;
pub mod error;
pub mod events;
pub mod history;
pub mod image;
pub mod notifications;
pub mod state;
pub mod view;

pub use coordinator::UploadCoordinator;
pub use error::ClientError;
pub use events::{ClickTarget, Effect, Key, UiEvent};
pub use image::PickedImage;
pub use state::{AppState, SessionContext};
pub use view::ViewBinding;

const UPLOAD_FIELD: &str = "file";

#[async_trait]
pub trait DetectionApi: Send + Sync {
    async fn upload(&self, image: &PickedImage) -> Result<ClassificationResult, ClientError>;
    async fn history(&self) -> Result<Vec<HistoryEntry>, ClientError>;
}

/// Native file-selection affordance. Returns `None` when the user cancels.
pub trait FilePicker: Send {
    fn pick(&mut self, accept: &[&str]) -> Option<PathBuf>;
}

/// Picker that never yields a file; for sessions driven purely by drops.
pub struct NoFilePicker;

impl FilePicker for NoFilePicker {
    fn pick(&mut self, _accept: &[&str]) -> Option<PathBuf> {
        None
    }
}

pub struct DetectionClient {
    http: Client,
    server_url: String,
}

impl DetectionClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: normalize_server_url(server_url.into()),
        }
    }

    /// Sends `cookie` with every request so the server sees the
    /// authenticated session.
    pub fn with_session_cookie(
        server_url: impl Into<String>,
        cookie: &str,
    ) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(cookie)
            .map_err(|e| ClientError::Malformed(format!("invalid session cookie: {e}")))?;
        headers.insert(COOKIE, value);
        let http = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            server_url: normalize_server_url(server_url.into()),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

fn normalize_server_url(raw: String) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Interprets an upload reply. An `error` field wins over the status code, a
/// non-2xx status without one is reported as such, and a 2xx body must carry
/// a result with confidence in `[0, 1]`.
pub(crate) fn parse_upload_response(
    status: u16,
    body: &[u8],
) -> Result<ClassificationResult, ClientError> {
    let success = (200..300).contains(&status);
    let response: UploadResponse = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(_) if !success => return Err(ClientError::Status { status }),
        Err(e) => return Err(ClientError::Malformed(e.to_string())),
    };

    if let Some(error) = response.error {
        return Err(ClientError::Server(error));
    }
    if !success {
        return Err(ClientError::Status { status });
    }

    let result = response
        .result
        .ok_or_else(|| ClientError::Malformed("response has no result".to_string()))?;
    if !result.has_valid_confidence() {
        return Err(ClientError::Malformed(format!(
            "confidence {} is outside [0, 1]",
            result.confidence
        )));
    }
    Ok(result)
}

#[async_trait]
impl DetectionApi for DetectionClient {
    async fn upload(&self, image: &PickedImage) -> Result<ClassificationResult, ClientError> {
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.filename().to_string())
            .mime_str(image.mime_type())?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        debug!(
            filename = image.filename(),
            size_bytes = image.bytes().len(),
            "uploading image"
        );
        let response = self
            .http
            .post(format!("{}/upload", self.server_url))
            .multipart(form)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        let result = parse_upload_response(status, &body)?;
        info!(
            label = %result.label,
            confidence = result.confidence,
            "classification received"
        );
        Ok(result)
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        let entries: Vec<HistoryEntry> = self
            .http
            .get(format!("{}/history", self.server_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = entries.len(), "history fetched");
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
