//! Image intake shared by the file-picker and drag-and-drop channels.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::ClientError;

/// MIME types offered by the file picker's accept filter.
pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

pub fn is_accepted(mime_type: &str) -> bool {
    ACCEPTED_MIME_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(mime_type))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedImage {
    filename: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl PickedImage {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let mime_type = mime_guess::from_path(&filename)
            .first_raw()
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string();
        Self {
            filename,
            mime_type,
            bytes,
        }
    }

    pub async fn load(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(filename, bytes))
    }

    /// Loads a file and applies the picker's accept filter.
    pub async fn load_accepted(path: &Path) -> Result<Self, ClientError> {
        let image = Self::load(path).await?;
        image.ensure_accepted()?;
        Ok(image)
    }

    pub fn ensure_accepted(&self) -> Result<(), ClientError> {
        if is_accepted(&self.mime_type) {
            Ok(())
        } else {
            Err(ClientError::UnsupportedType {
                filename: self.filename.clone(),
                mime_type: self.mime_type.clone(),
            })
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A `data:` URL over the bytes already in hand, so a displayed result
    /// never needs the image fetched back from the server.
    pub fn object_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}
