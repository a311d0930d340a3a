use std::path::PathBuf;

use shared::error::FailureKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with status {status}")]
    Status { status: u16 },
    #[error("{0}")]
    Server(String),
    #[error("malformed server response: {0}")]
    Malformed(String),
    #[error("unsupported file type {mime_type} for {filename}; expected PNG or JPEG")]
    UnsupportedType { filename: String, mime_type: String },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Http(err) if err.is_decode() => FailureKind::Response,
            ClientError::Http(err) if err.is_status() => FailureKind::Response,
            ClientError::Http(_) => FailureKind::Transport,
            ClientError::Status { .. } | ClientError::Server(_) | ClientError::Malformed(_) => {
                FailureKind::Response
            }
            ClientError::UnsupportedType { .. } | ClientError::Io { .. } => {
                FailureKind::Validation
            }
        }
    }

    /// The single message shown to the user for any failure.
    pub fn user_message(&self) -> String {
        format!("An error occurred: {self}")
    }
}
