use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body the server sends alongside a failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection, DNS or timeout failures.
    Transport,
    /// Non-2xx status, `error` field, or a body that does not parse.
    Response,
    /// Input rejected before any request was made.
    Validation,
}

#[derive(Debug, Error)]
#[error("unknown screen id: {0}")]
pub struct UnknownScreen(pub String);
