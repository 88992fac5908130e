use crate::backend::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Envelope status for this error. Zero is reserved for success.
    pub fn status(&self) -> i32 {
        match self {
            Self::NotFound(_) => 1,
            _ => -1,
        }
    }

    /// Human readable description for the UI.
    ///
    /// Backend failures use the engine's own message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(e) => e.user_message(),
            Self::NotFound(msg) if !msg.trim().is_empty() => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
