//! Failures talking to the search engine

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Engine returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Request to the search engine timed out")]
    Timeout,

    #[error("Could not decode engine response: {0}")]
    Decode(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e)
        }
    }
}

impl BackendError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Transport(_) => "transport",
            Self::Timeout => "timeout",
            Self::Decode(_) => "decode",
            Self::Engine(_) => "engine",
        }
    }

    /// Message to show the user.
    ///
    /// Prefers the engine's `error.msg` when the body is a structured error
    /// envelope, otherwise the raw failure text. Never empty.
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Http { body, .. } => {
                extract_error_message(body).unwrap_or_else(|| self.to_string())
            }
            Self::Engine(msg) => msg.clone(),
            other => other.to_string(),
        };
        if message.trim().is_empty() {
            self.to_string()
        } else {
            message
        }
    }
}

/// Pull `error.msg` out of an engine error body
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    error_message_of(&value)
}

/// `error.msg` of an already decoded body; a bare string `error` also counts
pub fn error_message_of(value: &Value) -> Option<String> {
    let error = value.get("error")?;
    let msg = match error {
        Value::String(s) => s.clone(),
        Value::Object(_) => error.get("msg")?.as_str()?.to_string(),
        _ => return None,
    };
    (!msg.trim().is_empty()).then_some(msg)
}
