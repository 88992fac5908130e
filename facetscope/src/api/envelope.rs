use crate::error::{Error, Result};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Uniform `{status, message, ...}` reply of every operation.
///
/// `status` is 0 on success. Failures always carry a non-empty message and
/// no body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: i32,
    pub message: String,
    #[serde(flatten)]
    pub body: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: 0,
            message: String::new(),
            body: Some(body),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn error(err: &Error) -> Self {
        let mut message = err.user_message();
        if message.trim().is_empty() {
            message = "Unknown error".to_string();
        }
        Self {
            status: err.status(),
            message,
            body: None,
        }
    }
}

impl<T> From<Result<T>> for Envelope<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(body) => Envelope::ok(body),
            Err(e) => {
                tracing::debug!(status = e.status(), "operation failed: {}", e);
                Envelope::error(&e)
            }
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
