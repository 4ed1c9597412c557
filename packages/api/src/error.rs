//! # Error taxonomy for API calls
//!
//! Every failed call ends up as one [`ApiError`], classified from the transport
//! outcome and the HTTP status:
//!
//! | Outcome | Variant |
//! |---------|---------|
//! | no response (DNS, connection, timeout) | [`ApiError::Network`] |
//! | 401 | [`ApiError::Unauthorized`] |
//! | 403 | [`ApiError::Forbidden`] |
//! | 404 | [`ApiError::NotFound`] |
//! | 400, 422, or a local pre-flight check | [`ApiError::Validation`] |
//! | any other status ≥ 400 | [`ApiError::Server`] |
//! | 2xx with an undecodable body | [`ApiError::Decode`] |
//!
//! Error bodies are read as `{ "message": "...", "errors": [{ "field", "message" }] }`,
//! both keys optional.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Unauthorized,
    Forbidden,
    Validation,
    NotFound,
    Server,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

impl ApiError {
    /// A validation failure raised before any request is made.
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::Validation {
            fields: vec![FieldError::new(field, message.clone())],
            message,
        }
    }

    /// Classify a non-2xx response.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_message(status).to_string());

        match status {
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            400 | 422 => ApiError::Validation {
                message,
                fields: parsed.errors,
            },
            _ => ApiError::Server { status, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::Forbidden(_) => ErrorKind::Forbidden,
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Server { .. } | ApiError::Decode(_) => ErrorKind::Server,
        }
    }

    /// Whether a read may be retried after this failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Short title for a user-facing notification.
    pub fn title(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Network => "Connection problem",
            ErrorKind::Unauthorized => "Please sign in",
            ErrorKind::Forbidden => "Not allowed",
            ErrorKind::Validation => "Check your input",
            ErrorKind::NotFound => "Not found",
            ErrorKind::Server => "Something went wrong",
        }
    }

    /// Optional detail line for a user-facing notification.
    pub fn detail(&self) -> Option<String> {
        let detail = match self {
            ApiError::Network(_) => "The wiki could not be reached. Try again in a moment.".to_string(),
            ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m)
            | ApiError::Validation { message: m, .. }
            | ApiError::Server { message: m, .. } => m.clone(),
            ApiError::Decode(_) => return None,
        };
        Some(detail)
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ApiError::Validation { fields, .. } => fields,
            _ => &[],
        }
    }
}

fn default_message(status: u16) -> &'static str {
    match status {
        400 | 422 => "The request was rejected",
        401 => "Your session has expired",
        403 => "You do not have permission to do that",
        404 => "The requested resource does not exist",
        _ => "The server failed to handle the request",
    }
}
