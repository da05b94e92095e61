//! Error taxonomy shared by the transport client and the controllers.

use reqwest::StatusCode;
use thiserror::Error;

use crate::contracts::Operation;

/// Fields of a JSON error body that may carry a human-readable message,
/// in the order they are consulted.
const MESSAGE_FIELDS: [&str; 3] = ["error", "message", "detail"];

/// Coarse classification of a failed round trip, derived from the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    BadRequest,
    NotFound,
    Conflict,
    PayloadTooLarge,
    RateLimited,
    Client,
    Server,
    Unexpected,
    /// No status was received (connection refused, reset, DNS, ...).
    Network,
}

impl ErrorCategory {
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 | 422 => Self::BadRequest,
            404 => Self::NotFound,
            409 | 410 => Self::Conflict,
            413 => Self::PayloadTooLarge,
            429 => Self::RateLimited,
            400..=499 => Self::Client,
            500..=599 => Self::Server,
            _ => Self::Unexpected,
        }
    }
}

/// Failure of a single operation, as seen by a controller.
///
/// `Display` is the user-facing message and nothing else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// Input rejected before any network call.
    #[error("{message}")]
    Validation { message: String },
    /// Non-success status, or no response at all.
    #[error("{message}")]
    Transport {
        operation: Operation,
        status: Option<u16>,
        category: ErrorCategory,
        message: String,
    },
    /// A success status whose body does not match the declared shape.
    #[error("{message}")]
    Decoding { operation: Operation, message: String },
    /// The target of a delete no longer exists (or changed underneath us).
    #[error("{message}")]
    Conflict {
        operation: Operation,
        status: u16,
        message: String,
    },
}

impl OperationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build the error for a non-success response. `message` has already been
    /// extracted from the body (or replaced by the fallback).
    pub fn from_status(operation: Operation, status: StatusCode, message: String) -> Self {
        let category = ErrorCategory::from_status(status);
        let is_conflict = operation == Operation::DeletePaper
            && matches!(category, ErrorCategory::NotFound | ErrorCategory::Conflict);
        if is_conflict {
            Self::Conflict {
                operation,
                status: status.as_u16(),
                message,
            }
        } else {
            Self::Transport {
                operation,
                status: Some(status.as_u16()),
                category,
                message,
            }
        }
    }

    /// A request that never produced a status line.
    pub fn network(operation: Operation, err: &reqwest::Error) -> Self {
        Self::Transport {
            operation,
            status: None,
            category: ErrorCategory::Network,
            message: format!("{}: {}", operation.fallback_message(), err),
        }
    }

    pub fn decoding(operation: Operation, detail: impl std::fmt::Display) -> Self {
        Self::Decoding {
            operation,
            message: format!(
                "{}: unexpected response from analysis backend ({})",
                operation.fallback_message(),
                detail
            ),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::Transport { message, .. }
            | Self::Decoding { message, .. }
            | Self::Conflict { message, .. } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Conflict { status, .. } => Some(*status),
            Self::Validation { .. } | Self::Decoding { .. } => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Pull a human-readable message out of an error body, if it has one.
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;
    MESSAGE_FIELDS
        .iter()
        .filter_map(|field| object.get(*field).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(String::from)
}

/// Errors raised while building a client.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid backend base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── extract_error_message ──────────────────────────────────────────

    #[test]
    fn error_field_preferred() {
        let body = br#"{"error": "No file part", "message": "other"}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("No file part"));
    }

    #[test]
    fn message_and_detail_fields_accepted() {
        assert_eq!(
            extract_error_message(br#"{"message": "Index is empty"}"#).as_deref(),
            Some("Index is empty")
        );
        assert_eq!(
            extract_error_message(br#"{"detail": "Not Found"}"#).as_deref(),
            Some("Not Found")
        );
    }

    #[test]
    fn blank_or_non_string_fields_skipped() {
        assert_eq!(
            extract_error_message(br#"{"error": "  ", "detail": "real"}"#).as_deref(),
            Some("real")
        );
        assert_eq!(extract_error_message(br#"{"error": 42}"#), None);
    }

    #[test]
    fn non_json_or_non_object_body_has_no_message() {
        assert_eq!(extract_error_message(b"<html>502 Bad Gateway</html>"), None);
        assert_eq!(extract_error_message(b""), None);
        assert_eq!(extract_error_message(br#"["error"]"#), None);
    }

    // ── categories ─────────────────────────────────────────────────────

    #[test]
    fn categories_from_status() {
        let cat = |s: u16| ErrorCategory::from_status(StatusCode::from_u16(s).unwrap());
        assert_eq!(cat(400), ErrorCategory::BadRequest);
        assert_eq!(cat(422), ErrorCategory::BadRequest);
        assert_eq!(cat(404), ErrorCategory::NotFound);
        assert_eq!(cat(409), ErrorCategory::Conflict);
        assert_eq!(cat(413), ErrorCategory::PayloadTooLarge);
        assert_eq!(cat(429), ErrorCategory::RateLimited);
        assert_eq!(cat(403), ErrorCategory::Client);
        assert_eq!(cat(503), ErrorCategory::Server);
        assert_eq!(cat(302), ErrorCategory::Unexpected);
    }

    #[test]
    fn delete_not_found_is_conflict() {
        let err =
            OperationError::from_status(Operation::DeletePaper, StatusCode::NOT_FOUND, "gone".into());
        assert!(matches!(err, OperationError::Conflict { status: 404, .. }));
        assert_eq!(err.to_string(), "gone");
    }

    #[test]
    fn not_found_elsewhere_is_transport() {
        let err =
            OperationError::from_status(Operation::Summarize, StatusCode::NOT_FOUND, "nope".into());
        match err {
            OperationError::Transport {
                status, category, ..
            } => {
                assert_eq!(status, Some(404));
                assert_eq!(category, ErrorCategory::NotFound);
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn decoding_message_names_operation() {
        let err = OperationError::decoding(Operation::Cluster, "missing field `clusters`");
        assert!(err.message().starts_with("Clustering failed: "));
        assert!(err.message().contains("missing field `clusters`"));
        assert_eq!(err.status(), None);
    }
}
