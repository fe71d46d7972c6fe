//! Remote task store trait and error types.
//!
//! `TaskBackend` is the seam between the synchronizer and the wire: the HTTP
//! client implements it, and tests substitute in-memory doubles.

use std::future::Future;

use tasklist_core::{AppError, AuthError, NetworkError, ReqwestErrorExt};
use thiserror::Error;

use crate::task::{Task, TaskCreateRequest, TaskUpdateRequest};

/// Errors from a single round trip to the task store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskApiError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    /// The store refused the session token (401/403).
    #[error("Unauthorized ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Unauthorized {
        status: u16,
        message: Option<String>,
    },

    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error("Malformed response: {0}")]
    InvalidResponse(String),
}

impl TaskApiError {
    /// Build the error for a non-success status
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        if status == 401 || status == 403 {
            Self::Unauthorized { status, message }
        } else {
            Self::Status { status, message }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Human-readable text the store sent back, if any
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message, .. } | Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TaskApiError {
    fn from(e: reqwest::Error) -> Self {
        match e.into_network_error() {
            NetworkError::Timeout => Self::Timeout,
            NetworkError::ConnectionFailed(msg) => Self::Connection(msg),
            NetworkError::ServerError { status, message } => {
                Self::from_status(status, Some(message))
            }
            NetworkError::InvalidResponse(msg) => Self::InvalidResponse(msg),
        }
    }
}

impl From<url::ParseError> for TaskApiError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}

impl From<TaskApiError> for AppError {
    fn from(e: TaskApiError) -> Self {
        match e {
            TaskApiError::InvalidUrl(msg) => tasklist_core::ConfigError::Invalid(msg).into(),
            TaskApiError::Timeout => NetworkError::Timeout.into(),
            TaskApiError::Connection(msg) => NetworkError::ConnectionFailed(msg).into(),
            TaskApiError::Unauthorized { .. } => AuthError::SessionRejected.into(),
            TaskApiError::Status { status, message } => NetworkError::ServerError {
                status,
                message: message.unwrap_or_default(),
            }
            .into(),
            TaskApiError::InvalidResponse(msg) => NetworkError::InvalidResponse(msg).into(),
        }
    }
}

/// Result type for task store operations.
pub type TaskApiResult<T> = Result<T, TaskApiError>;

/// The four operations of the remote task store.
///
/// Every implementation must route its requests through the session gate.
pub trait TaskBackend: Send + Sync {
    /// Fetch every task, in the store's order.
    fn list(&self) -> impl Future<Output = TaskApiResult<Vec<Task>>> + Send;

    /// Create a task; the response carries the assigned identifier.
    fn create(&self, request: TaskCreateRequest)
        -> impl Future<Output = TaskApiResult<Task>> + Send;

    /// Apply a partial update; the response is the full updated record.
    fn update(
        &self,
        id: &str,
        request: TaskUpdateRequest,
    ) -> impl Future<Output = TaskApiResult<Task>> + Send;

    /// Delete a task. No payload comes back.
    fn delete(&self, id: &str) -> impl Future<Output = TaskApiResult<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies_auth_rejections() {
        assert!(TaskApiError::from_status(401, None).is_unauthorized());
        assert!(TaskApiError::from_status(403, None).is_unauthorized());
        assert!(!TaskApiError::from_status(404, None).is_unauthorized());
        assert!(!TaskApiError::from_status(500, None).is_unauthorized());
    }

    #[test]
    fn test_display_includes_remote_message() {
        let err = TaskApiError::from_status(404, Some("Todo not found".to_string()));
        assert_eq!(err.to_string(), "API error (404): Todo not found");
        assert_eq!(err.remote_message(), Some("Todo not found"));

        let err = TaskApiError::from_status(500, None);
        assert_eq!(err.to_string(), "API error (500): no details");
        assert!(TaskApiError::Timeout.remote_message().is_none());
    }

    #[test]
    fn test_unauthorized_maps_to_session_rejected() {
        let app: AppError = TaskApiError::from_status(401, None).into();
        assert!(app.requires_login());
    }
}
