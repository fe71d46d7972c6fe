use std::fmt;

use tasklist_core::{AppError, AuthError};
use tasklist_services::TaskApiError;
use thiserror::Error;

/// The remote tier an operation goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Generic failure text shown when the store gave no explanation
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Fetch => "Failed to fetch tasks",
            Operation::Create => "Failed to create task",
            Operation::Update => "Failed to update task",
            Operation::Delete => "Failed to delete task",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Fetch => "fetch",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Why a synchronizer operation did not apply.
///
/// Every variant except `Validation` names the tier that failed; local state
/// is exactly as it was before the operation started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Rejected locally before any remote call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The round trip to the store failed.
    #[error("Task {operation} failed: {source}")]
    Remote {
        operation: Operation,
        #[source]
        source: TaskApiError,
    },

    /// The task is not in the local list any more.
    #[error("Task {operation} failed: {id} is not in the task list")]
    Stale { operation: Operation, id: String },

    /// Another mutating request for the same task has not finished.
    #[error("Task {operation} failed: {id} already has a request in flight")]
    Busy { operation: Operation, id: String },
}

impl SyncError {
    pub(crate) fn remote(operation: Operation, source: TaskApiError) -> Self {
        Self::Remote { operation, source }
    }

    /// The tier that failed; `None` for local validation
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Validation(_) => None,
            Self::Remote { operation, .. }
            | Self::Stale { operation, .. }
            | Self::Busy { operation, .. } => Some(*operation),
        }
    }

    /// True when the store rejected the session token and the user must log in again
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::Remote { source, .. } if source.is_unauthorized())
    }

    /// Message for a banner or notification. Prefers the store's own text.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Remote { source, .. } if source.is_unauthorized() => {
                "Your session has expired. Please log in again.".to_string()
            }
            Self::Remote { operation, source } => source
                .remote_message()
                .map(str::to_string)
                .unwrap_or_else(|| operation.failure_message().to_string()),
            Self::Stale { .. } => "That task no longer exists. Refresh and try again.".to_string(),
            Self::Busy { .. } => "That task is still being saved. Please wait.".to_string(),
        }
    }
}

impl From<SyncError> for AppError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Validation(msg) => AppError::Validation(msg),
            e if e.requires_reauth() => AuthError::SessionRejected.into(),
            e => AppError::Task(e.user_message()),
        }
    }
}
