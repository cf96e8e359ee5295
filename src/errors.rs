//! Typed error hierarchy for the board client.
//!
//! - `GatewayError`: anything that goes wrong talking to the REST API
//! - `MutationFailure`: an optimistic mutation that was rolled back
//! - `SyncError`: failures on the non-optimistic query path

use thiserror::Error;

use crate::board::models::BoardId;

/// Errors from the remote task gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Not authenticated: no access token in session")]
    Unauthenticated,

    #[error("Server responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid API URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The optimistic operations the engine performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Edit,
    Delete,
    Reorder,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Reorder => "reorder",
        }
    }

    /// User-facing text shown next to the control that triggered the operation.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Create => "Failed to create task.",
            Self::Edit => "Failed to save.",
            Self::Delete => "Failed to delete.",
            Self::Reorder => "Failed to move task.",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An optimistic mutation whose request failed; the board has been restored.
#[derive(Debug, Error)]
#[error("{}", .operation.failure_message())]
pub struct MutationFailure {
    pub operation: Operation,
    #[source]
    pub source: GatewayError,
}

/// Errors from loading boards and signing in.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Board {id} not found")]
    BoardNotFound { id: BoardId },

    #[error("Invalid credentials or server error.")]
    LoginFailed(#[source] GatewayError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
