use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use locker_types::api::ErrorResponse;
use locker_types::models::{MAX_MESSAGE_CHARS, MAX_OWNER_NAME_CHARS};

/// Input rules enforced by the flows before anything reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Validation {
    #[error("owner name is empty")]
    EmptyName,
    #[error("owner name is longer than {} characters", MAX_OWNER_NAME_CHARS)]
    NameTooLong,
    #[error("no gift type selected")]
    NoGiftType,
    #[error("message is empty")]
    EmptyMessage,
    #[error("message is longer than {} characters", MAX_MESSAGE_CHARS)]
    MessageTooLong,
}

#[derive(Debug, Error)]
pub enum LockerError {
    /// Locker lookup by slug missed.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed: {0}")]
    ValidationFailed(#[from] Validation),

    /// Owner token did not resolve. Deliberately carries no detail.
    #[error("access denied")]
    AccessDenied,

    /// A flow action was attempted from a state that does not offer it.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    /// Identifier generation kept colliding with existing lockers.
    #[error("conflict: {0}")]
    Conflict(&'static str),

    /// Backing storage failed (locked, corrupted, disk full). Not fatal.
    #[error("storage unavailable: {0:#}")]
    StorageUnavailable(anyhow::Error),
}

impl From<anyhow::Error> for LockerError {
    fn from(err: anyhow::Error) -> Self {
        Self::StorageUnavailable(err)
    }
}

impl LockerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::InvalidTransition { .. } | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for LockerError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::StorageUnavailable(err) => {
                error!("Storage failure: {:#}", err);
                "storage is temporarily unavailable, please try again".to_string()
            }
            other => other.to_string(),
        };
        (self.status(), Json(ErrorResponse { error: message })).into_response()
    }
}
