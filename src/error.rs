use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error taxonomy for the leave core. Every variant is recoverable and
/// caller-surfaced; each maps to one HTTP status so the transport layer
/// never has to inspect messages.
#[derive(Debug, Error)]
pub enum LeaveError {
    /// Malformed or out-of-range input: bad dates, short reason,
    /// missing rejection reason.
    #[error("{0}")]
    Validation(String),

    /// Actor lacks permission for the requested operation on this record.
    #[error("Access denied")]
    Authorization,

    /// Operation not valid for the record's current status.
    #[error("{0}")]
    InvalidState(String),

    #[error("Leave request not found")]
    NotFound,

    #[error("Server error")]
    Database(#[from] sqlx::Error),
}

impl LeaveError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LeaveError::Validation(msg.into())
    }

    /// The standard message for a decided record being touched again.
    pub fn already_processed() -> Self {
        LeaveError::InvalidState("Leave request has already been processed".to_string())
    }
}

impl actix_web::ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation(_) | LeaveError::InvalidState(_) => StatusCode::BAD_REQUEST,
            LeaveError::Authorization => StatusCode::FORBIDDEN,
            LeaveError::NotFound => StatusCode::NOT_FOUND,
            LeaveError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let LeaveError::Database(e) = self {
            error!(error = %e, "Database failure");
        }
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}

pub type LeaveResult<T> = Result<T, LeaveError>;
