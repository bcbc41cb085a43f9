//! Error types for Marginalia

use thiserror::Error;

use crate::anchor::AnchorError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Anchor error: {0}")]
    Anchor(#[from] AnchorError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Stable snake_case label for the error class
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Anchor(e) => match e {
                AnchorError::OutOfRange { .. } => "out_of_range",
                AnchorError::SelectionNotFound => "selection_not_found",
                AnchorError::InvalidFingerprint(_) => "invalid_fingerprint",
                AnchorError::Timeout(_) => "timeout",
                AnchorError::Cancelled => "cancelled",
                AnchorError::Worker(_) => "internal_error",
            },
            AppError::Database(_) => "database_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether the caller supplied something invalid
    pub fn is_client_error(&self) -> bool {
        match self {
            AppError::NotFound(_) | AppError::Forbidden(_) | AppError::BadRequest(_) => true,
            AppError::Anchor(e) => matches!(
                e,
                AnchorError::OutOfRange { .. }
                    | AnchorError::SelectionNotFound
                    | AnchorError::InvalidFingerprint(_)
            ),
            _ => false,
        }
    }
}
