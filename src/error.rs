use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::io;
use thiserror::Error;

/// Unified error type for the storefront.
///
/// Every failure a handler can surface maps onto one of these variants, and
/// each variant maps onto exactly one HTTP status. Permission decisions
/// themselves never produce errors; the dispatch layer turns a `false` from
/// the policy into [`StorefrontError::PermissionDenied`].
#[derive(Error, Debug)]
pub enum StorefrontError {
    /// The addressed entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// No usable identity could be resolved for the request
    #[error("Authentication credentials were not provided or are invalid: {0}")]
    NotAuthenticated(String),

    /// The requester is known but may not act on the resource
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The request is well formed but cannot be honoured
    #[error("Not acceptable: {0}")]
    NotAcceptable(String),

    /// Errors related to request payload validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation is not allowed in the current session state
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Errors related to database operations
    #[error("Database error: {0}")]
    Database(String),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Errors related to configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to IO operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl StorefrontError {
    /// Convenience constructor used by lookups that miss.
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        StorefrontError::NotFound(format!("{} {} does not exist", kind, id))
    }

    /// The user-facing part of the error, without the category prefix.
    pub fn detail(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::NotAuthenticated(msg)
            | Self::PermissionDenied(msg)
            | Self::NotAcceptable(msg)
            | Self::Validation(msg)
            | Self::MethodNotAllowed(msg)
            | Self::Database(msg)
            | Self::Serialization(msg)
            | Self::Config(msg) => msg.clone(),
            Self::Io(err) => err.to_string(),
        }
    }
}

/// Conversion from serde_json::Error to StorefrontError
impl From<serde_json::Error> for StorefrontError {
    fn from(error: serde_json::Error) -> Self {
        StorefrontError::Serialization(error.to_string())
    }
}

/// Conversion from sled::Error to StorefrontError
impl From<sled::Error> for StorefrontError {
    fn from(error: sled::Error) -> Self {
        StorefrontError::Database(error.to_string())
    }
}

impl ResponseError for StorefrontError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotAuthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Database(_) | Self::Serialization(_) | Self::Config(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }

        let body = match self {
            Self::NotAcceptable(reason) => json!({ "reason": reason }),
            _ => json!({ "detail": self.detail() }),
        };
        HttpResponse::build(status).json(body)
    }
}

/// Result type alias for operations that can result in a StorefrontError
pub type StorefrontResult<T> = Result<T, StorefrontError>;
