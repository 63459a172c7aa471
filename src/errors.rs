use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Application-wide error types with user-friendly messages
#[derive(Debug)]
pub enum AppError {
    // Authentication
    Unauthorized,

    // Validation Errors
    InvalidInput { field: String, message: String },

    // Database Errors
    DatabaseError,
    ConnectionPoolError,

    // System Errors
    ServiceUnavailable,
    InternalError,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthorized => write!(f, "Valid credentials required"),

            AppError::InvalidInput { field, message } => write!(f, "Invalid {}: {}", field, message),

            AppError::DatabaseError => write!(f, "A database error occurred - please try again"),
            AppError::ConnectionPoolError => write!(f, "Service temporarily unavailable - please try again"),

            AppError::ServiceUnavailable => write!(f, "Service temporarily unavailable - please try again later"),
            AppError::InternalError => write!(f, "An unexpected error occurred - please try again"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code, message) = match self {
            // 400 Bad Request
            AppError::InvalidInput { .. } => (400, "INVALID_INPUT", self.to_string()),

            // 401 Unauthorized
            AppError::Unauthorized => (401, "UNAUTHORIZED", self.to_string()),

            // 500 Internal Server Error
            AppError::DatabaseError => (500, "DATABASE_ERROR", self.to_string()),
            AppError::ConnectionPoolError => (500, "CONNECTION_POOL_ERROR", self.to_string()),
            AppError::InternalError => (500, "INTERNAL_ERROR", self.to_string()),

            // 503 Service Unavailable
            AppError::ServiceUnavailable => (503, "SERVICE_UNAVAILABLE", self.to_string()),
        };

        // Log detailed error information for debugging
        match self {
            AppError::DatabaseError | AppError::ConnectionPoolError | AppError::InternalError => {
                log::error!("Server error: {:?}", self);
            }
            _ => {
                log::info!("Client error: {:?}", self);
            }
        }

        let status = actix_web::http::StatusCode::from_u16(status)
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
        HttpResponse::build(status).json(json!({
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid_input(field: &str, message: &str) -> Self {
        AppError::InvalidInput {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Rejections raised before any store work or timer is started.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("category is required")]
    MissingCategory,
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    #[error("isActive flag is required")]
    MissingActiveFlag,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingCategory | ValidationError::UnknownCategory(_) => "category",
            ValidationError::MissingActiveFlag => "isActive",
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        log::warn!("Rejected subscription request: {}", err);
        AppError::invalid_input(err.field(), &err.to_string())
    }
}

impl From<crate::identity::AuthError> for AppError {
    fn from(err: crate::identity::AuthError) -> Self {
        use crate::identity::AuthError;

        match err {
            AuthError::MissingCredential | AuthError::InvalidToken(_) => {
                log::info!("Rejected credential: {}", err);
                AppError::Unauthorized
            }
            AuthError::NotConfigured => {
                log::error!("Authentication unavailable: {}", err);
                AppError::InternalError
            }
        }
    }
}

impl From<crate::store::StoreError> for AppError {
    fn from(err: crate::store::StoreError) -> Self {
        use crate::store::StoreError;

        match err {
            StoreError::Pool(_) => AppError::ConnectionPoolError,
            StoreError::Unavailable(_) => AppError::ServiceUnavailable,
            StoreError::Query(_) | StoreError::Worker(_) => {
                log::error!("Store error: {}", err);
                AppError::DatabaseError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_validation_error_maps_to_bad_request() {
        let err: AppError = ValidationError::UnknownCategory("BOGUS".to_string()).into();
        let resp = err.error_response();
        assert_eq!(resp.status(), 400);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
        assert_eq!(body["error"]["message"], "Invalid category: unknown category `BOGUS`");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Unauthorized.error_response().status(), 401);
        assert_eq!(AppError::ServiceUnavailable.error_response().status(), 503);
        assert_eq!(AppError::DatabaseError.error_response().status(), 500);
    }

    #[actix_web::test]
    async fn test_auth_failures_share_error_shape() {
        let err: AppError = crate::identity::AuthError::MissingCredential.into();
        let resp = err.error_response();
        assert_eq!(resp.status(), 401);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let err: AppError = crate::identity::AuthError::NotConfigured.into();
        assert_eq!(err.error_response().status(), 500);
    }

    #[test]
    fn test_missing_flag_names_field() {
        let err: AppError = ValidationError::MissingActiveFlag.into();
        assert!(matches!(err, AppError::InvalidInput { ref field, .. } if field == "isActive"));
    }
}
