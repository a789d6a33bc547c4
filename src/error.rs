// Error handling module for the pricing API
// Provides the HTTP error type and its JSON response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error};

use crate::costing::CostingError;

/// Main error type for the API
/// All handlers return Result<T, ApiError>
///
/// Each variant maps to a specific HTTP status code and error response format.
#[derive(Debug)]
pub enum ApiError {
    /// Validation errors from request validation
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Request that is well formed but cannot be applied
    /// Maps to HTTP 400 Bad Request
    BadRequest(String),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound {
        resource: String,
        id: String,
    },

    /// Internal server errors
    /// Maps to HTTP 500 Internal Server Error
    /// Details are logged, never returned to the client
    InternalError(String),
}

/// Consistent error response structure
///
/// Machine-readable `error_code` plus a human-readable `message`.
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "NOT_FOUND")
    pub error_code: String,

    pub message: String,

    /// Field-level validation errors, omitted when None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Client errors are logged at debug level, internal errors at error level.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let timestamp = Utc::now().to_rfc3339();

        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);

                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error_code: "VALIDATION_ERROR".to_string(),
                        message: "Request validation failed".to_string(),
                        details: Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({}))),
                        timestamp,
                    },
                )
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);

                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error_code: "BAD_REQUEST".to_string(),
                        message: message.clone(),
                        details: None,
                        timestamp,
                    },
                )
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);

                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse {
                        error_code: "NOT_FOUND".to_string(),
                        message: format!("{} with id {} not found", resource, id),
                        details: None,
                        timestamp,
                    },
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error_code: "INTERNAL_ERROR".to_string(),
                        message: "An internal server error occurred".to_string(),
                        details: None,
                        timestamp,
                    },
                )
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

/// Convert costing errors to ApiError
impl From<CostingError> for ApiError {
    fn from(error: CostingError) -> Self {
        match error {
            CostingError::ServiceNotFound(id) => ApiError::NotFound {
                resource: "Service".to_string(),
                id,
            },
            CostingError::PlanNotFound(id) => ApiError::NotFound {
                resource: "Plan".to_string(),
                id,
            },
            CostingError::InvalidSettings(_) | CostingError::InvalidPolicy(_) => {
                ApiError::BadRequest(error.to_string())
            }
            CostingError::Persistence(_) | CostingError::Json(_) | CostingError::Io(_) => {
                ApiError::InternalError(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::ValidationError(validator::ValidationErrors::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::BadRequest("x".to_string()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::NotFound {
                resource: "Plan".to_string(),
                id: "p".to_string()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InternalError("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_costing_errors_map_to_http() {
        let error: ApiError = CostingError::PlanNotFound("plan-9".to_string()).into();
        assert!(matches!(error, ApiError::NotFound { ref resource, ref id } if resource == "Plan" && id == "plan-9"));

        let error: ApiError = CostingError::InvalidPolicy("trigger day".to_string()).into();
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);

        let error: ApiError = CostingError::Persistence("offline".to_string()).into();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_error_hides_details() {
        let (status, body) = ApiError::InternalError("store password leaked".to_string()).to_error_response();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "An internal server error occurred");
        assert!(body.details.is_none());
    }
}
