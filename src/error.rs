// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::AuthFailure;
use crate::database::DatabaseError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized {
        message: String,
        code: &'static str,
    },

    // 403 Forbidden
    Forbidden {
        message: String,
        code: &'static str,
    },
    PermissionDenied {
        message: String,
        required_roles: Vec<String>,
        actual_role: Option<String>,
    },

    // 404 Not Found
    NotFound(String),

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error
    InternalServerError {
        message: String,
        detail: Option<String>,
    },
}

/// Error body including internal detail. Attached to error responses as an
/// extension; only non-production routers copy it onto the wire.
#[derive(Debug, Clone)]
pub struct DetailedErrorBody(pub Value);

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized { message, .. } => message,
            ApiError::Forbidden { message, .. } => message,
            ApiError::PermissionDenied { message, .. } => message,
            ApiError::NotFound(msg) => msg,
            ApiError::TooManyRequests(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized { code, .. } => *code,
            ApiError::Forbidden { code, .. } => *code,
            ApiError::PermissionDenied { .. } => "INSUFFICIENT_ROLE",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Client-safe JSON body. Internal detail is never included.
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        match self {
            ApiError::ValidationError { field_errors: Some(field_errors), .. } => {
                response["field_errors"] = json!(field_errors);
            }
            ApiError::PermissionDenied { required_roles, actual_role, .. } => {
                response["requiredRoles"] = json!(required_roles);
                response["actualRole"] = json!(actual_role);
            }
            _ => {}
        }

        response
    }

    /// Body with internal detail, or `None` when there is nothing to add.
    pub fn to_detailed_json(&self) -> Option<Value> {
        match self {
            ApiError::InternalServerError { detail: Some(detail), .. } => {
                let mut response = self.to_json();
                response["detail"] = json!(detail);
                Some(response)
            }
            _ => None,
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    /// Validation failure on a single named field.
    pub fn invalid_field(field: &str, problem: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), problem.into());
        ApiError::validation_error(format!("Invalid value for '{}'", field), Some(field_errors))
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn forbidden(message: impl Into<String>, code: &'static str) -> Self {
        ApiError::Forbidden {
            message: message.into(),
            code,
        }
    }

    pub fn permission_denied(required_roles: Vec<String>, actual_role: Option<String>) -> Self {
        ApiError::PermissionDenied {
            message: "Insufficient workspace permissions".to_string(),
            required_roles,
            actual_role,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        ApiError::TooManyRequests(message.into())
    }

    /// Generic 500. `detail` reaches the client only through `middleware::expose_error_detail`.
    pub fn internal_server_error(message: impl Into<String>, detail: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            other => {
                // Log the real error but return generic message
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request", other.to_string())
            }
        }
    }
}

impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        let message = match &failure {
            AuthFailure::MissingHeader => "Missing or invalid authorization header".to_string(),
            AuthFailure::InvalidToken(_) => "Invalid or expired token".to_string(),
            AuthFailure::ServiceError(_) => "Unable to verify token".to_string(),
        };
        ApiError::Unauthorized {
            message,
            code: failure.code(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status_code(), Json(self.to_json())).into_response();
        if let Some(detailed) = self.to_detailed_json() {
            response.extensions_mut().insert(DetailedErrorBody(detailed));
        }
        response
    }
}
