//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the primary error type of the service, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages (shown verbatim by clients)
/// - Optional structured details (offending field names, ids)
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// Look up a detail entry
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.as_ref().and_then(|d| d.get(key))
    }

    // ==================== Convenience constructors ====================

    /// A required field is absent, null or blank
    pub fn missing_field(field: &str) -> Self {
        Self::with_message(
            ErrorCode::RequiredField,
            format!("A '{field}' property is required."),
        )
        .with_detail("field", field)
    }

    /// One or more fields are not accepted by the endpoint
    pub fn unknown_fields(fields: &[String]) -> Self {
        Self::with_message(
            ErrorCode::UnknownField,
            format!("Invalid field(s): {}", fields.join(", ")),
        )
        .with_detail("fields", fields.to_vec())
    }

    /// A field value has the wrong shape
    pub fn invalid_format(field: &str, msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidFormat, msg).with_detail("field", field)
    }

    /// Reservation lookup miss, carrying the requested id
    pub fn reservation_not_found(id: impl std::fmt::Display) -> Self {
        Self::with_message(
            ErrorCode::ReservationNotFound,
            format!("Reservation {id} not found"),
        )
        .with_detail("reservation_id", id.to_string())
    }

    /// Table lookup miss, carrying the requested id
    pub fn table_not_found(id: impl std::fmt::Display) -> Self {
        Self::with_message(ErrorCode::TableNotFound, format!("Table {id} not found"))
            .with_detail("table_id", id.to_string())
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }
}

/// Unified API response envelope
///
/// Success bodies carry `data`; failure bodies carry `error` (the message a
/// client displays verbatim) plus the numeric `code` and optional `details`.
///
/// ```json
/// { "data": { ... } }
/// { "error": "Table is occupied.", "code": 7002 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error code (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Additional error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            code: None,
            details: None,
        }
    }
}

impl ApiResponse<()> {
    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            data: None,
            error: Some(err.message.clone()),
            code: Some(err.code.code()),
            details: err.details.clone(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();

        // System errors never leak their cause to the client
        let body = if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
            ApiResponse::<()>::error(&AppError::new(self.code))
        } else {
            ApiResponse::<()>::error(&self)
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_field() {
        let err = AppError::missing_field("people");
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert!(err.message.contains("'people'"));
        assert_eq!(err.detail("field"), Some(&Value::from("people")));
    }

    #[test]
    fn test_unknown_fields_lists_all() {
        let err = AppError::unknown_fields(&["foo".to_string(), "bar".to_string()]);
        assert_eq!(err.code, ErrorCode::UnknownField);
        assert_eq!(err.message, "Invalid field(s): foo, bar");
        assert_eq!(
            err.detail("fields"),
            Some(&serde_json::json!(["foo", "bar"]))
        );
    }

    #[test]
    fn test_not_found_carries_id() {
        let err = AppError::reservation_not_found(42);
        assert_eq!(err.message, "Reservation 42 not found");
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(err.detail("reservation_id"), Some(&Value::from("42")));
    }

    #[test]
    fn test_success_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({ "data": [1, 2] }));
    }

    #[test]
    fn test_error_envelope_shape() {
        let err = AppError::new(ErrorCode::TableOccupied);
        let json = serde_json::to_value(ApiResponse::<()>::error(&err)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "error": "Table is occupied", "code": 7002 })
        );
    }

    #[test]
    fn test_error_envelope_deserialize() {
        let resp: ApiResponse<serde_json::Value> =
            serde_json::from_str(r#"{"error":"boom","code":9001}"#).unwrap();
        assert_eq!(resp.error.as_deref(), Some("boom"));
        assert_eq!(resp.code, Some(9001));
        assert!(resp.data.is_none());
    }

    #[tokio::test]
    async fn test_system_error_message_is_generic() {
        use axum::response::IntoResponse;
        use http_body_util::BodyExt;

        let response = AppError::with_message(
            ErrorCode::DatabaseError,
            "relation \"reservations\" does not exist",
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Database error");
        assert_eq!(body["code"], 9002);
    }
}
