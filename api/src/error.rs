use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use formsg_core::error::{self, ApiError, AttachmentError, SubmissionError, ValidateFieldError};

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Malformed body or rejected answer (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// Attachment rejected by type or total size (400)
    AttachmentRejected { error_code: &'static str, message: String },
    /// Internal error (500)
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        let (status, api_error) = match self {
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    error: error::codes::VALIDATION_FAILED.to_string(),
                    error_code: None,
                    message,
                    field,
                    received,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::AttachmentRejected {
                error_code,
                message,
            } => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    error: error::codes::INVALID_ATTACHMENT.to_string(),
                    error_code: Some(error_code.to_string()),
                    message,
                    field: None,
                    received: None,
                    request_id,
                    docs_hint: None,
                },
            ),
            AppError::Internal(msg) => {
                tracing::error!(request_id = %request_id, "Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError {
                        error: error::codes::INTERNAL_ERROR.to_string(),
                        error_code: None,
                        message: "An internal error occurred".to_string(),
                        field: None,
                        received: None,
                        request_id,
                        docs_hint: None,
                    },
                )
            }
        };

        (status, Json(api_error)).into_response()
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::ValidateField(field_err) => {
                let docs_hint = match &field_err {
                    ValidateFieldError::HiddenField { .. } => {
                        Some("Clear answers on fields hidden by form logic.".to_string())
                    }
                    ValidateFieldError::FieldTypeMismatch { expected, .. } => {
                        Some(format!("This field expects a '{expected}' response."))
                    }
                    _ => None,
                };
                let received = match &field_err {
                    ValidateFieldError::FieldTypeMismatch { received, .. } => {
                        Some(serde_json::Value::String(received.clone()))
                    }
                    _ => None,
                };
                AppError::Validation {
                    message: field_err.to_string(),
                    field: Some(field_err.field_id().to_string()),
                    received,
                    docs_hint,
                }
            }
            SubmissionError::Attachment(att_err) => {
                let error_code = match att_err {
                    AttachmentError::InvalidFileType => error::codes::INVALID_FILE_TYPE,
                    AttachmentError::TooLarge { .. } => error::codes::ATTACHMENT_TOO_LARGE,
                };
                AppError::AttachmentRejected {
                    error_code,
                    message: att_err.to_string(),
                }
            }
            unsupported @ SubmissionError::UnsupportedField { .. } => {
                AppError::Internal(unsupported.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use formsg_core::fields::BasicField;

    use super::*;

    #[test]
    fn field_errors_map_to_validation() {
        let err = AppError::from(SubmissionError::from(ValidateFieldError::invalid(
            "abc123",
            "answer is not a valid NRIC",
        )));
        match err {
            AppError::Validation { message, field, .. } => {
                assert_eq!(message, "Invalid answer submitted");
                assert_eq!(field.as_deref(), Some("abc123"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn type_mismatch_reports_received_tag() {
        let err = AppError::from(SubmissionError::from(ValidateFieldError::FieldTypeMismatch {
            field_id: "abc123".to_string(),
            expected: BasicField::Nric,
            received: "textfield".to_string(),
        }));
        match err {
            AppError::Validation {
                received,
                docs_hint,
                ..
            } => {
                assert_eq!(received, Some(serde_json::json!("textfield")));
                assert_eq!(docs_hint.as_deref(), Some("This field expects a 'nric' response."));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn attachment_errors_keep_distinct_codes() {
        let invalid = AppError::from(SubmissionError::from(AttachmentError::InvalidFileType));
        let too_large = AppError::from(SubmissionError::from(AttachmentError::TooLarge {
            total_bytes: 8_000_000,
            limit_bytes: 7_000_000,
        }));
        assert!(matches!(
            invalid,
            AppError::AttachmentRejected {
                error_code: error::codes::INVALID_FILE_TYPE,
                ..
            }
        ));
        assert!(matches!(
            too_large,
            AppError::AttachmentRejected {
                error_code: error::codes::ATTACHMENT_TOO_LARGE,
                ..
            }
        ));
    }

    #[test]
    fn unsupported_field_is_internal() {
        let err = AppError::from(SubmissionError::UnsupportedField {
            field_id: "abc123".to_string(),
            field_type: "signature".to_string(),
        });
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
