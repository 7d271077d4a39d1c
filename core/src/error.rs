use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::fields::BasicField;

/// Structured error response returned to submitters.
/// Carries the user-facing message plus enough context for the form client
/// to point at the offending field.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Machine-readable error code (e.g. "validation_failed", "invalid_attachment")
    pub error: String,
    /// Finer-grained machine code (e.g. "invalid_file_type", "attachment_too_large")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// User-facing description of what went wrong
    pub message: String,
    /// Which form field caused the error (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The value that was received (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
    /// Request ID for tracing and debugging
    pub request_id: String,
    /// Hint about how to correct the submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

/// Error codes used across the API
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const INVALID_ATTACHMENT: &str = "invalid_attachment";
    pub const INVALID_FILE_TYPE: &str = "invalid_file_type";
    pub const ATTACHMENT_TOO_LARGE: &str = "attachment_too_large";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const RATE_LIMITED: &str = "rate_limited";
}

/// Invalid answer content. Every variant aborts the whole submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidateFieldError {
    #[error("Invalid answer submitted")]
    InvalidAnswer { field_id: String, reason: String },
    #[error("Attempted to submit response on a hidden field")]
    HiddenField { field_id: String },
    #[error("Invalid answer submitted")]
    UnknownField { field_id: String },
    #[error("Invalid answer submitted")]
    FieldTypeMismatch {
        field_id: String,
        expected: BasicField,
        received: String,
    },
}

impl ValidateFieldError {
    pub fn invalid(field_id: &str, reason: impl Into<String>) -> Self {
        ValidateFieldError::InvalidAnswer {
            field_id: field_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn field_id(&self) -> &str {
        match self {
            ValidateFieldError::InvalidAnswer { field_id, .. }
            | ValidateFieldError::HiddenField { field_id }
            | ValidateFieldError::UnknownField { field_id }
            | ValidateFieldError::FieldTypeMismatch { field_id, .. } => field_id,
        }
    }

    /// Internal detail for logs. Never shown to the submitter.
    pub fn reason(&self) -> String {
        match self {
            ValidateFieldError::InvalidAnswer { reason, .. } => reason.clone(),
            ValidateFieldError::HiddenField { .. } => {
                "non-empty answer on a field hidden by logic".to_string()
            }
            ValidateFieldError::UnknownField { .. } => {
                "response id does not exist on the form".to_string()
            }
            ValidateFieldError::FieldTypeMismatch {
                expected, received, ..
            } => format!("expected field type '{expected}', received '{received}'"),
        }
    }
}

/// Attachment rejections, kept apart so the message can name the cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentError {
    #[error("Some files were invalid. Try uploading another file.")]
    InvalidFileType,
    #[error("Please keep the size of your attachments under 7MB.")]
    TooLarge { total_bytes: usize, limit_bytes: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    ValidateField(#[from] ValidateFieldError),
    /// A field type with no validator. A configuration bug, never user-facing.
    #[error("Unsupported field type: {field_type}")]
    UnsupportedField { field_id: String, field_type: String },
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}
