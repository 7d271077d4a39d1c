use std::collections::{HashMap, HashSet};

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing::post};
use formsg_core::attachments::AttachmentInfo;
use formsg_core::email_data::EmailData;
use formsg_core::error::ApiError;
use formsg_core::fields::FieldDefinition;
use formsg_core::responses::FieldResponse;
use formsg_core::submission::{SubmissionDigest, process_email_submission};
use formsg_core::validation::FieldVisibility;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

/// Room for 7 MB of attachments after base64 plus the form and answers.
const SUBMISSION_BODY_LIMIT: usize = 12 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/forms/{form_id}/submissions/email",
            post(create_email_submission),
        )
        .layer(DefaultBodyLimit::max(SUBMISSION_BODY_LIMIT))
}

/// An email-mode submission together with the form it answers.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailSubmissionRequest {
    /// Field definitions of the published form, in form order.
    pub form_fields: Vec<FieldDefinition>,
    pub responses: Vec<FieldResponse>,
    /// Logic engine verdicts by field id. Missing entries count as visible.
    #[serde(default)]
    pub visibility: HashMap<String, bool>,
    /// Field ids whose MyInfo answers passed hash verification.
    #[serde(default)]
    pub hashed_fields: Vec<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentSummary {
    pub filename: String,
    pub size_bytes: usize,
}

impl From<&AttachmentInfo> for AttachmentSummary {
    fn from(attachment: &AttachmentInfo) -> Self {
        Self {
            filename: attachment.filename.clone(),
            size_bytes: attachment.content.len(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailSubmissionResponse {
    pub submission_id: Uuid,
    pub email_data: EmailData,
    pub attachments: Vec<AttachmentSummary>,
    pub digest: SubmissionDigest,
}

/// Submit an email-mode form response
///
/// Validates every answer against the form, checks attachments, and returns
/// the payloads for the admin email, the confirmation email and the data
/// collation tool. Any failure rejects the whole submission.
#[utoipa::path(
    post,
    path = "/v1/forms/{form_id}/submissions/email",
    request_body = EmailSubmissionRequest,
    params(
        ("form_id" = String, Path, description = "Form identifier")
    ),
    responses(
        (status = 201, description = "Submission accepted", body = EmailSubmissionResponse),
        (status = 400, description = "Invalid answer or attachment", body = ApiError),
        (status = 429, description = "Rate limited", body = ApiError),
        (status = 500, description = "Form uses an unsupported field type", body = ApiError)
    ),
    tag = "submissions"
)]
pub async fn create_email_submission(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    AppJson(req): AppJson<EmailSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let visibility = FieldVisibility::new(req.visibility);
    let hashed_fields: HashSet<String> = req.hashed_fields.into_iter().collect();
    let ctx = state.validation_context();

    let submission = process_email_submission(
        &form_id,
        &req.form_fields,
        &req.responses,
        &visibility,
        &hashed_fields,
        &ctx,
    )
    .await?;

    let submission_id = Uuid::now_v7();
    tracing::info!(
        form_id = %form_id,
        submission_id = %submission_id,
        attachments_hash = %submission.digest.attachments_hash,
        "email submission created"
    );

    Ok((
        StatusCode::CREATED,
        Json(EmailSubmissionResponse {
            submission_id,
            email_data: submission.email_data,
            attachments: submission.attachments.iter().map(AttachmentSummary::from).collect(),
            digest: submission.digest,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use formsg_core::config::SubmissionConfig;
    use formsg_core::registry::FieldTypeRegistry;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    async fn post_submission(body: Value) -> (StatusCode, Value) {
        let state = AppState::new(FieldTypeRegistry::standard(), SubmissionConfig::default());
        let response = router()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/forms/form-1/submissions/email")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        (status, serde_json::from_slice(&bytes).expect("body is json"))
    }

    fn form_fields() -> Value {
        json!([
            { "_id": "name", "fieldType": "textfield", "title": "Name" },
            {
                "_id": "size",
                "fieldType": "dropdown",
                "title": "Size",
                "fieldOptions": ["S", "M", "L"]
            },
            {
                "_id": "items",
                "fieldType": "table",
                "title": "Items",
                "required": false,
                "minimumRows": 2,
                "columns": [
                    { "title": "Item", "required": true, "columnType": "textfield" },
                    { "title": "Qty", "required": true, "columnType": "textfield" }
                ]
            }
        ])
    }

    #[tokio::test]
    async fn accepts_valid_submission() {
        let (status, body) = post_submission(json!({
            "formFields": form_fields(),
            "responses": [
                { "_id": "name", "fieldType": "textfield", "answer": "Tan Ah Kow" },
                { "_id": "size", "fieldType": "dropdown", "answer": "M" },
                { "_id": "items", "fieldType": "table", "answerArray": [["pen", "2"], ["ink", "1"]] }
            ]
        }))
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["emailData"]["jsonData"].as_array().map(Vec::len), Some(4));
        assert_eq!(body["emailData"]["autoReplyData"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["emailData"]["jsonData"][2]["question"], "[table] Items");
        assert_eq!(body["emailData"]["jsonData"][2]["answer"], "pen,2");
        assert!(body["submissionId"].is_string());
    }

    #[tokio::test]
    async fn rejects_invalid_option_with_field_hint() {
        let (status, body) = post_submission(json!({
            "formFields": form_fields(),
            "responses": [
                { "_id": "name", "fieldType": "textfield", "answer": "Tan Ah Kow" },
                { "_id": "size", "fieldType": "dropdown", "answer": "XL" }
            ]
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
        assert_eq!(body["message"], "Invalid answer submitted");
        assert_eq!(body["field"], "size");
    }

    #[tokio::test]
    async fn rejects_answer_on_hidden_field() {
        let mut fields = form_fields();
        fields[0]["hasLogic"] = json!(true);
        let (status, body) = post_submission(json!({
            "formFields": fields,
            "visibility": { "name": false },
            "responses": [
                { "_id": "name", "fieldType": "textfield", "answer": "Tan Ah Kow" }
            ]
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Attempted to submit response on a hidden field");
    }

    #[tokio::test]
    async fn rejects_disallowed_attachment() {
        let (status, body) = post_submission(json!({
            "formFields": [{ "_id": "file", "fieldType": "attachment", "attachmentSize": "1" }],
            "responses": [{
                "_id": "file",
                "fieldType": "attachment",
                "answer": "setup.exe",
                "filename": "setup.exe",
                "content": "TVo="
            }]
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_attachment");
        assert_eq!(body["error_code"], "invalid_file_type");
    }

    #[tokio::test]
    async fn malformed_body_is_structured_error() {
        let (status, body) = post_submission(json!({ "responses": [] })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "formFields");
    }
}
