use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use clap::Subcommand;
use formsg_core::config::SubmissionConfig;
use formsg_core::error::{SubmissionError, codes};
use formsg_core::fields::FieldDefinition;
use formsg_core::registry::FieldTypeRegistry;
use formsg_core::responses::FieldResponse;
use formsg_core::submission::{EmailSubmission, process_email_submission};
use formsg_core::validation::{FieldVisibility, ValidationContext};
use serde::Deserialize;
use serde_json::json;

use crate::util::{api_request, exit_error, print_json, read_json_from_file, read_typed_from_file};

#[derive(Subcommand)]
pub enum SubmissionCommands {
    /// Run a submission through the pipeline locally and print the email data
    Validate {
        /// Form field definitions: a JSON array, or an object with `formFields` ('-' for stdin)
        #[arg(long)]
        form: String,
        /// Submission: `responses`, optional `visibility` and `hashedFields`
        #[arg(long)]
        submission: String,
        /// Form id used in log lines
        #[arg(long, default_value = "local")]
        form_id: String,
        /// Evaluate date rules as of this day (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// POST a full submission request to the API
    Submit {
        #[arg(long)]
        form_id: String,
        /// Full JSON request payload (use '-' for stdin)
        #[arg(long)]
        request_file: String,
    },
}

pub async fn run(api_url: &str, command: SubmissionCommands) -> i32 {
    match command {
        SubmissionCommands::Validate {
            form,
            submission,
            form_id,
            today,
        } => validate(&form, &submission, &form_id, today).await,
        SubmissionCommands::Submit {
            form_id,
            request_file,
        } => submit(api_url, &form_id, &request_file).await,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FormFile {
    Fields(Vec<FieldDefinition>),
    #[serde(rename_all = "camelCase")]
    Document { form_fields: Vec<FieldDefinition> },
}

impl FormFile {
    fn into_fields(self) -> Vec<FieldDefinition> {
        match self {
            FormFile::Fields(fields) | FormFile::Document { form_fields: fields } => fields,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionFile {
    responses: Vec<FieldResponse>,
    #[serde(default)]
    visibility: HashMap<String, bool>,
    #[serde(default)]
    hashed_fields: Vec<String>,
}

async fn validate(
    form_path: &str,
    submission_path: &str,
    form_id: &str,
    today: Option<NaiveDate>,
) -> i32 {
    let fields = read_typed_from_file::<FormFile>(form_path)
        .unwrap_or_else(|e| exit_error(&e, Some("Expected an array of field definitions.")))
        .into_fields();
    let submission: SubmissionFile = read_typed_from_file(submission_path)
        .unwrap_or_else(|e| exit_error(&e, Some("Expected an object with a `responses` array.")));

    let registry = FieldTypeRegistry::standard();
    let config = SubmissionConfig::from_env();
    let mut ctx = ValidationContext::new(&registry, &config);
    if let Some(day) = today {
        ctx = ctx.with_today(day);
    }

    let visibility = FieldVisibility::new(submission.visibility);
    let hashed_fields: HashSet<String> = submission.hashed_fields.into_iter().collect();

    let result = process_email_submission(
        form_id,
        &fields,
        &submission.responses,
        &visibility,
        &hashed_fields,
        &ctx,
    )
    .await;

    let (output, exit_code) = render_outcome(result);
    print_json(&output, exit_code != 0);
    exit_code
}

/// Exit codes follow `api_request`: 1 for a rejected submission, 2 for a
/// form the pipeline cannot handle.
fn render_outcome(result: Result<EmailSubmission, SubmissionError>) -> (serde_json::Value, i32) {
    match result {
        Ok(submission) => {
            let attachments: Vec<_> = submission
                .attachments
                .iter()
                .map(|a| json!({ "filename": a.filename, "sizeBytes": a.content.len() }))
                .collect();
            (
                json!({
                    "emailData": submission.email_data,
                    "attachments": attachments,
                    "digest": submission.digest,
                }),
                0,
            )
        }
        Err(SubmissionError::ValidateField(err)) => (
            json!({
                "error": codes::VALIDATION_FAILED,
                "message": err.to_string(),
                "field": err.field_id(),
                "reason": err.reason(),
            }),
            1,
        ),
        Err(SubmissionError::Attachment(err)) => (
            json!({
                "error": codes::INVALID_ATTACHMENT,
                "message": err.to_string(),
            }),
            1,
        ),
        Err(err @ SubmissionError::UnsupportedField { .. }) => (
            json!({
                "error": codes::INTERNAL_ERROR,
                "message": err.to_string(),
            }),
            2,
        ),
    }
}

async fn submit(api_url: &str, form_id: &str, request_file: &str) -> i32 {
    let body = match read_json_from_file(request_file) {
        Ok(v) => v,
        Err(e) => exit_error(
            &e,
            Some("Provide a JSON object with `formFields` and `responses`."),
        ),
    };

    api_request(
        api_url,
        reqwest::Method::POST,
        &format!("/v1/forms/{form_id}/submissions/email"),
        Some(body),
    )
    .await
}

#[cfg(test)]
mod tests {
    use formsg_core::error::{AttachmentError, ValidateFieldError};

    use super::*;

    #[test]
    fn form_file_accepts_array_or_document() {
        let array: FormFile = serde_json::from_value(json!([
            { "_id": "a", "fieldType": "textfield" }
        ]))
        .unwrap();
        assert_eq!(array.into_fields().len(), 1);

        let document: FormFile = serde_json::from_value(json!({
            "formFields": [{ "_id": "a", "fieldType": "nric" }, { "_id": "b", "fieldType": "email" }]
        }))
        .unwrap();
        assert_eq!(document.into_fields().len(), 2);
    }

    #[test]
    fn rejected_submissions_exit_with_client_error() {
        let rejected = ValidateFieldError::invalid("a", "bad nric");
        let (output, code) = render_outcome(Err(rejected.into()));
        assert_eq!(code, 1);
        assert_eq!(output["field"], "a");
        assert_eq!(output["reason"], "bad nric");

        let (output, code) = render_outcome(Err(AttachmentError::InvalidFileType.into()));
        assert_eq!(code, 1);
        assert_eq!(output["error"], "invalid_attachment");
    }

    #[test]
    fn unsupported_fields_exit_with_server_error() {
        let (_, code) = render_outcome(Err(SubmissionError::UnsupportedField {
            field_id: "a".to_string(),
            field_type: "signature".to_string(),
        }));
        assert_eq!(code, 2);
    }
}
