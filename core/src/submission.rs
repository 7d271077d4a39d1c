//! Email-mode submission flow: attachment checks, validation, email payloads.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use crate::attachments::{
    AttachmentInfo, attachments_are_valid, exceeds_size_limit, handle_duplicates_in_attachments,
    map_attachments_from_parsed_responses, map_attachments_from_processed_responses, total_size,
};
use crate::email_data::{EmailData, create_email_data, rows_for_email};
use crate::error::{AttachmentError, SubmissionError};
use crate::fields::FieldDefinition;
use crate::responses::{FieldResponse, ProcessedFieldResponse};
use crate::validation::{FieldVisibility, ValidationContext, validate_responses};

/// SHA-256 fingerprints of what was accepted, for audit logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDigest {
    pub responses_hash: String,
    pub attachments_hash: String,
}

#[derive(Debug, Clone)]
pub struct EmailSubmission {
    pub responses: Vec<ProcessedFieldResponse>,
    pub email_data: EmailData,
    /// Duplicate filenames already renamed.
    pub attachments: Vec<AttachmentInfo>,
    pub digest: SubmissionDigest,
}

pub fn hash_submission(
    responses: &[ProcessedFieldResponse],
    attachments: &[AttachmentInfo],
) -> SubmissionDigest {
    let mut hasher = Sha256::new();
    for response in responses {
        hasher.update(response.id.as_bytes());
        hasher.update([0u8]);
        hasher.update(response.field_type.as_str().as_bytes());
        for row in rows_for_email(response) {
            hasher.update([0u8]);
            hasher.update(row.answer.as_bytes());
        }
        hasher.update([0xffu8]);
    }
    let responses_hash = hex::encode(hasher.finalize());

    let mut hasher = Sha256::new();
    for attachment in attachments {
        hasher.update(&attachment.content);
    }
    let attachments_hash = hex::encode(hasher.finalize());

    SubmissionDigest {
        responses_hash,
        attachments_hash,
    }
}

/// Runs a raw email-mode submission through the whole pipeline. Nothing is
/// accepted unless every step passes.
pub async fn process_email_submission(
    form_id: &str,
    fields: &[FieldDefinition],
    responses: &[FieldResponse],
    visibility: &FieldVisibility,
    hashed_fields: &HashSet<String>,
    ctx: &ValidationContext<'_>,
) -> Result<EmailSubmission, SubmissionError> {
    // Every uploaded file is screened up front. Only files on validated
    // responses are forwarded.
    let attachments = map_attachments_from_parsed_responses(responses);

    if !attachments_are_valid(&attachments, ctx.config).await {
        tracing::warn!(form_id, attachments = attachments.len(), "invalid attachments");
        return Err(AttachmentError::InvalidFileType.into());
    }

    let limit_bytes = ctx.config.max_attachments_bytes;
    if exceeds_size_limit(&attachments, limit_bytes) {
        let total_bytes = total_size(&attachments);
        tracing::warn!(form_id, total_bytes, limit_bytes, "attachments over size limit");
        return Err(AttachmentError::TooLarge {
            total_bytes,
            limit_bytes,
        }
        .into());
    }

    let processed = validate_responses(form_id, fields, responses, visibility, ctx)?;
    let attachments =
        handle_duplicates_in_attachments(map_attachments_from_processed_responses(&processed));
    let email_data = create_email_data(&processed, hashed_fields);
    let digest = hash_submission(&processed, &attachments);

    tracing::info!(
        form_id,
        responses = processed.len(),
        attachments = attachments.len(),
        responses_hash = %digest.responses_hash,
        "email submission accepted"
    );

    Ok(EmailSubmission {
        responses: processed,
        email_data,
        attachments,
        digest,
    })
}
