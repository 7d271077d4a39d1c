use crate::attachments::file_extension;
use crate::config::SubmissionConfig;
use crate::fields::FieldDefinition;

/// Per-field checks. Zip contents and the submission-wide size ceiling are
/// checked once for all attachments in `attachments`.
pub fn validate_attachment(
    field: &FieldDefinition,
    answer: &str,
    filename: Option<&str>,
    content: Option<&[u8]>,
    config: &SubmissionConfig,
) -> Result<(), String> {
    let Some(content) = content else {
        return Err("attachment content is missing".to_string());
    };
    if answer.trim().is_empty() {
        return Err("attachment has no filename".to_string());
    }
    if filename.is_some_and(|name| name != answer) {
        return Err("answer does not match the attachment filename".to_string());
    }
    if config.is_disallowed_extension(&file_extension(answer)) {
        return Err("attachment has a disallowed extension".to_string());
    }
    if let Some(limit) = field.attachment_size_limit_bytes()? {
        if content.len() > limit {
            return Err(format!(
                "attachment is {} bytes, field limit is {limit}",
                content.len()
            ));
        }
    }
    Ok(())
}
