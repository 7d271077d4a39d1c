//! Submission validation.
//!
//! Every response goes through the same fail-fast chain: visibility guard,
//! required check, then the type-specific checks. The first failure aborts the
//! whole submission.

pub mod attachment;
pub mod contact;
pub mod date;
pub mod nric;
pub mod options;
pub mod table;
pub mod text;

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::config::SubmissionConfig;
use crate::error::{SubmissionError, ValidateFieldError};
use crate::fields::{BasicField, FieldDefinition};
use crate::registry::FieldTypeRegistry;
use crate::responses::{Answer, FieldResponse, ProcessedFieldResponse};

/// Everything validators read besides the field and the response.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub registry: &'a FieldTypeRegistry,
    pub config: &'a SubmissionConfig,
    /// "Today" in the configured timezone, fixed for the whole submission.
    pub today: NaiveDate,
}

impl<'a> ValidationContext<'a> {
    pub fn new(registry: &'a FieldTypeRegistry, config: &'a SubmissionConfig) -> Self {
        Self {
            registry,
            config,
            today: config.today(),
        }
    }

    pub fn with_today(self, today: NaiveDate) -> Self {
        Self { today, ..self }
    }
}

/// Visibility computed by the logic engine, keyed by field id.
#[derive(Debug, Clone, Default)]
pub struct FieldVisibility {
    by_field: HashMap<String, bool>,
}

impl FieldVisibility {
    pub fn new(by_field: HashMap<String, bool>) -> Self {
        Self { by_field }
    }

    /// Every field visible, for forms without logic.
    pub fn all_visible() -> Self {
        Self::default()
    }

    pub fn from_hidden<I, S>(hidden: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(hidden.into_iter().map(|id| (id.into(), false)).collect())
    }

    /// Fields without logic are always shown. Fields with logic follow the
    /// engine's verdict and default to shown.
    pub fn is_visible(&self, field: &FieldDefinition) -> bool {
        !field.has_logic || self.by_field.get(&field.id).copied().unwrap_or(true)
    }
}

/// Validates one response against its definition.
pub fn validate_field(
    field: &FieldDefinition,
    response: &FieldResponse,
    is_visible: bool,
    ctx: &ValidationContext<'_>,
) -> Result<ProcessedFieldResponse, ValidateFieldError> {
    let answer = response.answer_for(field.field_type)?;

    // Headers carry no answer; whatever arrived is discarded.
    if field.field_type == BasicField::Section {
        let cleared = Answer::Single(String::new());
        return Ok(processed(field, response, cleared, is_visible, false));
    }

    if !is_visible {
        if !answer.is_empty() {
            return Err(ValidateFieldError::HiddenField {
                field_id: field.id.clone(),
            });
        }
        return Ok(processed(field, response, answer, is_visible, false));
    }

    if field.required && answer.is_blank() {
        return Err(ValidateFieldError::invalid(&field.id, "answer is an empty string"));
    }
    // Only a truly absent answer skips the type checks. Whitespace values and
    // blank table rows still have to fit the field.
    if answer.is_missing() {
        return Ok(processed(field, response, answer, is_visible, false));
    }

    check_answer(field, &answer, ctx)
        .map_err(|reason| ValidateFieldError::invalid(&field.id, reason))?;

    let is_user_verified = field.is_verifiable_field();
    Ok(processed(field, response, answer, is_visible, is_user_verified))
}

fn processed(
    field: &FieldDefinition,
    response: &FieldResponse,
    answer: Answer,
    is_visible: bool,
    is_user_verified: bool,
) -> ProcessedFieldResponse {
    ProcessedFieldResponse {
        id: field.id.clone(),
        field_type: field.field_type,
        question: field.title.clone(),
        answer,
        my_info: response.my_info.clone(),
        is_visible,
        is_user_verified,
    }
}

/// Format and semantic checks for a non-empty answer.
fn check_answer(
    field: &FieldDefinition,
    answer: &Answer,
    ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    match field.field_type {
        BasicField::ShortText | BasicField::LongText => text::validate_text(field, single(answer)?),
        BasicField::Number => text::validate_number(field, single(answer)?),
        BasicField::Decimal => text::validate_decimal(field, single(answer)?),
        BasicField::Email => contact::validate_email(field, single(answer)?),
        BasicField::Mobile => contact::validate_mobile(field, single(answer)?),
        BasicField::HomeNo => contact::validate_home_number(field, single(answer)?),
        BasicField::Dropdown => options::validate_dropdown(field, single(answer)?),
        BasicField::Radio => options::validate_radio(field, single(answer)?),
        BasicField::YesNo => options::validate_yes_no(single(answer)?),
        BasicField::Rating => options::validate_rating(field, single(answer)?),
        BasicField::Nric => nric::validate_nric(single(answer)?),
        BasicField::Date => date::validate_date(field, single(answer)?, ctx.today),
        BasicField::Checkbox => match answer {
            Answer::Checkbox(values) => options::validate_checkbox(field, values),
            _ => Err(shape_mismatch(field.field_type)),
        },
        BasicField::Table => match answer {
            Answer::Table(rows) => table::validate_table(field, rows),
            _ => Err(shape_mismatch(field.field_type)),
        },
        BasicField::Attachment => match answer {
            Answer::Attachment {
                answer,
                filename,
                content,
            } => attachment::validate_attachment(
                field,
                answer,
                filename.as_deref(),
                content.as_deref(),
                ctx.config,
            ),
            _ => Err(shape_mismatch(field.field_type)),
        },
        BasicField::Section
        | BasicField::Statement
        | BasicField::Image
        | BasicField::SingleValueApi => Ok(()),
    }
}

fn single(answer: &Answer) -> Result<&str, String> {
    match answer {
        Answer::Single(value) => Ok(value),
        _ => Err("answer is not a single value".to_string()),
    }
}

fn shape_mismatch(field_type: BasicField) -> String {
    format!("answer shape does not match field type '{field_type}'")
}

/// Validates a whole submission in response order and returns the processed
/// responses. Decorative field types are skipped and left out of the result.
pub fn validate_responses(
    form_id: &str,
    fields: &[FieldDefinition],
    responses: &[FieldResponse],
    visibility: &FieldVisibility,
    ctx: &ValidationContext<'_>,
) -> Result<Vec<ProcessedFieldResponse>, SubmissionError> {
    let fields_by_id: HashMap<&str, &FieldDefinition> =
        fields.iter().map(|field| (field.id.as_str(), field)).collect();
    let mut seen = HashSet::new();
    let mut processed = Vec::with_capacity(responses.len());

    for response in responses {
        let result = validate_one(&fields_by_id, &mut seen, response, visibility, ctx);
        match result {
            Ok(Some(valid)) => processed.push(valid),
            Ok(None) => {}
            Err(err) => {
                log_rejection(form_id, &err);
                return Err(err);
            }
        }
    }

    tracing::debug!(
        form_id,
        responses = responses.len(),
        processed = processed.len(),
        "submission responses validated"
    );
    Ok(processed)
}

fn validate_one(
    fields_by_id: &HashMap<&str, &FieldDefinition>,
    seen: &mut HashSet<String>,
    response: &FieldResponse,
    visibility: &FieldVisibility,
    ctx: &ValidationContext<'_>,
) -> Result<Option<ProcessedFieldResponse>, SubmissionError> {
    let field = fields_by_id
        .get(response.id.as_str())
        .copied()
        .ok_or_else(|| ValidateFieldError::UnknownField {
            field_id: response.id.clone(),
        })?;

    let Ok(field_type) = response.field_type.parse::<BasicField>() else {
        return Err(SubmissionError::UnsupportedField {
            field_id: response.id.clone(),
            field_type: response.field_type.clone(),
        });
    };
    if field_type != field.field_type {
        return Err(ValidateFieldError::FieldTypeMismatch {
            field_id: field.id.clone(),
            expected: field.field_type,
            received: response.field_type.clone(),
        }
        .into());
    }

    let Some(info) = ctx.registry.lookup(field_type) else {
        return Err(SubmissionError::UnsupportedField {
            field_id: field.id.clone(),
            field_type: response.field_type.clone(),
        });
    };
    if !info.is_submitted_field {
        return Ok(None);
    }

    if !seen.insert(field.id.clone()) {
        return Err(ValidateFieldError::invalid(&field.id, "field answered more than once").into());
    }

    let is_visible = visibility.is_visible(field);
    Ok(Some(validate_field(field, response, is_visible, ctx)?))
}

fn log_rejection(form_id: &str, err: &SubmissionError) {
    match err {
        SubmissionError::ValidateField(field_err) => tracing::warn!(
            form_id,
            field_id = field_err.field_id(),
            reason = %field_err.reason(),
            "submission rejected: {field_err}"
        ),
        SubmissionError::UnsupportedField {
            field_id,
            field_type,
        } => tracing::error!(
            form_id,
            field_id = %field_id,
            field_type = %field_type,
            "no validator registered for field type"
        ),
        SubmissionError::Attachment(att_err) => {
            tracing::warn!(form_id, "submission rejected: {att_err}")
        }
    }
}
