use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classification::{
    ResponseFormattedForEmail, form_data_prefixed_question, json_prefixed_question,
};
use crate::fields::BasicField;
use crate::responses::{Answer, ProcessedFieldResponse};

/// Row for the data collation tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailJsonField {
    pub question: String,
    pub answer: String,
}

/// Row for the confirmation email sent back to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailAutoReplyField {
    pub question: String,
    pub answer_template: Vec<String>,
}

/// Row for the admin table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailFormField {
    pub question: String,
    pub answer: String,
    pub answer_template: Vec<String>,
    pub field_type: BasicField,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailData {
    pub json_data: Vec<EmailJsonField>,
    pub auto_reply_data: Vec<EmailAutoReplyField>,
    pub form_data: Vec<EmailFormField>,
}

/// Splits a processed response into output rows. Table rows are kept apart;
/// checkbox selections collapse into one `", "`-joined row.
pub fn rows_for_email(response: &ProcessedFieldResponse) -> Vec<ResponseFormattedForEmail> {
    let row = |answer: String| ResponseFormattedForEmail {
        id: response.id.clone(),
        field_type: response.field_type,
        question: response.question.clone(),
        answer,
        my_info: response.my_info.clone(),
        is_visible: response.is_visible,
        is_user_verified: response.is_user_verified,
    };

    match &response.answer {
        // An unanswered table still shows up once in each output.
        Answer::Table(rows) if rows.is_empty() => vec![row(String::new())],
        Answer::Table(rows) => rows.iter().map(|cells| row(cells.join(","))).collect(),
        Answer::Checkbox(values) => vec![row(values.join(", "))],
        Answer::Single(answer) | Answer::Attachment { answer, .. } => vec![row(answer.clone())],
    }
}

fn split_lines(answer: &str) -> Vec<String> {
    answer.split('\n').map(str::to_string).collect()
}

/// Builds the three email payloads from validated responses.
///
/// `jsonData` and `formData` get one entry per output row. `autoReplyData`
/// gets one entry per visible response, with a table's rows concatenated into
/// a single answer template.
pub fn create_email_data(
    responses: &[ProcessedFieldResponse],
    hashed_fields: &HashSet<String>,
) -> EmailData {
    let mut data = EmailData::default();

    for response in responses {
        let rows = rows_for_email(response);

        if response.is_visible {
            data.auto_reply_data.push(EmailAutoReplyField {
                question: response.question.clone(),
                answer_template: rows.iter().flat_map(|row| split_lines(&row.answer)).collect(),
            });
        }

        for row in rows {
            let answer_template = split_lines(&row.answer);
            if row.field_type != BasicField::Section {
                data.json_data.push(EmailJsonField {
                    question: json_prefixed_question(&row),
                    answer: row.answer.clone(),
                });
            }
            data.form_data.push(EmailFormField {
                question: form_data_prefixed_question(&row, hashed_fields),
                answer: row.answer,
                answer_template,
                field_type: row.field_type,
            });
        }
    }

    data
}
