use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidateFieldError;
use crate::fields::BasicField;

/// MyInfo provenance of a prefilled answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MyInfo {
    pub attr: String,
}

/// `answerArray` on the wire: flat for checkboxes, nested rows for tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AnswerArray {
    Values(Vec<String>),
    Rows(Vec<Vec<String>>),
}

/// A submitter-supplied answer, exactly as it arrived.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldResponse {
    #[serde(alias = "_id")]
    pub id: String,
    /// Kept as the raw tag so unknown types can be reported, not rejected by serde.
    pub field_type: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub answer_array: Option<AnswerArray>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, with = "base64_content")]
    #[schema(value_type = Option<String>, format = Byte)]
    pub content: Option<Vec<u8>>,
    #[serde(default)]
    pub my_info: Option<MyInfo>,
}

impl FieldResponse {
    pub fn single(
        id: impl Into<String>,
        field_type: BasicField,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            field_type: field_type.as_str().to_string(),
            question: String::new(),
            answer: Some(answer.into()),
            answer_array: None,
            filename: None,
            content: None,
            my_info: None,
        }
    }

    pub fn checkbox(id: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            answer: None,
            answer_array: Some(AnswerArray::Values(values)),
            ..Self::single(id, BasicField::Checkbox, "")
        }
    }

    pub fn table(id: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            answer: None,
            answer_array: Some(AnswerArray::Rows(rows)),
            ..Self::single(id, BasicField::Table, "")
        }
    }

    pub fn attachment(
        id: impl Into<String>,
        filename: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        let filename = filename.into();
        Self {
            filename: Some(filename.clone()),
            content: Some(content),
            ..Self::single(id, BasicField::Attachment, filename)
        }
    }

    /// Reads the answer in the shape the field type expects.
    pub fn answer_for(&self, field_type: BasicField) -> Result<Answer, ValidateFieldError> {
        let wrong_shape = |expected: &str| {
            ValidateFieldError::invalid(&self.id, format!("answer is not {expected}"))
        };

        match field_type {
            BasicField::Checkbox => match &self.answer_array {
                None => Ok(Answer::Checkbox(Vec::new())),
                Some(AnswerArray::Values(values)) => Ok(Answer::Checkbox(values.clone())),
                // An empty nested array is indistinguishable from an empty flat one.
                Some(AnswerArray::Rows(rows)) if rows.is_empty() => {
                    Ok(Answer::Checkbox(Vec::new()))
                }
                Some(AnswerArray::Rows(_)) => Err(wrong_shape("a list of options")),
            },
            BasicField::Table => match &self.answer_array {
                None => Ok(Answer::Table(Vec::new())),
                Some(AnswerArray::Rows(rows)) => Ok(Answer::Table(rows.clone())),
                Some(AnswerArray::Values(values)) if values.is_empty() => {
                    Ok(Answer::Table(Vec::new()))
                }
                Some(AnswerArray::Values(_)) => Err(wrong_shape("a list of table rows")),
            },
            BasicField::Attachment => {
                if self.answer_array.is_some() {
                    return Err(wrong_shape("a filename"));
                }
                Ok(Answer::Attachment {
                    answer: self.answer.clone().unwrap_or_default(),
                    filename: self.filename.clone(),
                    content: self.content.clone(),
                })
            }
            _ => {
                if self.answer_array.is_some() {
                    return Err(wrong_shape("a single answer"));
                }
                Ok(Answer::Single(self.answer.clone().unwrap_or_default()))
            }
        }
    }
}

/// A typed answer. Which variant is used is decided by the field definition,
/// never by the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Checkbox(Vec<String>),
    Table(Vec<Vec<String>>),
    Attachment {
        answer: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        #[serde(skip)]
        content: Option<Vec<u8>>,
    },
}

impl Answer {
    /// No content at all: empty strings, empty lists, a table whose cells are
    /// all empty, or an attachment without a name or file.
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Single(answer) => answer.is_empty(),
            Answer::Attachment {
                answer, content, ..
            } => answer.is_empty() && content.is_none(),
            Answer::Checkbox(values) => values.is_empty(),
            Answer::Table(rows) => rows.iter().flatten().all(|cell| cell.is_empty()),
        }
    }

    /// Like `is_empty`, but whitespace-only values also count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Single(answer) => answer.trim().is_empty(),
            Answer::Attachment {
                answer, content, ..
            } => answer.trim().is_empty() && content.is_none(),
            Answer::Checkbox(values) => values.iter().all(|v| v.trim().is_empty()),
            Answer::Table(rows) => rows.iter().flatten().all(|cell| cell.trim().is_empty()),
        }
    }

    /// Nothing submitted: an empty string or an empty list.
    pub fn is_missing(&self) -> bool {
        match self {
            Answer::Table(rows) => rows.is_empty(),
            other => other.is_empty(),
        }
    }
}

/// A response that passed validation, with the state computed along the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedFieldResponse {
    pub id: String,
    pub field_type: BasicField,
    /// Taken from the form definition, not from the submitter.
    pub question: String,
    pub answer: Answer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_info: Option<MyInfo>,
    pub is_visible: bool,
    pub is_user_verified: bool,
}

mod base64_content {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(content: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match content {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|value| STANDARD.decode(value.as_bytes()))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_table_rows_and_checkbox_values() {
        let table: FieldResponse = serde_json::from_value(json!({
            "_id": "t1",
            "fieldType": "table",
            "answerArray": [["a", "b"], ["c", "d"]]
        }))
        .unwrap();
        assert_eq!(
            table.answer_for(BasicField::Table).unwrap(),
            Answer::Table(vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()],
            ])
        );

        let checkbox: FieldResponse = serde_json::from_value(json!({
            "_id": "c1",
            "fieldType": "checkbox",
            "answerArray": ["x", "y"]
        }))
        .unwrap();
        assert_eq!(
            checkbox.answer_for(BasicField::Checkbox).unwrap(),
            Answer::Checkbox(vec!["x".to_string(), "y".to_string()])
        );
    }

    #[test]
    fn rejects_rows_for_checkbox() {
        let response = FieldResponse::table("c1", vec![vec!["x".to_string()]]);
        assert!(response.answer_for(BasicField::Checkbox).is_err());
    }

    #[test]
    fn attachment_content_is_base64_on_the_wire() {
        let response: FieldResponse = serde_json::from_value(json!({
            "_id": "a1",
            "fieldType": "attachment",
            "answer": "abc.txt",
            "filename": "abc.txt",
            "content": "aGVsbG8="
        }))
        .unwrap();
        assert_eq!(response.content.as_deref(), Some(&b"hello"[..]));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["content"], "aGVsbG8=");
    }

    #[test]
    fn missing_answer_reads_as_empty() {
        let response: FieldResponse = serde_json::from_value(json!({
            "_id": "s1",
            "fieldType": "textfield"
        }))
        .unwrap();
        let answer = response.answer_for(BasicField::ShortText).unwrap();
        assert!(answer.is_empty());
    }

    #[test]
    fn blank_table_counts_as_empty() {
        let answer = Answer::Table(vec![vec![String::new(), String::new()]]);
        assert!(answer.is_empty());
        assert!(!answer.is_missing());
        assert!(!Answer::Table(vec![vec!["a".to_string()]]).is_empty());
        assert!(Answer::Table(Vec::new()).is_missing());
    }

    #[test]
    fn attachment_with_content_is_not_empty() {
        let unnamed = Answer::Attachment {
            answer: String::new(),
            filename: None,
            content: Some(b"pdf".to_vec()),
        };
        assert!(!unnamed.is_empty());
        assert!(!unnamed.is_blank());
    }
}
