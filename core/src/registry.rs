use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::fields::BasicField;

/// Submission behaviour of one field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldTypeInfo {
    pub field_type: BasicField,
    /// Display name in the form builder.
    #[schema(value_type = String)]
    pub label: &'static str,
    /// Answers arrive in `answerArray` instead of `answer`.
    pub is_array_answer: bool,
    /// `false` for decorative types: skipped by validation and left out of output.
    pub is_submitted_field: bool,
}

/// Catalogue of field types, built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct FieldTypeRegistry {
    entries: HashMap<BasicField, FieldTypeInfo>,
}

impl FieldTypeRegistry {
    pub fn new(entries: impl IntoIterator<Item = FieldTypeInfo>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|info| (info.field_type, info))
                .collect(),
        }
    }

    /// The catalogue for every type a form author can create.
    pub fn standard() -> Self {
        Self::new(BasicField::ALL.into_iter().map(standard_info))
    }

    pub fn lookup(&self, field_type: BasicField) -> Option<&FieldTypeInfo> {
        self.entries.get(&field_type)
    }

    pub fn is_submitted_field(&self, field_type: BasicField) -> bool {
        self.lookup(field_type)
            .is_some_and(|info| info.is_submitted_field)
    }

    /// Entries in the canonical field type order.
    pub fn entries(&self) -> Vec<FieldTypeInfo> {
        BasicField::ALL
            .into_iter()
            .filter_map(|field_type| self.lookup(field_type).copied())
            .collect()
    }
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_info(field_type: BasicField) -> FieldTypeInfo {
    let (label, is_array_answer, is_submitted_field) = match field_type {
        BasicField::Section => ("Header", false, true),
        BasicField::Statement => ("Statement", false, false),
        BasicField::Email => ("Email", false, true),
        BasicField::Mobile => ("Mobile Number", false, true),
        BasicField::HomeNo => ("Home Number", false, true),
        BasicField::Number => ("Number", false, true),
        BasicField::Decimal => ("Decimal", false, true),
        BasicField::Image => ("Image", false, false),
        BasicField::ShortText => ("Short Text", false, true),
        BasicField::LongText => ("Long Text", false, true),
        BasicField::Dropdown => ("Dropdown", false, true),
        BasicField::YesNo => ("Yes/No", false, true),
        BasicField::Checkbox => ("Checkbox", true, true),
        BasicField::Radio => ("Radio", false, true),
        BasicField::Attachment => ("Attachment", false, true),
        BasicField::Date => ("Date", false, true),
        BasicField::Rating => ("Rating", false, true),
        BasicField::Nric => ("NRIC", false, true),
        BasicField::Table => ("Table", true, true),
        BasicField::SingleValueApi => ("Single Value API", false, false),
    };
    FieldTypeInfo {
        field_type,
        label,
        is_array_answer,
        is_submitted_field,
    }
}
