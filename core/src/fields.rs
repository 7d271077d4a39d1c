use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Every field type a form author can place on a form.
///
/// The wire tags are the ones stored on form documents, so they are not
/// uniform (`textfield` is short text, `textarea` is long text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum BasicField {
    #[serde(rename = "section")]
    Section,
    #[serde(rename = "statement")]
    Statement,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "mobile")]
    Mobile,
    #[serde(rename = "homeno")]
    HomeNo,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "decimal")]
    Decimal,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "textfield")]
    ShortText,
    #[serde(rename = "textarea")]
    LongText,
    #[serde(rename = "dropdown")]
    Dropdown,
    #[serde(rename = "yes_no")]
    YesNo,
    #[serde(rename = "checkbox")]
    Checkbox,
    #[serde(rename = "radiobutton")]
    Radio,
    #[serde(rename = "attachment")]
    Attachment,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "nric")]
    Nric,
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "singlevalueapi")]
    SingleValueApi,
}

impl BasicField {
    pub const ALL: [BasicField; 20] = [
        BasicField::Section,
        BasicField::Statement,
        BasicField::Email,
        BasicField::Mobile,
        BasicField::HomeNo,
        BasicField::Number,
        BasicField::Decimal,
        BasicField::Image,
        BasicField::ShortText,
        BasicField::LongText,
        BasicField::Dropdown,
        BasicField::YesNo,
        BasicField::Checkbox,
        BasicField::Radio,
        BasicField::Attachment,
        BasicField::Date,
        BasicField::Rating,
        BasicField::Nric,
        BasicField::Table,
        BasicField::SingleValueApi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BasicField::Section => "section",
            BasicField::Statement => "statement",
            BasicField::Email => "email",
            BasicField::Mobile => "mobile",
            BasicField::HomeNo => "homeno",
            BasicField::Number => "number",
            BasicField::Decimal => "decimal",
            BasicField::Image => "image",
            BasicField::ShortText => "textfield",
            BasicField::LongText => "textarea",
            BasicField::Dropdown => "dropdown",
            BasicField::YesNo => "yes_no",
            BasicField::Checkbox => "checkbox",
            BasicField::Radio => "radiobutton",
            BasicField::Attachment => "attachment",
            BasicField::Date => "date",
            BasicField::Rating => "rating",
            BasicField::Nric => "nric",
            BasicField::Table => "table",
            BasicField::SingleValueApi => "singlevalueapi",
        }
    }
}

impl fmt::Display for BasicField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BasicField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BasicField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown field type '{s}'"))
    }
}

/// Character-count rule for short and long text answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LengthRule {
    Exact,
    Minimum,
    Maximum,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextValidationOptions {
    #[serde(default)]
    pub selected_validation: Option<LengthRule>,
    #[serde(default)]
    pub custom_val: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DateRule {
    #[serde(rename = "Disallow past dates")]
    DisallowPast,
    #[serde(rename = "Disallow future dates")]
    DisallowFuture,
    #[serde(rename = "Custom date range")]
    Custom,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateValidation {
    #[serde(default)]
    pub selected_date_validation: Option<DateRule>,
    /// Accepts `YYYY-MM-DD` or a full ISO timestamp; only the date part is kept.
    #[serde(default, deserialize_with = "date_prefix")]
    pub custom_min_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "date_prefix")]
    pub custom_max_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingOptions {
    #[serde(default = "default_rating_steps")]
    pub steps: u32,
}

impl Default for RatingOptions {
    fn default() -> Self {
        Self {
            steps: default_rating_steps(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ColumnType {
    #[serde(rename = "textfield")]
    ShortText,
    #[serde(rename = "dropdown")]
    Dropdown,
}

/// One column of a table field. Cells are validated against their column.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_true")]
    pub required: bool,
    pub column_type: ColumnType,
    #[serde(default)]
    pub field_options: Vec<String>,
}

/// Admin-authored schema for one question on a form.
///
/// The type-specific constraints live side by side as optional keys, the way
/// they are stored on the form document. Validators only read the keys that
/// apply to their field type.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(alias = "_id")]
    pub id: String,
    pub field_type: BasicField,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_true")]
    pub required: bool,
    /// Form logic may hide this field.
    #[serde(default)]
    pub has_logic: bool,

    #[serde(default)]
    pub field_options: Vec<String>,
    #[serde(default)]
    pub others_radio_button: bool,
    #[serde(default)]
    pub validate_by_value: bool,
    #[serde(default)]
    pub custom_min: Option<f64>,
    #[serde(default)]
    pub custom_max: Option<f64>,
    #[serde(default)]
    pub validation_options: Option<TextValidationOptions>,

    #[serde(default)]
    pub is_verifiable: bool,
    #[serde(default)]
    pub has_allowed_email_domains: bool,
    #[serde(default)]
    pub allowed_email_domains: Vec<String>,
    #[serde(default)]
    pub allow_intl_numbers: bool,

    #[serde(default)]
    pub rating_options: Option<RatingOptions>,
    #[serde(default)]
    pub date_validation: Option<DateValidation>,

    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub minimum_rows: Option<usize>,
    #[serde(default)]
    pub add_more_rows: bool,
    #[serde(default)]
    pub maximum_rows: Option<usize>,

    /// Per-field ceiling in MB, stored as a string ("1", "2", ... "20").
    #[serde(default)]
    pub attachment_size: Option<String>,
}

impl FieldDefinition {
    /// A bare definition of the given type with every constraint unset.
    pub fn new(id: impl Into<String>, field_type: BasicField) -> Self {
        Self {
            id: id.into(),
            field_type,
            title: String::new(),
            required: true,
            has_logic: false,
            field_options: Vec::new(),
            others_radio_button: false,
            validate_by_value: false,
            custom_min: None,
            custom_max: None,
            validation_options: None,
            is_verifiable: false,
            has_allowed_email_domains: false,
            allowed_email_domains: Vec::new(),
            allow_intl_numbers: false,
            rating_options: None,
            date_validation: None,
            columns: Vec::new(),
            minimum_rows: None,
            add_more_rows: false,
            maximum_rows: None,
            attachment_size: None,
        }
    }

    /// Fields that go through an OTP step before submission.
    pub fn is_verifiable_field(&self) -> bool {
        self.is_verifiable && matches!(self.field_type, BasicField::Email | BasicField::Mobile)
    }

    /// Per-field ceiling from `attachmentSize` (megabytes). `Ok(None)` when
    /// the field sets no limit.
    pub fn attachment_size_limit_bytes(&self) -> Result<Option<usize>, String> {
        let Some(raw) = self.attachment_size.as_deref() else {
            return Ok(None);
        };
        raw.trim()
            .parse::<usize>()
            .ok()
            .and_then(|mb| mb.checked_mul(1_000_000))
            .map(Some)
            .ok_or_else(|| format!("attachment size '{raw}' is not a valid limit"))
    }
}

fn default_true() -> bool {
    true
}

fn default_rating_steps() -> u32 {
    5
}

fn date_prefix<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) => {
            let date_part = value.get(..10).unwrap_or(&value);
            NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}
