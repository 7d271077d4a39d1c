use std::collections::HashSet;

use serde::Serialize;

use crate::fields::BasicField;
use crate::responses::MyInfo;

pub const TABLE_PREFIX: &str = "[table] ";
pub const ATTACHMENT_PREFIX: &str = "[attachment] ";
pub const MYINFO_PREFIX: &str = "[MyInfo] ";
pub const VERIFIED_PREFIX: &str = "[verified] ";

/// One output row. Tables produce one per row, every other type produces one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseFormattedForEmail {
    pub id: String,
    pub field_type: BasicField,
    pub question: String,
    pub answer: String,
    pub my_info: Option<MyInfo>,
    pub is_visible: bool,
    pub is_user_verified: bool,
}

pub fn field_type_prefix(field_type: BasicField) -> &'static str {
    match field_type {
        BasicField::Table => TABLE_PREFIX,
        BasicField::Attachment => ATTACHMENT_PREFIX,
        _ => "",
    }
}

/// Only answers whose MyInfo value was confirmed untouched get the tag.
pub fn myinfo_prefix(
    response: &ResponseFormattedForEmail,
    hashed_fields: &HashSet<String>,
) -> &'static str {
    if response.my_info.is_some() && hashed_fields.contains(&response.id) {
        MYINFO_PREFIX
    } else {
        ""
    }
}

pub fn verified_prefix(response: &ResponseFormattedForEmail) -> &'static str {
    if response.is_user_verified {
        VERIFIED_PREFIX
    } else {
        ""
    }
}

/// Question text for `jsonData`.
pub fn json_prefixed_question(response: &ResponseFormattedForEmail) -> String {
    format!("{}{}", field_type_prefix(response.field_type), response.question)
}

/// Question text for the admin table: type, MyInfo, verified, in that order.
pub fn form_data_prefixed_question(
    response: &ResponseFormattedForEmail,
    hashed_fields: &HashSet<String>,
) -> String {
    format!(
        "{}{}{}{}",
        field_type_prefix(response.field_type),
        myinfo_prefix(response, hashed_fields),
        verified_prefix(response),
        response.question
    )
}
