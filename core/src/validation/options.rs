use std::collections::HashSet;

use crate::fields::{FieldDefinition, RatingOptions};

/// Prefix the form client puts in front of free text typed into "Others".
pub const OTHERS_PREFIX: &str = "Others: ";

pub fn is_one_of_options(options: &[String], answer: &str) -> bool {
    options.iter().any(|option| option == answer)
}

pub fn validate_dropdown(field: &FieldDefinition, answer: &str) -> Result<(), String> {
    if is_one_of_options(&field.field_options, answer) {
        Ok(())
    } else {
        Err("answer is not a valid dropdown option".to_string())
    }
}

pub fn validate_radio(field: &FieldDefinition, answer: &str) -> Result<(), String> {
    if is_one_of_options(&field.field_options, answer) {
        return Ok(());
    }
    if field.others_radio_button && is_others_answer(answer) {
        return Ok(());
    }
    Err("answer is not a valid radio option".to_string())
}

fn is_others_answer(answer: &str) -> bool {
    answer
        .strip_prefix(OTHERS_PREFIX)
        .is_some_and(|text| !text.trim().is_empty())
}

pub fn validate_checkbox(field: &FieldDefinition, values: &[String]) -> Result<(), String> {
    let mut seen = HashSet::new();
    if !values.iter().all(|value| seen.insert(value.as_str())) {
        return Err("answer contains duplicate selections".to_string());
    }

    let free_text: Vec<&String> = values
        .iter()
        .filter(|value| !is_one_of_options(&field.field_options, value))
        .collect();
    match free_text.as_slice() {
        [] => {}
        [text] if field.others_radio_button && !text.trim().is_empty() => {}
        _ => return Err("answer contains values that are not options".to_string()),
    }

    if field.validate_by_value {
        let count = values.len() as f64;
        if field.custom_min.is_some_and(|min| count < min) {
            return Err(format!("{} selections is below the minimum", values.len()));
        }
        if field.custom_max.is_some_and(|max| count > max) {
            return Err(format!("{} selections is above the maximum", values.len()));
        }
    }

    Ok(())
}

pub fn validate_yes_no(answer: &str) -> Result<(), String> {
    match answer {
        "Yes" | "No" => Ok(()),
        _ => Err("answer is not Yes or No".to_string()),
    }
}

pub fn validate_rating(field: &FieldDefinition, answer: &str) -> Result<(), String> {
    let steps = field
        .rating_options
        .as_ref()
        .map(|options| options.steps)
        .unwrap_or_else(|| RatingOptions::default().steps);
    let canonical = !answer.is_empty()
        && answer.bytes().all(|b| b.is_ascii_digit())
        && !answer.starts_with('0');
    let rating: u32 = answer
        .parse()
        .ok()
        .filter(|_| canonical)
        .ok_or_else(|| "answer is not a whole number".to_string())?;
    if (1..=steps).contains(&rating) {
        Ok(())
    } else {
        Err(format!("rating {rating} is outside 1..={steps}"))
    }
}
