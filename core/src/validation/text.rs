use std::sync::LazyLock;

use regex::Regex;

use crate::fields::{FieldDefinition, LengthRule};

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid number regex"));
static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d+)?|\.\d+)$").expect("valid decimal regex")
});

/// Short and long text: optional character-count rule.
pub fn validate_text(field: &FieldDefinition, answer: &str) -> Result<(), String> {
    let Some(options) = &field.validation_options else {
        return Ok(());
    };
    let (Some(rule), Some(limit)) = (options.selected_validation, options.custom_val) else {
        return Ok(());
    };

    let length = answer.chars().count();
    let ok = match rule {
        LengthRule::Exact => length == limit,
        LengthRule::Minimum => length >= limit,
        LengthRule::Maximum => length <= limit,
    };
    if ok {
        Ok(())
    } else {
        Err(format!(
            "answer has {length} characters, violating {rule:?} {limit}"
        ))
    }
}

pub fn validate_number(field: &FieldDefinition, answer: &str) -> Result<(), String> {
    if !NUMBER_RE.is_match(answer) {
        return Err("answer is not a valid number".to_string());
    }
    let value: f64 = answer
        .parse()
        .map_err(|_| "answer is not a valid number".to_string())?;
    check_bounds(field, value)
}

pub fn validate_decimal(field: &FieldDefinition, answer: &str) -> Result<(), String> {
    if !DECIMAL_RE.is_match(answer) {
        return Err("answer is not a valid decimal".to_string());
    }
    let value: f64 = answer
        .parse()
        .map_err(|_| "answer is not a valid decimal".to_string())?;
    check_bounds(field, value)
}

fn check_bounds(field: &FieldDefinition, value: f64) -> Result<(), String> {
    if let Some(min) = field.custom_min {
        if value < min {
            return Err(format!("answer {value} is below minimum {min}"));
        }
    }
    if let Some(max) = field.custom_max {
        if value > max {
            return Err(format!("answer {value} is above maximum {max}"));
        }
    }
    Ok(())
}
