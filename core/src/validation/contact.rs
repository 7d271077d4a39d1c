use std::sync::LazyLock;

use regex::Regex;

use crate::fields::FieldDefinition;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("valid email regex")
});
static E164_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{7,14}$").expect("valid e164 regex"));
static SG_MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+65[89]\d{7}$").expect("valid sg mobile regex"));
static SG_HOME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+65[36]\d{7}$").expect("valid sg home regex"));

pub fn validate_email(field: &FieldDefinition, answer: &str) -> Result<(), String> {
    if !EMAIL_RE.is_match(answer) {
        return Err("answer is not a valid email".to_string());
    }

    let restricts_domains = field.is_verifiable
        && field.has_allowed_email_domains
        && !field.allowed_email_domains.is_empty();
    if !restricts_domains {
        return Ok(());
    }

    let domain = email_domain(answer);
    if field.allowed_email_domains.iter().any(|allowed| *allowed == domain) {
        Ok(())
    } else {
        Err("answer is not an accepted domain".to_string())
    }
}

/// Everything from the last `@` onwards, `@` included.
pub fn email_domain(email: &str) -> String {
    let tail = email.rsplit('@').next().unwrap_or(email);
    format!("@{tail}")
}

pub fn validate_mobile(field: &FieldDefinition, answer: &str) -> Result<(), String> {
    let pattern = if field.allow_intl_numbers {
        &E164_RE
    } else {
        &SG_MOBILE_RE
    };
    if pattern.is_match(answer) {
        Ok(())
    } else {
        Err("answer is not a valid mobile number".to_string())
    }
}

pub fn validate_home_number(field: &FieldDefinition, answer: &str) -> Result<(), String> {
    let pattern = if field.allow_intl_numbers {
        &E164_RE
    } else {
        &SG_HOME_RE
    };
    if pattern.is_match(answer) {
        Ok(())
    } else {
        Err("answer is not a valid home number".to_string())
    }
}
