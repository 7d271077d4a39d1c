use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::fields::{DateRule, FieldDefinition};

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}) ([A-Z][a-z]{2}) (\d{4})$").expect("valid date regex")
});

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Strict `DD MMM YYYY`, e.g. `09 Jan 2019`. Returns `None` for impossible
/// calendar dates such as `29 Feb 2019`.
pub fn parse_answer_date(answer: &str) -> Option<NaiveDate> {
    let captures = DATE_RE.captures(answer)?;
    let day: u32 = captures[1].parse().ok()?;
    let month = MONTHS.iter().position(|m| *m == &captures[2])? as u32 + 1;
    let year: i32 = captures[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn validate_date(
    field: &FieldDefinition,
    answer: &str,
    today: NaiveDate,
) -> Result<(), String> {
    let date = parse_answer_date(answer).ok_or_else(|| "answer is not a valid date".to_string())?;

    let Some(validation) = &field.date_validation else {
        return Ok(());
    };
    match validation.selected_date_validation {
        None => Ok(()),
        Some(DateRule::DisallowPast) if date < today => {
            Err("answer is a past date, which is disallowed".to_string())
        }
        Some(DateRule::DisallowFuture) if date > today => {
            Err("answer is a future date, which is disallowed".to_string())
        }
        Some(DateRule::Custom) => {
            let before_min = validation.custom_min_date.is_some_and(|min| date < min);
            let after_max = validation.custom_max_date.is_some_and(|max| date > max);
            if before_min || after_max {
                Err("answer is outside the custom date range".to_string())
            } else {
                Ok(())
            }
        }
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{BasicField, DateValidation};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    fn date_field(rule: Option<DateRule>) -> FieldDefinition {
        let mut field = FieldDefinition::new("abc123", BasicField::Date);
        field.date_validation = Some(DateValidation {
            selected_date_validation: rule,
            custom_min_date: NaiveDate::from_ymd_opt(2020, 6, 25),
            custom_max_date: NaiveDate::from_ymd_opt(2020, 6, 28),
        });
        field
    }

    #[test]
    fn parses_strict_format() {
        assert_eq!(parse_answer_date("09 Jan 2019"), NaiveDate::from_ymd_opt(2019, 1, 9));
        for bad in [
            "32 Jan 2019",
            "00 Jan 2019",
            "9 Jan 2019",
            "009 Jan 2019",
            "31 Jon 2019",
            "16 Jn 2019",
            "03 June 2019",
            "31 Jan hello",
            "31 Jan 201",
            "31 Jan 02019",
            "31 jan 2019",
        ] {
            assert_eq!(parse_answer_date(bad), None, "{bad}");
        }
    }

    #[test]
    fn respects_leap_years() {
        assert!(parse_answer_date("29 Feb 2016").is_some());
        assert!(parse_answer_date("29 Feb 2019").is_none());
    }

    #[test]
    fn unconstrained_accepts_past_and_future() {
        let field = FieldDefinition::new("abc123", BasicField::Date);
        assert!(validate_date(&field, "01 Jan 2019", today()).is_ok());
        assert!(validate_date(&field, "01 Jan 2021", today()).is_ok());
    }

    #[test]
    fn disallow_past_dates() {
        let field = date_field(Some(DateRule::DisallowPast));
        assert!(validate_date(&field, "28 Feb 2019", today()).is_err());
        assert!(validate_date(&field, "01 Jan 2020", today()).is_ok());
    }

    #[test]
    fn disallow_future_dates() {
        let field = date_field(Some(DateRule::DisallowFuture));
        assert!(validate_date(&field, "01 Jan 2021", today()).is_err());
        assert!(validate_date(&field, "01 Jan 2020", today()).is_ok());
    }

    #[test]
    fn custom_range_is_inclusive() {
        let field = date_field(Some(DateRule::Custom));
        assert!(validate_date(&field, "25 Jun 2020", today()).is_ok());
        assert!(validate_date(&field, "28 Jun 2020", today()).is_ok());
        assert!(validate_date(&field, "22 Jun 2020", today()).is_err());
        assert!(validate_date(&field, "29 Jun 2020", today()).is_err());
    }

    #[test]
    fn range_keys_without_rule_are_ignored() {
        let field = date_field(None);
        assert!(validate_date(&field, "22 Jun 2020", today()).is_ok());
    }
}
