use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::{Number, Value};

use crate::domain::Separator;

static LEADING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})").expect("static date pattern")
});

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(num) => num.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Scalar text for a text-like field; objects and arrays collapse to empty.
pub(crate) fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(num)) => num.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn join_list(value: Option<&Value>, separator: Separator) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(separator.joiner()),
        _ => String::new(),
    }
}

pub(crate) fn split_list(contents: &str, separator: Separator) -> Vec<String> {
    contents
        .split(separator.as_char())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Calendar date of any supported representation, `today` when absent or unreadable.
pub(crate) fn normalize_date(value: Option<&Value>, today: NaiveDate) -> String {
    let date = match value {
        Some(Value::String(text)) => parse_date(text),
        Some(Value::Number(millis)) => millis
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|moment| moment.date_naive()),
        _ => None,
    };
    date.unwrap_or(today).format(DATE_FORMAT).to_string()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(moment) = DateTime::parse_from_rfc3339(text) {
        return Some(moment.with_timezone(&Utc).date_naive());
    }
    for format in [DATE_FORMAT, "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(moment) = NaiveDateTime::parse_from_str(text, format) {
            return Some(moment.date());
        }
    }
    if let Ok(moment) = DateTime::parse_from_rfc2822(text) {
        return Some(moment.with_timezone(&Utc).date_naive());
    }
    let captures = LEADING_DATE.captures(text)?;
    let year = captures[1].parse().ok()?;
    let month = captures[2].parse().ok()?;
    let day = captures[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub(crate) fn integer_from_value(value: Option<&Value>, fallback: i64) -> i64 {
    match value {
        Some(Value::Number(num)) => num
            .as_i64()
            .or_else(|| num.as_f64().filter(|n| n.is_finite()).map(|n| n as i64))
            .unwrap_or(fallback),
        Some(Value::String(text)) => parse_integer(text, fallback),
        _ => fallback,
    }
}

pub(crate) fn number_from_value(value: Option<&Value>, fallback: f64) -> f64 {
    match value {
        Some(Value::Number(num)) => num.as_f64().unwrap_or(fallback),
        Some(Value::String(text)) => parse_number(text, fallback),
        _ => fallback,
    }
}

pub(crate) fn parse_integer(contents: &str, fallback: i64) -> i64 {
    let trimmed = contents.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(|n| n.trunc() as i64)
        })
        .unwrap_or(fallback)
}

pub(crate) fn parse_number(contents: &str, fallback: f64) -> f64 {
    contents
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(fallback)
}

pub(crate) fn number_value(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn split_drops_blank_tokens() {
        assert_eq!(split_list("a,  ,b,,c", Separator::Comma), vec!["a", "b", "c"]);
    }

    #[test]
    fn newline_split_keeps_commas() {
        assert_eq!(
            split_list("Step 1, do X\nStep 2, do Y", Separator::Newline),
            vec!["Step 1, do X", "Step 2, do Y"]
        );
        assert_eq!(
            split_list("line one\nline two, still two", Separator::Comma),
            vec!["line one\nline two", "still two"]
        );
    }

    #[test]
    fn join_passes_non_arrays_through_as_empty() {
        assert_eq!(join_list(Some(&json!("react")), Separator::Comma), "");
        assert_eq!(join_list(None, Separator::Newline), "");
        assert_eq!(
            join_list(Some(&json!(["a", 2, true])), Separator::Comma),
            "a, 2, true"
        );
    }

    #[test]
    fn dates_truncate_to_calendar_form() {
        let cases = [
            (json!("2024-05-01T10:30:00.000Z"), "2024-05-01"),
            (json!("2024-05-01"), "2024-05-01"),
            (json!("2024/05/01"), "2024-05-01"),
            (json!("2024-05-01 18:00:00"), "2024-05-01"),
            (json!("2024-05-01T18:00:00"), "2024-05-01"),
            (json!("Wed, 01 May 2024 10:00:00 +0000"), "2024-05-01"),
            (json!("2024-05-01 at noon"), "2024-05-01"),
            (json!(1714557600000i64), "2024-05-01"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_date(Some(&input), today()), expected, "{input}");
        }
    }

    #[test]
    fn unreadable_dates_fall_back_to_today() {
        assert_eq!(normalize_date(None, today()), "2024-03-09");
        assert_eq!(normalize_date(Some(&json!("soon")), today()), "2024-03-09");
        assert_eq!(normalize_date(Some(&json!({"a": 1})), today()), "2024-03-09");
        assert_eq!(normalize_date(Some(&json!("2024-13-40")), today()), "2024-03-09");
    }

    #[test]
    fn numbers_fall_back_per_field() {
        assert_eq!(integer_from_value(Some(&json!("12")), 0), 12);
        assert_eq!(integer_from_value(Some(&json!(7.9)), 0), 7);
        assert_eq!(integer_from_value(Some(&json!("many")), 0), 0);
        assert_eq!(number_from_value(None, 5.0), 5.0);
        assert_eq!(parse_number("4.5", 5.0), 4.5);
        assert_eq!(parse_number("", 5.0), 5.0);
        assert_eq!(parse_integer(" 42 ", 0), 42);
        assert_eq!(parse_integer("3.7", 0), 3);
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(4.5), "4.5");
    }
}
