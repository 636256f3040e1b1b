// Request input validation
//
// Rules mirror the Laravel validator the API contract was written against:
// every failing field is collected before the request is rejected, strings are
// trimmed and empty strings count as null, and messages use the field name with
// underscores replaced by spaces.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field name -> every message produced for that field
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// How a field's absence is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be present and non-empty
    Required,
    /// Validated only when present; present-but-empty is an error
    Sometimes,
    /// May be absent or null
    Nullable,
}

/// Character-count bounds for string rules
#[derive(Debug, Clone, Copy, Default)]
pub struct Length {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Length {
    pub const fn max(max: usize) -> Self {
        Self { min: None, max: Some(max) }
    }

    pub const fn min(min: usize) -> Self {
        Self { min: Some(min), max: None }
    }
}

/// Result of reading a single field.
///
/// `Absent` also stands in for values that failed validation; callers only
/// read fields after [`Validator::finish`] succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Field<T> {
    /// Value of a field validated as [`Presence::Required`]
    pub fn required(self, field: &str) -> Result<T, FieldErrors> {
        match self {
            Field::Value(value) => Ok(value),
            Field::Absent | Field::Null => Err(single_error(field, required_message(field))),
        }
    }

    /// Patch semantics: `None` leaves the stored value untouched
    pub fn into_change(self) -> Option<Option<T>> {
        match self {
            Field::Absent => None,
            Field::Null => Some(None),
            Field::Value(value) => Some(Some(value)),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Value(value) => Some(value),
            Field::Absent | Field::Null => None,
        }
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Field::Value(value) => Some(value),
            Field::Absent | Field::Null => None,
        }
    }
}

/// Collects rule failures for one request body
pub struct Validator<'a> {
    input: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> Validator<'a> {
    pub fn new(input: &'a Map<String, Value>) -> Self {
        Self {
            input,
            errors: FieldErrors::new(),
        }
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_default().push(message.into());
    }

    /// Record an `exists`/`unique` style failure against `field`
    pub fn selection_invalid(&mut self, field: &str) {
        self.fail(field, invalid_selection_message(field));
    }

    pub fn already_taken(&mut self, field: &str) {
        self.fail(field, taken_message(field));
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Trimmed string; empty strings are treated as null
    pub fn string(&mut self, field: &str, presence: Presence, length: Length) -> Field<String> {
        self.read_string(field, presence, length, true)
    }

    /// Untrimmed string, used for passwords
    pub fn secret(&mut self, field: &str, presence: Presence, length: Length) -> Field<String> {
        self.read_string(field, presence, length, false)
    }

    pub fn email(&mut self, field: &str, presence: Presence, length: Length) -> Field<String> {
        let value = self.string(field, presence, length);
        if let Field::Value(email) = &value {
            if !is_valid_email(email) {
                self.fail(field, format!("The {} field must be a valid email address.", label(field)));
                return Field::Absent;
            }
        }
        value
    }

    pub fn date(&mut self, field: &str, presence: Presence) -> Field<NaiveDate> {
        match self.present(field, presence) {
            Field::Value(Value::String(raw)) => match parse_date(raw.trim()) {
                Some(date) => Field::Value(date),
                None => {
                    self.fail(field, format!("The {} field must be a valid date.", label(field)));
                    Field::Absent
                }
            },
            Field::Value(_) => {
                self.fail(field, format!("The {} field must be a valid date.", label(field)));
                Field::Absent
            }
            Field::Null => Field::Null,
            Field::Absent => Field::Absent,
        }
    }

    pub fn numeric(&mut self, field: &str, presence: Presence) -> Field<BigDecimal> {
        let raw = match self.present(field, presence) {
            Field::Value(Value::Number(number)) => number.to_string(),
            Field::Value(Value::String(raw)) => raw.trim().to_string(),
            Field::Value(_) => {
                self.fail(field, format!("The {} field must be a number.", label(field)));
                return Field::Absent;
            }
            Field::Null => return Field::Null,
            Field::Absent => return Field::Absent,
        };

        match parse_decimal(&raw) {
            Some(value) => Field::Value(value),
            None => {
                self.fail(field, format!("The {} field must be a number.", label(field)));
                Field::Absent
            }
        }
    }

    /// Row identifier given as a JSON integer or a string of digits.
    /// Anything else is reported the way a failed `exists` lookup is.
    pub fn identifier(&mut self, field: &str, presence: Presence) -> Field<i64> {
        let parsed = match self.present(field, presence) {
            Field::Value(Value::Number(number)) => number.as_i64(),
            Field::Value(Value::String(raw)) => raw.trim().parse::<i64>().ok(),
            Field::Value(_) => None,
            Field::Null => return Field::Null,
            Field::Absent => return Field::Absent,
        };

        match parsed {
            Some(id) if id > 0 => Field::Value(id),
            _ => {
                self.selection_invalid(field);
                Field::Absent
            }
        }
    }

    fn read_string(&mut self, field: &str, presence: Presence, length: Length, trim: bool) -> Field<String> {
        let value = match self.present(field, presence) {
            Field::Value(Value::String(raw)) => {
                if trim {
                    raw.trim().to_string()
                } else {
                    raw.clone()
                }
            }
            Field::Value(_) => {
                self.fail(field, format!("The {} field must be a string.", label(field)));
                return Field::Absent;
            }
            Field::Null => return Field::Null,
            Field::Absent => return Field::Absent,
        };

        let chars = value.chars().count();
        if let Some(min) = length.min {
            if chars < min {
                self.fail(field, format!("The {} field must be at least {} characters.", label(field), min));
                return Field::Absent;
            }
        }
        if let Some(max) = length.max {
            if chars > max {
                self.fail(
                    field,
                    format!("The {} field must not be greater than {} characters.", label(field), max),
                );
                return Field::Absent;
            }
        }

        Field::Value(value)
    }

    /// Applies the presence rule; returns the raw value only when it is set
    fn present(&mut self, field: &str, presence: Presence) -> Field<&'a Value> {
        let input = self.input;
        let value = match input.get(field) {
            None => {
                if presence == Presence::Required {
                    self.fail(field, required_message(field));
                }
                return Field::Absent;
            }
            Some(value) => value,
        };

        if is_empty(value) {
            return match presence {
                Presence::Nullable => Field::Null,
                Presence::Required | Presence::Sometimes => {
                    self.fail(field, required_message(field));
                    Field::Absent
                }
            };
        }

        Field::Value(value)
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn required_message(field: &str) -> String {
    format!("The {} field is required.", label(field))
}

pub fn taken_message(field: &str) -> String {
    format!("The {} has already been taken.", label(field))
}

pub fn invalid_selection_message(field: &str) -> String {
    format!("The selected {} is invalid.", label(field))
}

pub fn single_error(field: &str, message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.into()]);
    errors
}

/// Structural email check: one `@`, non-empty local part and domain,
/// no whitespace and no empty dot-separated labels.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    let labels_ok = |part: &str| part.split('.').all(|segment| !segment.is_empty());
    labels_ok(local) && labels_ok(domain)
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339 timestamps
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

/// PostgreSQL `NUMERIC` bounds: digits before and after the decimal point
const MAX_INTEGER_DIGITS: i64 = 131_072;
const MAX_FRACTION_DIGITS: i64 = 16_383;

/// Plain or scientific decimal notation, kept at full precision
fn parse_decimal(raw: &str) -> Option<BigDecimal> {
    let shape_ok = raw.chars().any(|c| c.is_ascii_digit())
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !shape_ok {
        return None;
    }

    let value = raw.parse::<BigDecimal>().ok()?;
    let (unscaled, scale) = value.as_bigint_and_exponent();
    let integer_digits = unscaled.to_string().trim_start_matches('-').len() as i64 - scale;
    if scale > MAX_FRACTION_DIGITS || integer_digits > MAX_INTEGER_DIGITS {
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn reports_every_failing_field() {
        let input = object(json!({ "email": "not-an-email", "phone": 42 }));
        let mut v = Validator::new(&input);
        v.string("name", Presence::Required, Length::max(255));
        v.email("email", Presence::Required, Length::max(255));
        v.string("phone", Presence::Nullable, Length::max(20));
        let errors = v.finish().unwrap_err();

        assert_eq!(errors["name"], vec!["The name field is required."]);
        assert_eq!(errors["email"], vec!["The email field must be a valid email address."]);
        assert_eq!(errors["phone"], vec!["The phone field must be a string."]);
    }

    #[test]
    fn sometimes_skips_absent_but_rejects_empty() {
        let input = object(json!({ "email": "  " }));
        let mut v = Validator::new(&input);
        assert_eq!(v.string("name", Presence::Sometimes, Length::max(255)), Field::Absent);
        v.email("email", Presence::Sometimes, Length::max(255));
        let errors = v.finish().unwrap_err();

        assert!(!errors.contains_key("name"));
        assert_eq!(errors["email"], vec!["The email field is required."]);
    }

    #[test]
    fn nullable_fields_accept_null_and_empty() {
        let input = object(json!({ "phone": null, "address": "" }));
        let mut v = Validator::new(&input);
        assert_eq!(v.string("phone", Presence::Nullable, Length::max(20)), Field::Null);
        assert_eq!(v.string("address", Presence::Nullable, Length::max(255)), Field::Null);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn strings_are_trimmed_but_secrets_are_not() {
        let input = object(json!({ "name": "  Ada  ", "password": " pass word " }));
        let mut v = Validator::new(&input);
        assert_eq!(v.string("name", Presence::Required, Length::max(255)), Field::Value("Ada".to_string()));
        assert_eq!(
            v.secret("password", Presence::Required, Length::min(8)),
            Field::Value(" pass word ".to_string())
        );
    }

    #[test]
    fn lengths_count_characters() {
        let input = object(json!({ "name": "é".repeat(255), "password": "short" }));
        let mut v = Validator::new(&input);
        assert!(matches!(v.string("name", Presence::Required, Length::max(255)), Field::Value(_)));
        v.secret("password", Presence::Required, Length::min(8));
        let errors = v.finish().unwrap_err();
        assert_eq!(errors["password"], vec!["The password field must be at least 8 characters."]);
    }

    #[test]
    fn too_long_message_uses_limit() {
        let input = object(json!({ "phone": "1".repeat(21) }));
        let mut v = Validator::new(&input);
        v.string("phone", Presence::Nullable, Length::max(20));
        let errors = v.finish().unwrap_err();
        assert_eq!(errors["phone"], vec!["The phone field must not be greater than 20 characters."]);
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@example.co.uk"));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user name@example.com"));
        assert!(!is_valid_email("user@example..com"));
    }

    #[test]
    fn dates_accept_common_formats() {
        let input = object(json!({
            "a": "2024-05-30",
            "b": "2024-05-30 10:15:00",
            "c": "2024-05-30T10:15:00Z",
            "d": "30/05/2024",
            "e": 20240530
        }));
        let mut v = Validator::new(&input);
        let expected = NaiveDate::from_ymd_opt(2024, 5, 30).unwrap();
        assert_eq!(v.date("a", Presence::Required), Field::Value(expected));
        assert_eq!(v.date("b", Presence::Required), Field::Value(expected));
        assert_eq!(v.date("c", Presence::Required), Field::Value(expected));
        assert_eq!(v.date("d", Presence::Required), Field::Absent);
        assert_eq!(v.date("e", Presence::Required), Field::Absent);
        let errors = v.finish().unwrap_err();
        assert_eq!(errors["d"], vec!["The d field must be a valid date."]);
        assert!(errors.contains_key("e"));
    }

    #[test]
    fn numeric_accepts_numbers_and_numeric_strings() {
        let input = object(json!({
            "a": 100,
            "b": "150.25",
            "c": -3.5,
            "d": "1e3",
            "e": "abc",
            "f": true
        }));
        let mut v = Validator::new(&input);
        let decimal = |raw: &str| Field::Value(BigDecimal::from_str(raw).unwrap());
        assert_eq!(v.numeric("a", Presence::Required), decimal("100"));
        assert_eq!(v.numeric("b", Presence::Required), decimal("150.25"));
        assert_eq!(v.numeric("c", Presence::Required), decimal("-3.5"));
        assert_eq!(v.numeric("d", Presence::Required), decimal("1000"));
        assert_eq!(v.numeric("e", Presence::Required), Field::Absent);
        assert_eq!(v.numeric("f", Presence::Required), Field::Absent);
        let errors = v.finish().unwrap_err();
        assert_eq!(errors["e"], vec!["The e field must be a number."]);
        assert_eq!(errors["f"], vec!["The f field must be a number."]);
    }

    #[test]
    fn numeric_keeps_full_precision() {
        let input = object(json!({
            "big": "100000000000000000000000000000",
            "precise": "0.12345678901234567890123456789",
            "sci": 1e30,
            "grouped": "1_000"
        }));
        let mut v = Validator::new(&input);
        let decimal = |raw: &str| Field::Value(BigDecimal::from_str(raw).unwrap());
        assert_eq!(v.numeric("big", Presence::Required), decimal("100000000000000000000000000000"));
        assert_eq!(v.numeric("precise", Presence::Required), decimal("0.12345678901234567890123456789"));
        assert_eq!(v.numeric("sci", Presence::Required), decimal("1000000000000000000000000000000"));
        assert_eq!(v.numeric("grouped", Presence::Required), Field::Absent);

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["grouped"]);
    }

    #[test]
    fn numeric_rejects_values_beyond_column_bounds() {
        let input = object(json!({ "tiny": format!("0.{}1", "0".repeat(16_383)) }));
        let mut v = Validator::new(&input);
        assert_eq!(v.numeric("tiny", Presence::Required), Field::Absent);
        assert!(v.finish().is_err());
    }

    #[test]
    fn identifier_reports_selection_message() {
        let input = object(json!({ "customer_id": "abc", "other_id": "12" }));
        let mut v = Validator::new(&input);
        assert_eq!(v.identifier("customer_id", Presence::Required), Field::Absent);
        assert_eq!(v.identifier("other_id", Presence::Required), Field::Value(12));
        let errors = v.finish().unwrap_err();
        assert_eq!(errors["customer_id"], vec!["The selected customer id is invalid."]);
    }

    #[test]
    fn field_into_change_maps_patch_semantics() {
        assert_eq!(Field::<String>::Absent.into_change(), None);
        assert_eq!(Field::<String>::Null.into_change(), Some(None));
        assert_eq!(Field::Value(1).into_change(), Some(Some(1)));
    }
}
