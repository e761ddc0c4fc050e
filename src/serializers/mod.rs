//! Explicit request/response shaping for every entity.
//!
//! Incoming bodies are read through [`Fields`], which applies the field-level
//! rules (required, null, blank, length, type) and accumulates every failure
//! so a single 400 can report all of them. Outgoing bodies are plain
//! `Serialize` view structs built from the stored models.

pub mod account;
pub mod category;
pub mod community;
pub mod post;
pub mod profile;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult, FieldErrors};

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const EMPTY_LIST: &str = "This list may not be empty.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_BOOLEAN: &str = "Must be a valid boolean.";
const NOT_INTEGER: &str = "A valid integer is required.";
const BAD_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
const BAD_EMAIL: &str = "Enter a valid email address.";

/// Longest stored image path.
const MAX_IMAGE_PATH: usize = 100;

/// Largest value a stored counter accepts.
const MAX_COUNTER: i64 = 2_147_483_647;

pub fn does_not_exist(id: i64) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// The name a client-side developer would recognize for a JSON value's type.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Reads typed fields out of a JSON object, collecting per-field errors.
///
/// In partial mode (PATCH) absent fields are simply skipped; otherwise an
/// absent required field is an error.
pub struct Fields<'a> {
    data: &'a Map<String, Value>,
    partial: bool,
    errors: FieldErrors,
}

impl<'a> Fields<'a> {
    pub fn new(body: &'a Value, partial: bool) -> AppResult<Self> {
        match body {
            Value::Object(data) => Ok(Self {
                data,
                partial,
                errors: FieldErrors::new(),
            }),
            other => Err(AppError::field(
                "non_field_errors",
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    type_name(other)
                ),
            )),
        }
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Fails with every collected error, if there are any.
    pub fn finish(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }

    fn get(&mut self, field: &str, required: bool) -> Option<&'a Value> {
        let value = self.data.get(field);
        if value.is_none() && required && !self.partial {
            self.error(field, REQUIRED);
        }
        value
    }

    fn as_str(&mut self, field: &str, value: &'a Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => {
                self.error(field, NOT_STRING);
                None
            }
        }
    }

    fn check_len(&mut self, field: &str, value: String, max_len: Option<usize>) -> Option<String> {
        match max_len {
            Some(max) if value.chars().count() > max => {
                self.error(field, too_long(max));
                None
            }
            _ => Some(value),
        }
    }

    /// A required, non-null, non-blank string.
    pub fn required_str(&mut self, field: &str, max_len: Option<usize>) -> Option<String> {
        let value = self.get(field, true)?;
        if value.is_null() {
            self.error(field, NOT_NULL);
            return None;
        }
        let s = self.as_str(field, value)?;
        if s.is_empty() {
            self.error(field, NOT_BLANK);
            return None;
        }
        self.check_len(field, s, max_len)
    }

    /// An optional string that may be blank but not null.
    pub fn blank_str(&mut self, field: &str, max_len: Option<usize>) -> Option<String> {
        let value = self.get(field, false)?;
        if value.is_null() {
            self.error(field, NOT_NULL);
            return None;
        }
        let s = self.as_str(field, value)?;
        self.check_len(field, s, max_len)
    }

    /// An optional string that may be blank or null.
    pub fn nullable_str(&mut self, field: &str, max_len: Option<usize>) -> Option<Option<String>> {
        let value = self.get(field, false)?;
        if value.is_null() {
            return Some(None);
        }
        let s = self.as_str(field, value)?;
        self.check_len(field, s, max_len).map(Some)
    }

    /// An optional image reference. `media_url` is stripped so serialized values round-trip.
    pub fn nullable_image(&mut self, field: &str, media_url: &str) -> Option<Option<String>> {
        let Some(path) = self.nullable_str(field, None)? else {
            return Some(None);
        };
        let relative = path.strip_prefix(media_url).unwrap_or(&path).to_string();
        if relative.is_empty() {
            return Some(None);
        }
        self.check_len(field, relative, Some(MAX_IMAGE_PATH)).map(Some)
    }

    pub fn email(&mut self, field: &str, max_len: usize) -> Option<String> {
        let email = self.required_str(field, Some(max_len))?;
        if is_valid_email(&email) {
            Some(email)
        } else {
            self.error(field, BAD_EMAIL);
            None
        }
    }

    pub fn boolean(&mut self, field: &str) -> Option<bool> {
        let value = self.get(field, false)?;
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        };
        if parsed.is_none() {
            self.error(field, if value.is_null() { NOT_NULL } else { NOT_BOOLEAN });
        }
        parsed
    }

    /// An optional non-negative integer counter.
    pub fn counter(&mut self, field: &str) -> Option<i64> {
        let value = self.get(field, false)?;
        if value.is_null() {
            self.error(field, NOT_NULL);
            return None;
        }
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match parsed {
            None => {
                self.error(field, NOT_INTEGER);
                None
            }
            Some(n) if n < 0 => {
                self.error(field, "Ensure this value is greater than or equal to 0.");
                None
            }
            Some(n) if n > MAX_COUNTER => {
                self.error(
                    field,
                    format!("Ensure this value is less than or equal to {MAX_COUNTER}."),
                );
                None
            }
            Some(n) => Some(n),
        }
    }

    fn as_pk(&mut self, field: &str, value: &Value) -> Option<i64> {
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.error(
                field,
                format!(
                    "Incorrect type. Expected pk value, received {}.",
                    type_name(value)
                ),
            );
        }
        parsed
    }

    /// A required reference to another row by id.
    pub fn pk(&mut self, field: &str) -> Option<i64> {
        let value = self.get(field, true)?;
        if value.is_null() {
            self.error(field, NOT_NULL);
            return None;
        }
        self.as_pk(field, value)
    }

    pub fn nullable_pk(&mut self, field: &str) -> Option<Option<i64>> {
        let value = self.get(field, false)?;
        if value.is_null() {
            return Some(None);
        }
        self.as_pk(field, value).map(Some)
    }

    /// A required, non-empty list of ids. Duplicates collapse.
    pub fn pk_list(&mut self, field: &str) -> Option<Vec<i64>> {
        let value = self.get(field, true)?;
        let Value::Array(items) = value else {
            self.error(
                field,
                if value.is_null() {
                    NOT_NULL.to_string()
                } else {
                    format!(
                        "Expected a list of items but got type \"{}\".",
                        type_name(value)
                    )
                },
            );
            return None;
        };
        if items.is_empty() {
            self.error(field, EMPTY_LIST);
            return None;
        }

        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            ids.push(self.as_pk(field, item)?);
        }
        ids.sort_unstable();
        ids.dedup();
        Some(ids)
    }

    pub fn nullable_date(&mut self, field: &str) -> Option<Option<NaiveDate>> {
        let value = self.get(field, false)?;
        match value {
            Value::Null => Some(None),
            Value::String(s) if s.trim().is_empty() => Some(None),
            Value::String(s) => match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
                Ok(date) => Some(Some(date)),
                Err(_) => {
                    self.error(field, BAD_DATE);
                    None
                }
            },
            _ => {
                self.error(field, BAD_DATE);
                None
            }
        }
    }
}

/// Turns a value the caller knows was validated back into a typed result.
pub fn require<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::field(field, REQUIRED))
}

/// Accepts `local@domain.tld` with no whitespace and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    if local.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}
