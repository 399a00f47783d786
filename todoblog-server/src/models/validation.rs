//! Validation error types

use std::collections::BTreeMap;
use std::fmt;

/// Validation error for domain models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },
}

impl ValidationError {
    /// Form field this error belongs to
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Per-field validation messages collected while checking a whole form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the value on success, record the message on failure.
    pub fn check<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.0.insert(e.field(), e.to_string());
                None
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Trim `raw` and enforce a non-empty, char-count bounded value.
pub(crate) fn bounded_text(
    field: &'static str,
    raw: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "task",
            max: 100,
        };
        assert_eq!(
            err.to_string(),
            "task exceeds maximum length of 100 characters"
        );
    }

    #[test]
    fn bounded_text_counts_chars_not_bytes() {
        let accented = "é".repeat(100);
        assert_eq!(bounded_text("task", &accented, 100).unwrap(), accented);
        assert!(bounded_text("task", &"é".repeat(101), 100).is_err());
    }

    #[test]
    fn bounded_text_trims() {
        assert_eq!(bounded_text("task", "  hi  ", 10).unwrap(), "hi");
        assert_eq!(
            bounded_text("task", "   ", 10),
            Err(ValidationError::Empty { field: "task" })
        );
    }

    #[test]
    fn field_errors_collect_by_field() {
        let mut errors = FieldErrors::new();
        assert_eq!(errors.check(bounded_text("task", "ok", 10)), Some("ok".into()));
        assert_eq!(errors.check(bounded_text("description", "", 10)), None);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("description"), Some("description cannot be empty"));
        assert_eq!(errors.get("task"), None);
    }
}
