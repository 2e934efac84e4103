//! Validation error types and field helpers

use std::fmt;

/// Validation error for domain models
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., email, YYYY-MM)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Value outside the accepted set (enum variant, catalog entry)
    InvalidVariant { field: &'static str, value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trimmed, non-empty, bounded text field.
pub fn required(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    bounded(field, value, max)
}

/// Optional text field: blank becomes `None`.
pub fn optional(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => bounded(field, v, max).map(Some),
    }
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(value.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "name",
            max: 200,
        };
        assert_eq!(err.to_string(), "name exceeds maximum length of 200 characters");

        let err = ValidationError::InvalidVariant {
            field: "branch",
            value: "Moon Base".into(),
        };
        assert_eq!(err.to_string(), "invalid branch value: 'Moon Base'");
    }

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Ana  ", 10).unwrap(), "Ana");
        assert!(matches!(
            required("name", "   ", 10),
            Err(ValidationError::Empty { field: "name" })
        ));
        assert!(matches!(
            required("name", "abcdef", 5),
            Err(ValidationError::TooLong { max: 5, .. })
        ));
    }

    #[test]
    fn optional_blank_is_none() {
        assert_eq!(optional("notes", None, 10).unwrap(), None);
        assert_eq!(optional("notes", Some("  "), 10).unwrap(), None);
        assert_eq!(optional("notes", Some(" ok "), 10).unwrap().as_deref(), Some("ok"));
    }
}
