//! Input validation applied before any write.
//!
//! Validators trim their input and return the normalized value so callers
//! store exactly what was checked.

use crate::enums::FieldType;

/// Maximum task title length, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,

    #[error("title must be 200 characters or less (got {0})")]
    TitleTooLong(usize),

    #[error("a failure note is required when marking a task as failed")]
    FailureNoteRequired,

    #[error("mood must be between 1 and 5 (got {0})")]
    InvalidMood(i64),

    #[error("field name is required")]
    FieldNameRequired,

    #[error("'{value}' is not a valid number")]
    InvalidNumber { value: String },

    #[error("'{value}' is not a valid time (expected HH:MM)")]
    InvalidTime { value: String },
}

/// Validates and trims a task title.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong(len));
    }
    Ok(title.to_string())
}

/// Validates and trims the note attached to a failed completion.
pub fn validate_failure_note(note: &str) -> Result<String, ValidationError> {
    let note = note.trim();
    if note.is_empty() {
        return Err(ValidationError::FailureNoteRequired);
    }
    Ok(note.to_string())
}

/// Validates and trims a log-field name.
pub fn validate_field_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::FieldNameRequired);
    }
    Ok(name.to_string())
}

/// Checks a log-entry value against its field type.
///
/// Returns `Ok(None)` for an empty value, which callers treat as "nothing
/// to write".
pub fn validate_field_value(
    field_type: FieldType,
    value: &str,
) -> Result<Option<String>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match field_type {
        FieldType::Text => {}
        FieldType::Number => {
            let ok = value.parse::<f64>().map(f64::is_finite).unwrap_or(false);
            if !ok {
                return Err(ValidationError::InvalidNumber {
                    value: value.to_string(),
                });
            }
        }
        FieldType::Time => {
            if parse_time_of_day(value).is_none() {
                return Err(ValidationError::InvalidTime {
                    value: value.to_string(),
                });
            }
        }
    }
    Ok(Some(value.to_string()))
}

/// Trims free-text notes; blank notes become `None`.
pub fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Parses `HH:MM` into minutes after midnight.
pub fn parse_time_of_day(value: &str) -> Option<u32> {
    let (h, m) = value.trim().split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    (h < 24 && m < 60).then_some(h * 60 + m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed() {
        assert_eq!(validate_title("  Read  ").unwrap(), "Read");
    }

    #[test]
    fn blank_title_rejected() {
        assert_eq!(validate_title("   "), Err(ValidationError::TitleRequired));
    }

    #[test]
    fn long_title_rejected() {
        let title = "x".repeat(MAX_TITLE_LEN + 1);
        assert_eq!(
            validate_title(&title),
            Err(ValidationError::TitleTooLong(MAX_TITLE_LEN + 1))
        );
    }

    #[test]
    fn failure_note_required() {
        assert_eq!(
            validate_failure_note(" \n"),
            Err(ValidationError::FailureNoteRequired)
        );
        assert_eq!(validate_failure_note(" sick ").unwrap(), "sick");
    }

    #[test]
    fn number_values() {
        assert_eq!(
            validate_field_value(FieldType::Number, "7.5").unwrap(),
            Some("7.5".to_string())
        );
        assert!(validate_field_value(FieldType::Number, "seven").is_err());
        assert!(validate_field_value(FieldType::Number, "NaN").is_err());
    }

    #[test]
    fn time_values() {
        assert_eq!(parse_time_of_day("07:30"), Some(450));
        assert_eq!(parse_time_of_day("23:59"), Some(1439));
        assert_eq!(parse_time_of_day("24:00"), None);
        assert_eq!(parse_time_of_day("7"), None);
        assert!(validate_field_value(FieldType::Time, "25:00").is_err());
    }

    #[test]
    fn empty_value_means_no_write() {
        assert_eq!(validate_field_value(FieldType::Time, "  ").unwrap(), None);
        assert_eq!(validate_field_value(FieldType::Text, "").unwrap(), None);
    }

    #[test]
    fn notes_normalized() {
        assert_eq!(normalize_notes(Some("  ")), None);
        assert_eq!(normalize_notes(None), None);
        assert_eq!(normalize_notes(Some(" ok ")), Some("ok".to_string()));
    }
}
