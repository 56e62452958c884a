//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a registration number after normalization.
pub const MAX_REGISTRATION_LENGTH: usize = 16;

/// Maximum length of a handler note.
pub const MAX_HANDLER_NOTE_LENGTH: usize = 2000;

/// Normalizes a registration number: trims surrounding whitespace and
/// uppercases the remainder. The stored and displayed form is always the
/// normalized one.
pub fn normalize_registration(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Validates a registration number (after normalization it must be non-empty
/// and within length limits).
pub fn validate_registration(raw: &str) -> Result<(), ValidationError> {
    let normalized = normalize_registration(raw);
    if normalized.is_empty() {
        let mut err = ValidationError::new("registration_empty");
        err.message = Some("Registration number must not be empty".into());
        return Err(err);
    }
    if normalized.len() > MAX_REGISTRATION_LENGTH {
        let mut err = ValidationError::new("registration_too_long");
        err.message = Some("Registration number is too long".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a handler note length.
pub fn validate_handler_note(note: &str) -> Result<(), ValidationError> {
    if note.len() > MAX_HANDLER_NOTE_LENGTH {
        let mut err = ValidationError::new("handler_note_too_long");
        err.message = Some("Handler note is too long".into());
        return Err(err);
    }
    Ok(())
}
