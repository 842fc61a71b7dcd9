//! Task form validation.
//!
//! `clean_task` is a pure function of its input: it normalizes the submitted
//! text and rejects anything the `tasks` table must never hold. Handlers
//! surface the error message as a flash (page flows) or a 400 JSON body
//! (AJAX flows).

use thiserror::Error;

/// Maximum stored description length, matching the column constraint.
pub const MAX_TASK_LEN: usize = 200;

/// Minimum trimmed length accepted by the create form.
pub const MIN_TASK_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Task cannot be empty!")]
    Empty,
    #[error("Task must be at least {MIN_TASK_LEN} characters long!")]
    TooShort,
    #[error("Task must be at most {MAX_TASK_LEN} characters long!")]
    TooLong,
}

/// Trim and validate submitted task text, returning the normalized form.
///
/// Length limits are counted in characters, not bytes, so multi-byte input
/// is not cut short.
pub fn clean_task(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    let len = trimmed.chars().count();
    if len < MIN_TASK_LEN {
        return Err(ValidationError::TooShort);
    }
    if len > MAX_TASK_LEN {
        return Err(ValidationError::TooLong);
    }
    Ok(trimmed.to_string())
}
