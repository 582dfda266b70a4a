//! Validation of the user-supplied `limit` query parameter.

use std::num::IntErrorKind;

use thiserror::Error;

/// Smallest number of posts a caller may request.
pub const MIN_LIMIT: u32 = 1;
/// Largest number of posts a caller may request (one upstream page).
pub const MAX_LIMIT: u32 = 100;
/// Number of posts returned when no limit is given.
pub const DEFAULT_LIMIT: u32 = 30;

/// Structured error type for limit validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    #[error("Invalid limit value: {0}. Must be an integer.")]
    NotAnInteger(String),

    #[error("Limit must be at least {MIN_LIMIT}")]
    BelowMinimum,

    #[error("Limit cannot exceed {MAX_LIMIT}")]
    AboveMaximum,
}

/// Parse and bounds-check a raw limit, falling back to `default` when absent.
///
/// # Errors
///
/// Returns a `LimitError` if the value is not an integer or falls outside
/// `MIN_LIMIT..=MAX_LIMIT`.
pub fn validate_limit(raw: Option<&str>, default: u32) -> Result<u32, LimitError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().parse::<i64>() {
        Ok(parsed) => check_bounds(parsed),
        // Well-formed integers too wide for i64 are still out of range
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Err(LimitError::AboveMaximum),
            IntErrorKind::NegOverflow => Err(LimitError::BelowMinimum),
            _ => Err(LimitError::NotAnInteger(raw.to_string())),
        },
    }
}

/// Bounds check shared by the validator and the backends.
///
/// # Errors
///
/// Returns `BelowMinimum` or `AboveMaximum` for out-of-range values.
pub fn check_bounds(value: i64) -> Result<u32, LimitError> {
    if value < i64::from(MIN_LIMIT) {
        return Err(LimitError::BelowMinimum);
    }
    if value > i64::from(MAX_LIMIT) {
        return Err(LimitError::AboveMaximum);
    }
    u32::try_from(value).map_err(|_| LimitError::AboveMaximum)
}
