use crate::error::{ExchangeError, ExchangeResult};

pub const MIN_PASSWORD_LEN: usize = 8;

#[inline]
pub fn check_password(password: &str) -> ExchangeResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ExchangeError::validation("Password must be at least 8 characters"));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(ExchangeError::validation(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(ExchangeError::validation(
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ExchangeError::validation("Password must contain at least one digit"));
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Err(ExchangeError::validation(
            "Password must contain at least one special character",
        ));
    }
    Ok(())
}

/// Trims `value` and checks it still has `min` characters.
pub fn required_text(field: &str, value: &str, min: usize) -> ExchangeResult<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() < min {
        return Err(ExchangeError::validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Empty or whitespace-only input becomes `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Phone numbers are digits, optionally grouped with spaces or dashes.
pub fn check_phone(phone: Option<&str>) -> ExchangeResult<Option<String>> {
    let Some(phone) = optional_text(phone) else {
        return Ok(None);
    };
    let digits: String = phone.chars().filter(|c| *c != ' ' && *c != '-').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ExchangeError::validation(
            "Phone must contain only digits, spaces, or dashes",
        ));
    }
    Ok(Some(phone))
}
