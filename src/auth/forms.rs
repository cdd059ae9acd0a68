//! Input validation for sign-in, sign-up and verification forms.
//!
//! Runs before any provider call so obviously bad input never costs a
//! round trip. Messages are user-facing.

use super::provider::AuthError;

/// Length of the numeric verification code the pool emails.
pub const VERIFICATION_CODE_LEN: usize = 6;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Trim and require a plausible email address.
///
/// # Errors
///
/// Returns [`AuthError::InvalidInput`] when empty or missing `@`.
pub fn validate_email(raw: &str) -> Result<String, AuthError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(AuthError::InvalidInput("Enter an email first."));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email.to_owned()),
        _ => Err(AuthError::InvalidInput("Enter a valid email address.")),
    }
}

/// Sign-in only requires both fields to be present.
///
/// # Errors
///
/// Returns [`AuthError::InvalidInput`] for a bad email or empty password.
pub fn validate_sign_in(email: &str, password: &str) -> Result<String, AuthError> {
    let email = validate_email(email)?;
    if password.is_empty() {
        return Err(AuthError::InvalidInput("Enter both email and password."));
    }
    Ok(email)
}

/// Sign-up enforces the pool's password policy hint.
///
/// # Errors
///
/// Returns [`AuthError::InvalidInput`] for a bad email or weak password.
pub fn validate_sign_up(email: &str, password: &str) -> Result<String, AuthError> {
    let email = validate_email(email)?;
    let strong = password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit());
    if !strong {
        return Err(AuthError::InvalidInput(
            "Password must be at least 8 characters with uppercase, lowercase, and numbers.",
        ));
    }
    Ok(email)
}

/// Trim and require exactly six digits.
///
/// # Errors
///
/// Returns [`AuthError::InvalidInput`] for anything else.
pub fn validate_code(raw: &str) -> Result<String, AuthError> {
    let code = raw.trim();
    if code.len() != VERIFICATION_CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::InvalidInput("Enter the 6-digit verification code."));
    }
    Ok(code.to_owned())
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
