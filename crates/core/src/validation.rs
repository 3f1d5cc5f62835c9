//! Input-shape rules for account credentials.

use crate::error::{DomainError, DomainResult};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Basic email shape check: `local@domain`, both parts non-empty.
///
/// Emails are stored exactly as given (case-sensitive), so no normalization
/// happens here.
pub fn validate_email(email: &str) -> DomainResult<()> {
    if email.trim().is_empty() {
        return Err(DomainError::validation("email is required"));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::validation("email must be a valid address")),
    }
}

pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an email/password pair as submitted for a new account.
pub fn validate_credentials(email: &str, password: &str) -> DomainResult<()> {
    validate_email(email)?;
    validate_password(password)
}
