use thiserror::Error;

use salon_core::DomainError;

use crate::{DirectoryError, PasswordError, TokenError};

/// User-facing auth outcomes.
///
/// None of these are transient; callers must not retry them. Messages never
/// include password material or say whether an account exists.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error("email already registered")]
    EmailTaken,

    #[error("role does not exist")]
    RoleNotFound,

    #[error("invalid token")]
    TokenInvalid,

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Validation(#[from] DomainError),

    /// Backend or hashing failure. Logged in full, reported generically.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DirectoryError> for AuthError {
    fn from(value: DirectoryError) -> Self {
        match value {
            DirectoryError::EmailTaken => AuthError::EmailTaken,
            DirectoryError::RoleNotFound => AuthError::RoleNotFound,
            DirectoryError::NotFound => AuthError::NotFound,
            DirectoryError::Backend(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Encoding(msg) => AuthError::Internal(msg),
            _ => AuthError::TokenInvalid,
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(value: PasswordError) -> Self {
        AuthError::Internal(value.to_string())
    }
}
