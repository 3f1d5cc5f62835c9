use std::sync::Arc;

use crate::{AccountDirectory, AuthError, AuthenticatedIdentity, PasswordError, PasswordHasher};

/// Plaintext verified against when the email is unknown, so a miss costs
/// the same hashing work as a wrong password.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Checks an email/password pair against the directory.
pub struct CredentialValidator {
    directory: Arc<dyn AccountDirectory>,
    hasher: PasswordHasher,
    decoy_digest: String,
}

impl CredentialValidator {
    pub fn new(
        directory: Arc<dyn AccountDirectory>,
        hasher: PasswordHasher,
    ) -> Result<Self, PasswordError> {
        let decoy_digest = hasher.hash(DECOY_PASSWORD)?;
        Ok(Self {
            directory,
            hasher,
            decoy_digest,
        })
    }

    /// Resolve credentials to an identity.
    ///
    /// Order matters: unknown email and wrong password are the same
    /// `InvalidCredentials`; the active flag is only consulted after the
    /// password matched, and an inactive account never yields an identity.
    pub async fn validate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let Some(user) = self.directory.find_by_email(email).await? else {
            let _ = self.hasher.spawn_verify(password, &self.decoy_digest).await;
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.spawn_verify(password, &user.password_hash).await {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.active {
            return Err(AuthError::AccountInactive);
        }

        Ok(user.identity())
    }
}
