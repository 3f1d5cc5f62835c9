//! Login, registration and profile retrieval.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use salon_core::{RoleId, UserId, validation};

use crate::{
    AccountDirectory, AuthError, AuthenticatedIdentity, CredentialValidator, NewUser,
    PasswordError, PasswordHasher, TokenService,
};

/// Result of a successful login or registration.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthenticatedIdentity,
}

/// Self-service registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role_id: RoleId,
}

/// Entry point for auth-specific business operations.
///
/// Constructed once at startup; all collaborators are injected.
pub struct AuthSessionService {
    credentials: CredentialValidator,
    directory: Arc<dyn AccountDirectory>,
    hasher: PasswordHasher,
    tokens: Arc<dyn TokenService>,
}

impl AuthSessionService {
    pub fn new(
        directory: Arc<dyn AccountDirectory>,
        hasher: PasswordHasher,
        tokens: Arc<dyn TokenService>,
    ) -> Result<Self, PasswordError> {
        let credentials = CredentialValidator::new(directory.clone(), hasher.clone())?;
        Ok(Self {
            credentials,
            directory,
            hasher,
            tokens,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let mut identity = match self.credentials.validate(email, password).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(reason = %e, "login rejected");
                return Err(e);
            }
        };

        // Best effort: a failed write must not fail the login.
        let now = Utc::now();
        match self.directory.update_last_access(identity.id, now).await {
            Ok(()) => identity.last_access_at = Some(now),
            Err(e) => tracing::warn!(user_id = %identity.id, "failed to record last access: {e}"),
        }

        let access_token = self.tokens.issue(&identity.token_subject(), now)?;
        tracing::info!(user_id = %identity.id, role = %identity.role, "login succeeded");

        Ok(AuthSession {
            access_token,
            user: identity,
        })
    }

    /// Create an active account and sign it in.
    ///
    /// Both the email and role checks complete before anything is written.
    /// The directory's own uniqueness guarantee covers a concurrent
    /// registration slipping in between check and create.
    pub async fn register(&self, registration: Registration) -> Result<AuthSession, AuthError> {
        let Registration {
            email,
            password,
            role_id,
        } = registration;

        validation::validate_credentials(&email, &password)?;

        if self.directory.find_by_email(&email).await?.is_some() {
            tracing::warn!(role_id = %role_id, "registration rejected: email taken");
            return Err(AuthError::EmailTaken);
        }

        if !self.directory.role_exists(role_id).await? {
            tracing::warn!(role_id = %role_id, "registration rejected: unknown role");
            return Err(AuthError::RoleNotFound);
        }

        let password_hash = self.hasher.spawn_hash(&password).await?;

        let user = self
            .directory
            .create(NewUser {
                email,
                password_hash,
                role_id,
                active: true,
            })
            .await?;

        let identity = user.identity();
        let access_token = self.tokens.issue(&identity.token_subject(), Utc::now())?;
        tracing::info!(user_id = %identity.id, role = %identity.role, "account registered");

        Ok(AuthSession {
            access_token,
            user: identity,
        })
    }

    /// Sanitized profile of an already-authenticated caller.
    pub async fn get_profile(&self, user_id: UserId) -> Result<AuthenticatedIdentity, AuthError> {
        self.directory
            .find_by_id(user_id)
            .await?
            .map(|user| user.identity())
            .ok_or(AuthError::NotFound)
    }
}
