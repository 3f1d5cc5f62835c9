//! Startup data: the initial administrator account.

use std::sync::Arc;

use salon_auth::{
    AccountAdminService, AccountDirectory, AuthError, AuthenticatedIdentity, CreateAccount,
    PasswordHasher, roles,
};

use crate::config::BootstrapConfig;

/// Make sure the configured administrator account exists.
///
/// Returns the account when it was created by this call. An existing account
/// with the same email is left untouched, whatever its role or state.
pub async fn bootstrap_admin(
    directory: Arc<dyn AccountDirectory>,
    hasher: PasswordHasher,
    config: &BootstrapConfig,
) -> Result<Option<AuthenticatedIdentity>, AuthError> {
    let Some((email, password)) = config.admin_credentials() else {
        return Ok(None);
    };

    if directory.find_by_email(email).await?.is_some() {
        tracing::debug!("bootstrap administrator already present");
        return Ok(None);
    }

    let role = directory
        .list_roles()
        .await?
        .into_iter()
        .find(|r| r.name == roles::ADMINISTRATOR)
        .ok_or(AuthError::RoleNotFound)?;

    let admin = AccountAdminService::new(directory, hasher);
    let identity = admin
        .create_user(CreateAccount {
            email: email.to_string(),
            password: password.to_string(),
            role_id: role.id,
            active: Some(true),
        })
        .await?;

    tracing::info!(user_id = %identity.id, "bootstrap administrator created");
    Ok(Some(identity))
}
