//! Administrative account management and the role catalogue.

use std::sync::Arc;

use salon_core::{RoleId, UserId, validation};

use crate::roles::{RoleDetail, RoleMember, RoleSummary};
use crate::{AccountDirectory, AuthError, AuthenticatedIdentity, NewUser, PasswordHasher, UserChanges};

#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub email: String,
    pub password: String,
    pub role_id: RoleId,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAccount {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<RoleId>,
    pub active: Option<bool>,
}

/// Account CRUD for administrators. Every result is sanitized.
pub struct AccountAdminService {
    directory: Arc<dyn AccountDirectory>,
    hasher: PasswordHasher,
}

impl AccountAdminService {
    pub fn new(directory: Arc<dyn AccountDirectory>, hasher: PasswordHasher) -> Self {
        Self { directory, hasher }
    }

    pub async fn create_user(&self, req: CreateAccount) -> Result<AuthenticatedIdentity, AuthError> {
        validation::validate_credentials(&req.email, &req.password)?;

        if self.directory.find_by_email(&req.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }
        if !self.directory.role_exists(req.role_id).await? {
            return Err(AuthError::RoleNotFound);
        }

        let password_hash = self.hasher.spawn_hash(&req.password).await?;
        let user = self
            .directory
            .create(NewUser {
                email: req.email,
                password_hash,
                role_id: req.role_id,
                active: req.active.unwrap_or(true),
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "account created by administrator");
        Ok(user.identity())
    }

    pub async fn list_users(&self) -> Result<Vec<AuthenticatedIdentity>, AuthError> {
        let users = self.directory.list_users().await?;
        Ok(users.iter().map(|u| u.identity()).collect())
    }

    pub async fn get_user(&self, id: UserId) -> Result<AuthenticatedIdentity, AuthError> {
        self.directory
            .find_by_id(id)
            .await?
            .map(|u| u.identity())
            .ok_or(AuthError::NotFound)
    }

    /// Apply a partial update. All checks run before the single write.
    pub async fn update_user(
        &self,
        id: UserId,
        req: UpdateAccount,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let current = self.directory.find_by_id(id).await?.ok_or(AuthError::NotFound)?;

        if let Some(email) = &req.email {
            validation::validate_email(email)?;
            if let Some(other) = self.directory.find_by_email(email).await? {
                if other.id != current.id {
                    return Err(AuthError::EmailTaken);
                }
            }
        }
        if let Some(password) = &req.password {
            validation::validate_password(password)?;
        }
        if let Some(role_id) = req.role_id {
            if !self.directory.role_exists(role_id).await? {
                return Err(AuthError::RoleNotFound);
            }
        }

        let password_hash = match &req.password {
            Some(password) => Some(self.hasher.spawn_hash(password).await?),
            None => None,
        };

        let changes = UserChanges {
            email: req.email,
            password_hash,
            role_id: req.role_id,
            active: req.active,
        };
        if changes.is_empty() {
            return Ok(current.identity());
        }

        let user = self.directory.update(id, changes).await?;
        tracing::info!(user_id = %user.id, active = user.active, "account updated by administrator");
        Ok(user.identity())
    }

    /// Soft delete: the record stays, `active` becomes `false`.
    pub async fn deactivate_user(&self, id: UserId) -> Result<AuthenticatedIdentity, AuthError> {
        let user = self.directory.update_active_flag(id, false).await?;
        tracing::info!(user_id = %user.id, "account deactivated");
        Ok(user.identity())
    }

    /// Every role with the number of accounts (active or not) holding it.
    pub async fn list_roles(&self) -> Result<Vec<RoleSummary>, AuthError> {
        let roles = self.directory.list_roles().await?;
        let users = self.directory.list_users().await?;

        Ok(roles
            .into_iter()
            .map(|role| RoleSummary {
                user_count: users.iter().filter(|u| u.role.id == role.id).count(),
                role,
            })
            .collect())
    }

    pub async fn get_role(&self, id: RoleId) -> Result<RoleDetail, AuthError> {
        let role = self.directory.find_role(id).await?.ok_or(AuthError::NotFound)?;
        let users = self
            .directory
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.role.id == id)
            .map(|u| RoleMember {
                id: u.id,
                email: u.email,
                active: u.active,
            })
            .collect();

        Ok(RoleDetail { role, users })
    }
}
