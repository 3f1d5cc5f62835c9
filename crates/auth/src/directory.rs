//! Account persistence boundary.
//!
//! Implementations live in `salon-infra`; this crate only depends on the trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use salon_core::{RoleId, UserId};

use crate::{NewUser, Role, User, UserChanges};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("email already registered")]
    EmailTaken,

    #[error("role does not exist")]
    RoleNotFound,

    #[error("account not found")]
    NotFound,

    #[error("directory backend failure: {0}")]
    Backend(String),
}

/// Narrow, purpose-built queries over `users` and `roles`.
///
/// Every returned [`User`] is joined with its [`Role`].
///
/// `create` and `update` are the synchronization point for email uniqueness:
/// they must fail with [`DirectoryError::EmailTaken`] without writing when the
/// email belongs to another account, even under concurrent calls.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DirectoryError>;

    /// All accounts ordered by id, active or not.
    async fn list_users(&self) -> Result<Vec<User>, DirectoryError>;

    async fn create(&self, new_user: NewUser) -> Result<User, DirectoryError>;

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, DirectoryError>;

    async fn update_last_access(&self, id: UserId, at: DateTime<Utc>) -> Result<(), DirectoryError>;

    async fn update_active_flag(&self, id: UserId, active: bool) -> Result<User, DirectoryError>;

    async fn role_exists(&self, id: RoleId) -> Result<bool, DirectoryError>;

    async fn find_role(&self, id: RoleId) -> Result<Option<Role>, DirectoryError>;

    async fn list_roles(&self) -> Result<Vec<Role>, DirectoryError>;
}
