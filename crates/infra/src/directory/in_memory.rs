use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use salon_auth::{AccountDirectory, DirectoryError, NewUser, Role, User, UserChanges};
use salon_core::{RoleId, UserId};

/// Row as stored; the role is joined on read.
#[derive(Clone)]
struct UserRow {
    id: UserId,
    email: String,
    password_hash: String,
    role_id: RoleId,
    active: bool,
    last_access_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, UserRow>,
    roles: BTreeMap<RoleId, Role>,
    next_user_id: i64,
}

impl State {
    fn join(&self, row: &UserRow) -> Result<User, DirectoryError> {
        let role = self
            .roles
            .get(&row.role_id)
            .cloned()
            .ok_or_else(|| DirectoryError::Backend(format!("dangling role {} for user {}", row.role_id, row.id)))?;

        Ok(User {
            id: row.id,
            email: row.email.clone(),
            password_hash: row.password_hash.clone(),
            role,
            active: row.active,
            last_access_at: row.last_access_at,
            created_at: row.created_at,
        })
    }

    fn email_owner(&self, email: &str) -> Option<UserId> {
        self.users.values().find(|u| u.email == email).map(|u| u.id)
    }
}

/// In-memory account directory for tests/dev.
///
/// Uniqueness checks and writes happen under one write lock, so concurrent
/// creates with the same email produce exactly one row.
pub struct InMemoryAccountDirectory {
    inner: RwLock<State>,
}

impl InMemoryAccountDirectory {
    /// Directory seeded with the standard roles.
    pub fn new() -> Self {
        Self::with_roles(Role::seeded())
    }

    pub fn with_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        let state = State {
            users: BTreeMap::new(),
            roles: roles.into_iter().map(|r| (r.id, r)).collect(),
            next_user_id: 1,
        };
        Self {
            inner: RwLock::new(state),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, DirectoryError> {
        self.inner
            .read()
            .map_err(|_| DirectoryError::Backend("directory lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, DirectoryError> {
        self.inner
            .write()
            .map_err(|_| DirectoryError::Backend("directory lock poisoned".to_string()))
    }
}

impl Default for InMemoryAccountDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let state = self.read()?;
        state
            .users
            .values()
            .find(|u| u.email == email)
            .map(|row| state.join(row))
            .transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DirectoryError> {
        let state = self.read()?;
        state.users.get(&id).map(|row| state.join(row)).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, DirectoryError> {
        let state = self.read()?;
        state.users.values().map(|row| state.join(row)).collect()
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DirectoryError> {
        let mut state = self.write()?;

        if state.email_owner(&new_user.email).is_some() {
            return Err(DirectoryError::EmailTaken);
        }
        if !state.roles.contains_key(&new_user.role_id) {
            return Err(DirectoryError::RoleNotFound);
        }

        let id = UserId::new(state.next_user_id);
        state.next_user_id += 1;

        let row = UserRow {
            id,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role_id: new_user.role_id,
            active: new_user.active,
            last_access_at: None,
            created_at: Utc::now(),
        };
        let user = state.join(&row)?;
        state.users.insert(id, row);
        Ok(user)
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, DirectoryError> {
        let mut state = self.write()?;

        if !state.users.contains_key(&id) {
            return Err(DirectoryError::NotFound);
        }
        if let Some(email) = &changes.email {
            if state.email_owner(email).is_some_and(|owner| owner != id) {
                return Err(DirectoryError::EmailTaken);
            }
        }
        if let Some(role_id) = changes.role_id {
            if !state.roles.contains_key(&role_id) {
                return Err(DirectoryError::RoleNotFound);
            }
        }

        let mut row = state.users.get(&id).cloned().ok_or(DirectoryError::NotFound)?;
        if let Some(email) = changes.email {
            row.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            row.password_hash = password_hash;
        }
        if let Some(role_id) = changes.role_id {
            row.role_id = role_id;
        }
        if let Some(active) = changes.active {
            row.active = active;
        }

        let user = state.join(&row)?;
        state.users.insert(id, row);
        Ok(user)
    }

    async fn update_last_access(&self, id: UserId, at: DateTime<Utc>) -> Result<(), DirectoryError> {
        let mut state = self.write()?;
        let row = state.users.get_mut(&id).ok_or(DirectoryError::NotFound)?;
        row.last_access_at = Some(at);
        Ok(())
    }

    async fn update_active_flag(&self, id: UserId, active: bool) -> Result<User, DirectoryError> {
        let mut state = self.write()?;
        let row = state.users.get_mut(&id).ok_or(DirectoryError::NotFound)?;
        row.active = active;
        let row = row.clone();
        state.join(&row)
    }

    async fn role_exists(&self, id: RoleId) -> Result<bool, DirectoryError> {
        Ok(self.read()?.roles.contains_key(&id))
    }

    async fn find_role(&self, id: RoleId) -> Result<Option<Role>, DirectoryError> {
        Ok(self.read()?.roles.get(&id).cloned())
    }

    async fn list_roles(&self) -> Result<Vec<Role>, DirectoryError> {
        Ok(self.read()?.roles.values().cloned().collect())
    }
}
