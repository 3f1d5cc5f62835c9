//! User account records and their sanitized projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salon_core::{RoleId, UserId};

use crate::Role;
use crate::token::TokenSubject;

// ─────────────────────────────────────────────────────────────────────────────
// Stored account
// ─────────────────────────────────────────────────────────────────────────────

/// A stored user account, joined with its role.
///
/// # Invariants
/// - `email` is unique across all accounts (enforced by the directory).
/// - `password_hash` never leaves this crate: `User` is not `Serialize`, its
///   `Debug` output redacts the digest, and every outward-facing value is an
///   [`AuthenticatedIdentity`].
/// - Accounts are never removed; deactivation flips `active` to `false`.
#[derive(Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub last_access_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role_id(&self) -> RoleId {
        self.role.id
    }

    /// Sanitized projection (no password material).
    pub fn identity(&self) -> AuthenticatedIdentity {
        AuthenticatedIdentity {
            id: self.id,
            email: self.email.clone(),
            role_id: self.role.id,
            role: self.role.clone(),
            active: self.active,
            last_access_at: self.last_access_at,
            created_at: self.created_at,
        }
    }
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("active", &self.active)
            .field("last_access_at", &self.last_access_at)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Values for a new account row. The password is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role_id: RoleId,
    pub active: bool,
}

/// Partial update of an account. `None` leaves a field untouched.
#[derive(Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role_id: Option<RoleId>,
    pub active: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password_hash.is_none()
            && self.role_id.is_none()
            && self.active.is_none()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sanitized identity
// ─────────────────────────────────────────────────────────────────────────────

/// An account as seen by callers: the user plus its role, without any
/// password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedIdentity {
    pub id: UserId,
    pub email: String,
    pub role_id: RoleId,
    pub role: Role,
    pub active: bool,
    pub last_access_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AuthenticatedIdentity {
    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject {
            subject_id: self.id,
            email: self.email.clone(),
            role_id: self.role_id,
        }
    }

    pub fn role_name(&self) -> &str {
        self.role.as_str()
    }
}
