//! `salon-auth`: authentication and role-based authorization boundary.
//!
//! This crate knows nothing about HTTP or storage: account
//! persistence is reached through the [`AccountDirectory`] trait and the
//! transport layer only hands the guard chain a raw `Authorization` value.

pub mod admin;
pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod guard;
pub mod password;
pub mod roles;
pub mod session;
pub mod token;
pub mod user;

pub use admin::{AccountAdminService, CreateAccount, UpdateAccount};
pub use authorize::{AuthzError, RoutePolicy, authorize};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use credentials::CredentialValidator;
pub use directory::{AccountDirectory, DirectoryError};
pub use error::AuthError;
pub use guard::{GuardOutcome, RequestGuardChain, extract_bearer};
pub use password::{PasswordError, PasswordHasher};
pub use roles::{Role, RoleDetail, RoleMember, RoleSummary};
pub use session::{AuthSession, AuthSessionService, Registration};
pub use token::{Hs256TokenService, TokenError, TokenService, TokenSubject};
pub use user::{AuthenticatedIdentity, NewUser, User, UserChanges};
