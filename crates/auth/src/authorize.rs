use std::borrow::Cow;
use std::collections::HashSet;

use thiserror::Error;

use crate::AuthenticatedIdentity;

/// Static, per-route access declaration.
///
/// Attached to a route when the router is built; never derived from request
/// data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    pub public: bool,
    pub allowed_roles: Option<HashSet<Cow<'static, str>>>,
}

impl RoutePolicy {
    /// No authentication at all.
    pub fn public() -> Self {
        Self {
            public: true,
            allowed_roles: None,
        }
    }

    /// Any active, authenticated account.
    pub fn authenticated() -> Self {
        Self {
            public: false,
            allowed_roles: None,
        }
    }

    /// Authenticated, and the account's role name must be one of `roles`.
    pub fn roles<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Cow<'static, str>>,
    {
        Self {
            public: false,
            allowed_roles: Some(roles.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{0}' is not permitted")]
    Forbidden(String),
}

/// Role-membership check for an already authenticated identity.
///
/// - No IO
/// - No panics
/// - A policy without a role set admits every role
pub fn authorize(identity: &AuthenticatedIdentity, policy: &RoutePolicy) -> Result<(), AuthzError> {
    match &policy.allowed_roles {
        None => Ok(()),
        Some(allowed) if allowed.contains(identity.role_name()) => Ok(()),
        Some(_) => Err(AuthzError::Forbidden(identity.role_name().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Role, roles};
    use chrono::Utc;
    use salon_core::UserId;

    fn identity_with(role: Role) -> AuthenticatedIdentity {
        AuthenticatedIdentity {
            id: UserId::new(1),
            email: "someone@x.com".to_string(),
            role_id: role.id,
            role,
            active: true,
            last_access_at: None,
            created_at: Utc::now(),
        }
    }

    fn seeded(name: &str) -> Role {
        Role::seeded().into_iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn admin_only_policy_admits_admin() {
        let policy = RoutePolicy::roles([roles::ADMINISTRATOR]);
        assert!(authorize(&identity_with(seeded(roles::ADMINISTRATOR)), &policy).is_ok());
    }

    #[test]
    fn admin_only_policy_rejects_client() {
        let policy = RoutePolicy::roles([roles::ADMINISTRATOR]);
        let err = authorize(&identity_with(seeded(roles::CLIENT)), &policy).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden("Cliente".to_string()));
    }

    #[test]
    fn multi_role_policy() {
        let policy = RoutePolicy::roles([roles::ADMINISTRATOR, roles::EMPLOYEE]);
        assert!(authorize(&identity_with(seeded(roles::EMPLOYEE)), &policy).is_ok());
        assert!(authorize(&identity_with(seeded(roles::CLIENT)), &policy).is_err());
    }

    #[test]
    fn authenticated_policy_admits_any_role() {
        let policy = RoutePolicy::authenticated();
        for role in Role::seeded() {
            assert!(authorize(&identity_with(role), &policy).is_ok());
        }
    }

    #[test]
    fn role_names_are_case_sensitive() {
        let policy = RoutePolicy::roles(["administrador"]);
        assert!(authorize(&identity_with(seeded(roles::ADMINISTRATOR)), &policy).is_err());
    }
}
