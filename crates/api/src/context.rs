use salon_auth::AuthenticatedIdentity;
use salon_core::UserId;

/// Principal context for a request (the live, authenticated account).
///
/// Inserted by the guard middleware only after the token was verified and the
/// account re-read as active. Never built from request data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    identity: AuthenticatedIdentity,
}

impl PrincipalContext {
    pub fn new(identity: AuthenticatedIdentity) -> Self {
        Self { identity }
    }

    pub fn user_id(&self) -> UserId {
        self.identity.id
    }

    pub fn role_name(&self) -> &str {
        self.identity.role_name()
    }

    pub fn identity(&self) -> &AuthenticatedIdentity {
        &self.identity
    }
}
