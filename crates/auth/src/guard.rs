//! Per-request access evaluation.
//!
//! `Received → (public → Public) | (authenticate → Unauthorized | identity)
//!  → (role check → Forbidden | Authorized)`
//!
//! Stages run strictly in order and stop at the first rejection.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{AccountDirectory, AuthenticatedIdentity, RoutePolicy, TokenService, authorize};

/// Terminal state of a request passing through the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Route is public; dispatched without looking at credentials.
    Public,
    /// Authenticated and permitted; the identity travels to the handler.
    Authorized(AuthenticatedIdentity),
    /// Missing/invalid token, or the account is gone or inactive.
    Unauthorized,
    /// Authenticated, but the role is not in the route's allowed set.
    Forbidden,
}

impl GuardOutcome {
    pub fn is_dispatch(&self) -> bool {
        matches!(self, GuardOutcome::Public | GuardOutcome::Authorized(_))
    }
}

/// Extract the token from an `Authorization` header value (`Bearer <token>`).
///
/// The scheme is matched case-insensitively; an empty token counts as absent.
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub struct RequestGuardChain {
    tokens: Arc<dyn TokenService>,
    directory: Arc<dyn AccountDirectory>,
}

impl RequestGuardChain {
    pub fn new(tokens: Arc<dyn TokenService>, directory: Arc<dyn AccountDirectory>) -> Self {
        Self { tokens, directory }
    }

    pub async fn evaluate(
        &self,
        policy: &RoutePolicy,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> GuardOutcome {
        if policy.public {
            return GuardOutcome::Public;
        }

        let Some(identity) = self.authenticate(authorization, now).await else {
            return GuardOutcome::Unauthorized;
        };

        if let Err(e) = authorize(&identity, policy) {
            tracing::warn!(user_id = %identity.id, "request forbidden: {e}");
            return GuardOutcome::Forbidden;
        }

        GuardOutcome::Authorized(identity)
    }

    /// Token check plus a live re-read of the account.
    ///
    /// A cryptographically valid token is not enough: the account must still
    /// exist and be active right now. The identity handed on comes from the
    /// live record, not the token.
    async fn authenticate(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<AuthenticatedIdentity> {
        let token = extract_bearer(authorization)?;

        let subject = match self.tokens.verify(token, now) {
            Ok(subject) => subject,
            Err(e) => {
                tracing::debug!("bearer token rejected: {e}");
                return None;
            }
        };

        match self.directory.find_by_id(subject.subject_id).await {
            Ok(Some(user)) if user.active => Some(user.identity()),
            Ok(_) => {
                tracing::warn!(user_id = %subject.subject_id, "token subject missing or inactive");
                None
            }
            Err(e) => {
                tracing::error!(user_id = %subject.subject_id, "account lookup failed during authentication: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_bearer(Some("bearer   abc ")), Some("abc"));
    }

    #[test]
    fn rejects_missing_or_foreign_schemes() {
        assert_eq!(extract_bearer(None), None);
        assert_eq!(extract_bearer(Some("")), None);
        assert_eq!(extract_bearer(Some("Bearer")), None);
        assert_eq!(extract_bearer(Some("Bearer   ")), None);
        assert_eq!(extract_bearer(Some("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer(Some("abc.def.ghi")), None);
    }

    #[test]
    fn only_public_and_authorized_dispatch() {
        assert!(GuardOutcome::Public.is_dispatch());
        assert!(!GuardOutcome::Unauthorized.is_dispatch());
        assert!(!GuardOutcome::Forbidden.is_dispatch());
    }
}
