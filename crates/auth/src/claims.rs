use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use salon_core::{RoleId, UserId};

/// Session token claims.
///
/// Timestamps travel as JWT `iat`/`exp` seconds; everything else is the
/// minimum needed to re-identify the account on later requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account identifier.
    pub sub: UserId,

    /// Email at issuance time.
    pub email: String,

    /// Role at issuance time.
    #[serde(rename = "roleId")]
    pub role_id: RoleId,

    /// Issued-at timestamp.
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,
}

/// Deterministically validate token claims against `now`.
///
/// Only expiry is enforced; `iat` is not checked against `now`.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::token`].
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn claims_at(issued_at: DateTime<Utc>, ttl: Duration) -> TokenClaims {
        TokenClaims {
            sub: UserId::new(7),
            email: "alice@x.com".to_string(),
            role_id: RoleId::new(3),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn valid_inside_window() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::hours(1));
        assert_eq!(validate_claims(&claims, t0), Ok(()));
        assert_eq!(validate_claims(&claims, t0 + Duration::minutes(59)), Ok(()));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::hours(1));
        assert_eq!(
            validate_claims(&claims, t0 + Duration::hours(1)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn clock_behind_issuer_still_accepts() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::hours(1));
        assert_eq!(validate_claims(&claims, t0 - Duration::seconds(2)), Ok(()));
        assert_eq!(validate_claims(&claims, t0 - Duration::minutes(5)), Ok(()));
    }

    #[test]
    fn empty_window_is_already_expired() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::zero());
        assert_eq!(validate_claims(&claims, t0), Err(TokenValidationError::Expired));
    }

    #[test]
    fn serializes_as_jwt_claim_names() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_value(claims_at(t0, Duration::hours(1))).unwrap();
        assert_eq!(json["sub"], 7);
        assert_eq!(json["roleId"], 3);
        assert_eq!(json["iat"], t0.timestamp());
        assert_eq!(json["exp"], t0.timestamp() + 3600);
    }
}
