use std::str::FromStr;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use salon_auth::{AuthenticatedIdentity, CreateAccount, Registration, UpdateAccount};
use salon_core::{RoleId, UserId};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "roleId", alias = "rolId")]
    pub role_id: RoleId,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Registration {
            email: req.email,
            password: req.password,
            role_id: req.role_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "roleId", alias = "rolId")]
    pub role_id: RoleId,
    pub active: Option<bool>,
}

impl From<CreateUserRequest> for CreateAccount {
    fn from(req: CreateUserRequest) -> Self {
        CreateAccount {
            email: req.email,
            password: req.password,
            role_id: req.role_id,
            active: req.active,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "roleId", alias = "rolId")]
    pub role_id: Option<RoleId>,
    pub active: Option<bool>,
}

impl From<UpdateUserRequest> for UpdateAccount {
    fn from(req: UpdateUserRequest) -> Self {
        UpdateAccount {
            email: req.email,
            password: req.password,
            role_id: req.role_id,
            active: req.active,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

/// Body of `GET /auth/verify`.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: VerifiedUser,
}

#[derive(Debug, Serialize)]
pub struct VerifiedUser {
    pub id: UserId,
    pub email: String,
    pub role: String,
}

impl From<&AuthenticatedIdentity> for VerifyResponse {
    fn from(identity: &AuthenticatedIdentity) -> Self {
        Self {
            valid: true,
            user: VerifiedUser {
                id: identity.id,
                email: identity.email.clone(),
                role: identity.role_name().to_string(),
            },
        }
    }
}

// -------------------------
// Extraction helpers
// -------------------------

/// Unwrap a JSON body, turning axum's rejection into our error shape.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            rejection.body_text(),
        )),
    }
}

pub fn parse_user_id(s: &str) -> Result<UserId, axum::response::Response> {
    UserId::from_str(s).map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()))
}

pub fn parse_role_id(s: &str) -> Result<RoleId, axum::response::Response> {
    RoleId::from_str(s).map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_accepts_both_role_keys() {
        let a: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"secret1","roleId":3}"#).unwrap();
        let b: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"secret1","rolId":3}"#).unwrap();
        assert_eq!(a.role_id, RoleId::new(3));
        assert_eq!(b.role_id, RoleId::new(3));
    }

    #[test]
    fn update_request_fields_are_optional() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"active":false}"#).unwrap();
        let update = UpdateAccount::from(req);
        assert_eq!(update.active, Some(false));
        assert!(update.email.is_none() && update.password.is_none() && update.role_id.is_none());
    }

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_user_id("7").ok(), Some(UserId::new(7)));
        assert_eq!(parse_user_id("abc").unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_role_id("-").unwrap_err().status(), StatusCode::BAD_REQUEST);
    }
}
