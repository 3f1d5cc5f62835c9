//! Session endpoints: login, registration, profile, token check.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use salon_auth::Registration;

use crate::app::dto::{self, LoginRequest, RegisterRequest, VerifyResponse};
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let req = match dto::json_body(payload) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    match services.sessions.login(&req.email, &req.password).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// POST /auth/register
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let req = match dto::json_body(payload) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    match services.sessions.register(Registration::from(req)).await {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /auth/profile
pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.sessions.get_profile(principal.user_id()).await {
        Ok(identity) => (StatusCode::OK, Json(identity)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /auth/verify
///
/// Reaching the handler already proves the token; the body only echoes who
/// it belongs to.
pub async fn verify(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(VerifyResponse::from(principal.identity()))
}
