//! Administrative account management.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::dto::{self, CreateUserRequest, UpdateUserRequest};
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

/// GET /users
pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.admin.list_users().await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// POST /users
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    let req = match dto::json_body(payload) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    match services.admin.create_user(req.into()).await {
        Ok(user) => {
            tracing::info!(admin_id = %principal.user_id(), user_id = %user.id, "user created");
            (StatusCode::CREATED, Json(user)).into_response()
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /users/:id
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.admin.get_user(id).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// PATCH /users/:id
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match dto::parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let req = match dto::json_body(payload) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    match services.admin.update_user(id, req.into()).await {
        Ok(user) => {
            tracing::info!(admin_id = %principal.user_id(), user_id = %user.id, "user updated");
            (StatusCode::OK, Json(user)).into_response()
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// DELETE /users/:id
///
/// Soft delete; the deactivated account is returned.
pub async fn deactivate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.admin.deactivate_user(id).await {
        Ok(user) => {
            tracing::info!(admin_id = %principal.user_id(), user_id = %user.id, "user deactivated");
            (StatusCode::OK, Json(user)).into_response()
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}
