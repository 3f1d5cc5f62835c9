use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use salon_auth::AuthError;

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid credentials")
        }
        AuthError::AccountInactive => {
            json_error(StatusCode::UNAUTHORIZED, "account_inactive", "account is inactive")
        }
        AuthError::TokenInvalid | AuthError::Unauthorized => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
        AuthError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        AuthError::EmailTaken => json_error(StatusCode::CONFLICT, "email_taken", "email already registered"),
        AuthError::RoleNotFound => json_error(StatusCode::CONFLICT, "role_not_found", "role does not exist"),
        AuthError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        AuthError::Validation(e) => json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
        AuthError::Internal(detail) => {
            tracing::error!(%detail, "request failed with internal error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
