//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: directory selection and shared auth services
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and extraction helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use salon_infra::AppConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig, services: Arc<AppServices>) -> anyhow::Result<Router> {
    let origin: HeaderValue = config
        .server
        .allowed_origin
        .parse()
        .with_context(|| format!("invalid server.allowed_origin: {}", config.server.allowed_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    let routes = routes::router(services.guard.clone()).layer(Extension(services));

    let app = match normalize_prefix(&config.server.path_prefix) {
        Some(prefix) => Router::new().nest(&prefix, routes),
        None => routes,
    };

    Ok(app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    ))
}

/// `"api/"` → `Some("/api")`; empty or `"/"` → `None` (mount at the root).
fn normalize_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim().trim_matches('/');
    (!trimmed.is_empty()).then(|| format!("/{trimmed}"))
}

#[cfg(test)]
mod tests {
    use super::normalize_prefix;

    #[test]
    fn prefixes_are_normalized() {
        assert_eq!(normalize_prefix("/api").as_deref(), Some("/api"));
        assert_eq!(normalize_prefix("api/").as_deref(), Some("/api"));
        assert_eq!(normalize_prefix("/v1/api/").as_deref(), Some("/v1/api"));
        assert_eq!(normalize_prefix("/"), None);
        assert_eq!(normalize_prefix(""), None);
    }
}
