use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use salon_auth::{RequestGuardChain, RoutePolicy, roles::ADMINISTRATOR};

use crate::middleware::{GuardState, guard_middleware};

pub mod auth;
pub mod roles;
pub mod system;
pub mod users;

/// Every route, grouped by the policy its guard enforces.
///
/// Policies are fixed here, at router construction; `route_layer` keeps
/// unknown paths a plain 404 instead of running the guard.
pub fn router(guard: Arc<RequestGuardChain>) -> Router {
    let public = Router::new()
        .route("/health", get(system::health))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route_layer(from_fn_with_state(
            GuardState::new(guard.clone(), RoutePolicy::public()),
            guard_middleware,
        ));

    let authenticated = Router::new()
        .route("/auth/profile", get(auth::profile))
        .route("/auth/verify", get(auth::verify))
        .route("/roles", get(roles::list_roles))
        .route("/roles/:id", get(roles::get_role))
        .route_layer(from_fn_with_state(
            GuardState::new(guard.clone(), RoutePolicy::authenticated()),
            guard_middleware,
        ));

    let admin = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::deactivate_user),
        )
        .route_layer(from_fn_with_state(
            GuardState::new(guard, RoutePolicy::roles([ADMINISTRATOR])),
            guard_middleware,
        ));

    public.merge(authenticated).merge(admin)
}
