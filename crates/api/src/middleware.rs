use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use salon_auth::{GuardOutcome, RequestGuardChain, RoutePolicy};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

/// Guard chain plus the policy of the routes it is layered onto.
#[derive(Clone)]
pub struct GuardState {
    pub chain: Arc<RequestGuardChain>,
    pub policy: Arc<RoutePolicy>,
}

impl GuardState {
    pub fn new(chain: Arc<RequestGuardChain>, policy: RoutePolicy) -> Self {
        Self {
            chain,
            policy: Arc::new(policy),
        }
    }
}

/// Runs the guard chain before the handler.
///
/// Rejections short-circuit with a fixed body that says nothing about why the
/// token or account was refused.
pub async fn guard_middleware(State(state): State<GuardState>, mut req: Request, next: Next) -> Response {
    // A header that is not visible ASCII is treated as absent.
    let authorization = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    let outcome = state.chain.evaluate(&state.policy, authorization, Utc::now()).await;

    match outcome {
        GuardOutcome::Public => next.run(req).await,
        GuardOutcome::Authorized(identity) => {
            req.extensions_mut().insert(PrincipalContext::new(identity));
            next.run(req).await
        }
        GuardOutcome::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized"),
        GuardOutcome::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
    }
}
