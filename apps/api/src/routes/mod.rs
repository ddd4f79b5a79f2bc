pub mod health;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers::handle_analyze;
use crate::parallax::handlers::{handle_chat, handle_draft};
use crate::rate_limit::{self, RateLimiter};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Each route counts its callers separately.
    let trust_proxy = state.config.trust_proxy;
    let limiter = |route: &'static str, policy| {
        Arc::new(RateLimiter::new(route, policy).trusting_proxy(trust_proxy))
    };
    let analyze_limiter = limiter("/api/analyze", state.config.analyze_rate_limit);
    let chat_limiter = limiter("/api/parallax/chat", state.config.parallax_rate_limit);
    let draft_limiter = limiter("/api/parallax/draft", state.config.parallax_rate_limit);

    Router::new()
        .route("/api/health", get(health::health_handler))
        .route(
            "/api/analyze",
            post(handle_analyze).layer(from_fn_with_state(analyze_limiter, rate_limit::enforce)),
        )
        .route(
            "/api/parallax/chat",
            post(handle_chat).layer(from_fn_with_state(chat_limiter, rate_limit::enforce)),
        )
        .route(
            "/api/parallax/draft",
            post(handle_draft).layer(from_fn_with_state(draft_limiter, rate_limit::enforce)),
        )
        .with_state(state)
}
