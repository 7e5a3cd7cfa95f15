//! HTTP adapters - REST API implementations.
//!
//! `ticketing` exposes the purchase pipeline; [`app_router`] adds the
//! cross-cutting layers used by the binary: request ids, tracing, timeout
//! and CORS.

pub mod ticketing;

use std::time::Duration;

use axum::Router;
use http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use ticketing::{ticketing_router, ApiError, AppState, ErrorResponse, Principal};

/// Build the full application router.
///
/// An empty `cors_origins` list, or one containing `*`, allows any origin.
/// Every request gets an `x-request-id` (kept if the caller sent one) that is
/// echoed on the response.
pub fn app_router(state: AppState, request_timeout: Duration, cors_origins: &[String]) -> Router {
    ticketing_router()
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors_layer(cors_origins))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    cors.allow_origin(allowed)
}
