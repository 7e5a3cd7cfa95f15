//! Axum router for the ticketing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    health, initiate_payment, payment_webhook, register_for_event, verify_ticket, AppState,
};

/// Create the ticketing router.
///
/// # Routes
///
/// ## Public
/// - `POST /events/:event_id/registrations` - Register for an event
/// - `GET /tickets/verify/:code` - Check a ticket in
/// - `GET /health` - Liveness probe
///
/// ## Internal
/// - `POST /payment` - Open or resume checkout for a PENDING registration
///
/// ## Webhooks (no auth, signature verified)
/// - `POST /webhook` - Payment gateway callback
pub fn ticketing_router() -> Router<AppState> {
    Router::new()
        .route("/events/:event_id/registrations", post(register_for_event))
        .route("/tickets/verify/:code", get(verify_ticket))
        .route("/payment", post(initiate_payment))
        .route("/webhook", post(payment_webhook))
        .route("/health", get(health))
}
