//! HTTP adapter for the ticket purchase pipeline.
//!
//! - `POST /events/:event_id/registrations` - Register for an event
//! - `POST /payment` - Open or resume checkout (internal)
//! - `POST /webhook` - Payment gateway callback
//! - `GET /tickets/verify/:code` - Check a ticket in
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{status_for, ApiError, AppState, Principal, SIGNATURE_HEADER, USER_ID_HEADER};
pub use routes::ticketing_router;
