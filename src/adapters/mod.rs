//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-process storage with unit-of-work semantics
//! - `postgres` - PostgreSQL storage (sqlx)
//! - `gateway` - Payment gateway clients (Paystack, mock)
//! - `tickets` - Ticket code generator and verification token renderer
//! - `events` - Message bus implementations and the outbox relay
//! - `http` - REST API (axum)

pub mod events;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod tickets;

pub use events::{
    InMemoryEventBus, OutboxPublisher, OutboxPublisherConfig, RedisEventPublisher,
    DEFAULT_RETENTION,
};
pub use gateway::{MockPaymentGateway, PaystackConfig, PaystackGateway};
pub use memory::InMemoryTicketingStore;
pub use tickets::{RandomTicketCodeGenerator, SignedUrlTokenRenderer};
