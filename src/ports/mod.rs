//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `UnitOfWork` / `UnitOfWorkFactory` - Transactional write boundary with row locks
//! - `TicketTypeRepository`, `RegistrationRepository`, `TransactionRepository`,
//!   `TicketRepository` - Lock-free reads
//! - `EventCatalog` - Event metadata owned by event management
//!
//! ## External Service Ports
//!
//! - `PaymentGateway` - Opens and verifies payments
//! - `TicketCodeGenerator` / `TokenRenderer` - Ticket codes and scannable tokens
//!
//! ## Messaging Ports
//!
//! - `EventPublisher` - Broker-facing publisher
//! - `EventSubscriber` / `EventHandler` - In-process consumers
//! - `OutboxStore` - Relay side of the transactional outbox

mod event_catalog;
mod event_publisher;
mod event_subscriber;
mod outbox_store;
mod payment_gateway;
mod repositories;
mod ticket_codes;
mod unit_of_work;

pub use event_catalog::EventCatalog;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventHandler, EventSubscriber};
pub use outbox_store::{OutboxEntry, OutboxStatus, OutboxStore};
pub use payment_gateway::{
    GatewayPaymentStatus, InitializePaymentRequest, PaymentGateway, PaymentSession,
    VerifiedPayment,
};
pub use repositories::{
    RegistrationRepository, TicketRepository, TicketTypeRepository, TransactionRepository,
};
pub use ticket_codes::{TicketCodeGenerator, TokenRenderer};
pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory};
