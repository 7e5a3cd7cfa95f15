//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, messaging primitives and error types
//! that form the vocabulary of the ticketing domain.

mod errors;
mod events;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    DomainEvent, MessageEnvelope, MessageId, MessageMetadata, SerializableDomainEvent,
};
pub use ids::{EventId, RegistrationId, TicketId, TicketTypeId, TransactionId, UserId};
pub use money::Money;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
