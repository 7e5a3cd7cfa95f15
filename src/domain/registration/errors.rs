//! Registration intake errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | BadRequest | 400 |
//! | EventNotFound | 404 |
//! | TicketTypeNotFound | 404 |
//! | OutOfStock | 409 |
//! | Payment | per payment error |
//! | Issuance | per issuance error |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, TicketTypeId, ValidationError,
};
use crate::domain::inventory::InventoryError;
use crate::domain::payment::PaymentError;
use crate::domain::ticket::IssuanceError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Request is well-formed but incomplete for its flow,
    /// e.g. a paid ticket type without a payment instrument.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    #[error("Ticket type not found: {0}")]
    TicketTypeNotFound(TicketTypeId),

    #[error("Ticket type {ticket_type_id} cannot supply {requested} ticket(s), {remaining} remaining")]
    OutOfStock {
        ticket_type_id: TicketTypeId,
        requested: u32,
        remaining: u32,
    },

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Issuance(#[from] IssuanceError),

    #[error("Registration storage error: {0}")]
    Infrastructure(String),
}

impl RegistrationError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        RegistrationError::BadRequest(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RegistrationError::Validation(_) | RegistrationError::BadRequest(_) => {
                ErrorCode::ValidationFailed
            }
            RegistrationError::EventNotFound(_) => ErrorCode::EventNotFound,
            RegistrationError::TicketTypeNotFound(_) => ErrorCode::TicketTypeNotFound,
            RegistrationError::OutOfStock { .. } => ErrorCode::OutOfStock,
            RegistrationError::Payment(e) => e.code(),
            RegistrationError::Issuance(e) => e.code(),
            RegistrationError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<InventoryError> for RegistrationError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::OutOfStock {
                ticket_type_id,
                requested,
                remaining,
            } => RegistrationError::OutOfStock {
                ticket_type_id,
                requested,
                remaining,
            },
            InventoryError::TicketTypeNotFound(id) => RegistrationError::TicketTypeNotFound(id),
            InventoryError::Infrastructure(msg) => RegistrationError::Infrastructure(msg),
        }
    }
}

impl From<DomainError> for RegistrationError {
    fn from(err: DomainError) -> Self {
        RegistrationError::Infrastructure(err.to_string())
    }
}
