//! Ticket issuance and verification errors.

use thiserror::Error;

use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, RegistrationId, TicketTypeId,
};
use crate::domain::inventory::InventoryError;

/// Errors raised while minting tickets for a registration.
///
/// Every variant leaves storage untouched apart from marking the
/// registration FAILED.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssuanceError {
    #[error("Ticket type {ticket_type_id} cannot supply {requested} ticket(s), {remaining} remaining")]
    OutOfStock {
        ticket_type_id: TicketTypeId,
        requested: u32,
        remaining: u32,
    },

    /// Code generation, token rendering or storage failed.
    #[error("Ticket issuance I/O failure: {0}")]
    IoFailure(String),

    #[error("Registration not found: {0}")]
    RegistrationNotFound(RegistrationId),

    #[error("Ticket type not found: {0}")]
    TicketTypeNotFound(TicketTypeId),

    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    /// The registration already failed; it is never reopened.
    #[error("Registration {0} has already failed")]
    RegistrationFailed(RegistrationId),
}

impl IssuanceError {
    pub fn io(err: impl std::fmt::Display) -> Self {
        IssuanceError::IoFailure(err.to_string())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            IssuanceError::OutOfStock { .. } => ErrorCode::OutOfStock,
            IssuanceError::IoFailure(_) => ErrorCode::InternalError,
            IssuanceError::RegistrationNotFound(_) => ErrorCode::RegistrationNotFound,
            IssuanceError::TicketTypeNotFound(_) => ErrorCode::TicketTypeNotFound,
            IssuanceError::EventNotFound(_) => ErrorCode::EventNotFound,
            IssuanceError::RegistrationFailed(_) => ErrorCode::InvalidStateTransition,
        }
    }
}

impl From<InventoryError> for IssuanceError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::OutOfStock {
                ticket_type_id,
                requested,
                remaining,
            } => IssuanceError::OutOfStock {
                ticket_type_id,
                requested,
                remaining,
            },
            InventoryError::TicketTypeNotFound(id) => IssuanceError::TicketTypeNotFound(id),
            InventoryError::Infrastructure(msg) => IssuanceError::IoFailure(msg),
        }
    }
}

impl From<DomainError> for IssuanceError {
    fn from(err: DomainError) -> Self {
        IssuanceError::IoFailure(err.to_string())
    }
}

/// Errors raised while verifying a ticket at the door.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    #[error("Ticket not found: {0}")]
    NotFound(String),

    #[error("Ticket storage error: {0}")]
    Infrastructure(String),
}

impl From<DomainError> for TicketError {
    fn from(err: DomainError) -> Self {
        TicketError::Infrastructure(err.to_string())
    }
}
