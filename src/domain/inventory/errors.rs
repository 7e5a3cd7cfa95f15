//! Inventory error types.
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | OutOfStock | 409 |
//! | TicketTypeNotFound | 404 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, TicketTypeId};

/// Errors raised by the inventory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Not enough remaining capacity, or the ticket type is no longer on sale.
    #[error("Ticket type {ticket_type_id} cannot supply {requested} ticket(s), {remaining} remaining")]
    OutOfStock {
        ticket_type_id: TicketTypeId,
        requested: u32,
        remaining: u32,
    },

    #[error("Ticket type not found: {0}")]
    TicketTypeNotFound(TicketTypeId),

    #[error("Inventory storage error: {0}")]
    Infrastructure(String),
}

impl InventoryError {
    pub fn out_of_stock(ticket_type_id: TicketTypeId, requested: u32, remaining: u32) -> Self {
        InventoryError::OutOfStock {
            ticket_type_id,
            requested,
            remaining,
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            InventoryError::OutOfStock { .. } => ErrorCode::OutOfStock,
            InventoryError::TicketTypeNotFound(_) => ErrorCode::TicketTypeNotFound,
            InventoryError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for InventoryError {
    fn from(err: DomainError) -> Self {
        InventoryError::Infrastructure(err.to_string())
    }
}

impl From<InventoryError> for DomainError {
    fn from(err: InventoryError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_stock_message_names_counts() {
        let id = TicketTypeId::new();
        let err = InventoryError::out_of_stock(id, 3, 1);
        assert_eq!(
            err.to_string(),
            format!("Ticket type {} cannot supply 3 ticket(s), 1 remaining", id)
        );
        assert_eq!(err.code(), ErrorCode::OutOfStock);
    }

    #[test]
    fn domain_error_becomes_infrastructure() {
        let err: InventoryError = DomainError::database("connection reset").into();
        assert!(matches!(err, InventoryError::Infrastructure(_)));
    }
}
