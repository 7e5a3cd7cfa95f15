//! Read-side repository ports.
//!
//! Plain lookups without locks. Every write goes through a `UnitOfWork`.

use async_trait::async_trait;

use crate::domain::foundation::{
    DomainError, EventId, RegistrationId, TicketTypeId, Timestamp,
};
use crate::domain::inventory::TicketType;
use crate::domain::payment::Transaction;
use crate::domain::registration::Registration;
use crate::domain::ticket::{Ticket, TicketCode};

#[async_trait]
pub trait TicketTypeRepository: Send + Sync {
    async fn find_by_id(&self, id: &TicketTypeId) -> Result<Option<TicketType>, DomainError>;

    /// All ticket types of an event, in creation order.
    async fn find_by_event(&self, event_id: &EventId) -> Result<Vec<TicketType>, DomainError>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn find_by_id(&self, id: &RegistrationId) -> Result<Option<Registration>, DomainError>;

    /// PENDING registrations created before `cutoff` that never got a
    /// transaction, oldest first.
    async fn find_unpaid_older_than(
        &self,
        cutoff: Timestamp,
        limit: u32,
    ) -> Result<Vec<Registration>, DomainError>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn find_by_reference(&self, reference: &str)
        -> Result<Option<Transaction>, DomainError>;

    /// The open (PENDING) transaction of a registration, if any.
    async fn find_pending_for_registration(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Option<Transaction>, DomainError>;

    /// PENDING transactions created before `cutoff`, oldest first.
    async fn find_pending_older_than(
        &self,
        cutoff: Timestamp,
        limit: u32,
    ) -> Result<Vec<Transaction>, DomainError>;

    /// SUCCESS transactions whose registration is still PENDING, oldest first.
    async fn find_captured_unissued(&self, limit: u32) -> Result<Vec<Transaction>, DomainError>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn find_by_registration(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Vec<Ticket>, DomainError>;

    async fn find_by_code(&self, code: &TicketCode) -> Result<Option<Ticket>, DomainError>;
}
