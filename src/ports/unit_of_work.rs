//! Unit of work port - the explicit boundary of every write path.
//!
//! A unit of work is one storage transaction. Everything written through it,
//! including outbox entries staged with `stage_event`, becomes visible
//! together on `commit` or not at all.
//!
//! `lock_*` methods take an exclusive row lock that is held until the unit of
//! work ends, serializing concurrent writers of the same row. This is the
//! contention discipline for ticket-type sales counters and for payment
//! settlement: check-then-write sequences performed under the lock are atomic
//! with respect to other units of work, across processes.
//!
//! # Example
//!
//! ```ignore
//! let mut uow = factory.begin().await?;
//! let mut transaction = uow.lock_transaction(reference).await?.ok_or(..)?;
//! transaction.settle(outcome, channel)?;
//! uow.update_transaction(&transaction).await?;
//! uow.stage_event(PaymentStatusEvent::for_transaction(&transaction).to_envelope()?).await?;
//! uow.commit().await?;
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{
    DomainError, MessageEnvelope, RegistrationId, TicketTypeId,
};
use crate::domain::inventory::TicketType;
use crate::domain::payment::Transaction;
use crate::domain::registration::Registration;
use crate::domain::ticket::{Ticket, TicketCode};

/// One open storage transaction.
///
/// Dropping a unit of work without calling `commit` discards its writes.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Loads and locks a ticket type.
    async fn lock_ticket_type(
        &mut self,
        id: &TicketTypeId,
    ) -> Result<Option<TicketType>, DomainError>;

    /// Writes sold count, active flag and version of a locked ticket type.
    async fn update_ticket_type(&mut self, ticket_type: &TicketType) -> Result<(), DomainError>;

    /// Loads and locks a registration.
    async fn lock_registration(
        &mut self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, DomainError>;

    async fn insert_registration(&mut self, registration: &Registration)
        -> Result<(), DomainError>;

    async fn update_registration(&mut self, registration: &Registration)
        -> Result<(), DomainError>;

    /// Loads and locks a transaction by its gateway reference.
    async fn lock_transaction(
        &mut self,
        reference: &str,
    ) -> Result<Option<Transaction>, DomainError>;

    /// Inserts a new transaction.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the reference already exists
    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), DomainError>;

    async fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), DomainError>;

    /// Whether any transaction, in any status, exists for the registration.
    async fn has_transaction(&mut self, registration_id: &RegistrationId)
        -> Result<bool, DomainError>;

    /// Inserts freshly minted tickets.
    ///
    /// # Errors
    ///
    /// - `Conflict` if any code is already taken
    async fn insert_tickets(&mut self, tickets: &[Ticket]) -> Result<(), DomainError>;

    /// Loads and locks a ticket by its code.
    async fn lock_ticket(&mut self, code: &TicketCode) -> Result<Option<Ticket>, DomainError>;

    async fn update_ticket(&mut self, ticket: &Ticket) -> Result<(), DomainError>;

    /// Writes an event to the outbox as part of this unit of work.
    async fn stage_event(&mut self, event: MessageEnvelope) -> Result<(), DomainError>;

    /// Makes every write of this unit of work durable and visible.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    /// Discards every write of this unit of work.
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

/// Opens units of work.
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DomainError>;
}
