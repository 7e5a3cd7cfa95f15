//! InventoryLedger - reserve and commit ticket-type capacity.
//!
//! `reserve` is a lock-free availability check used to fail fast at intake.
//! `commit_in` is the authoritative step: it re-reads the ticket type under a
//! row lock inside the caller's unit of work and records the sale there, so
//! the sale lands atomically with whatever else that unit of work writes.

use std::sync::Arc;

use crate::domain::foundation::TicketTypeId;
use crate::domain::inventory::{InventoryError, Reservation, TicketType};
use crate::ports::{TicketTypeRepository, UnitOfWork, UnitOfWorkFactory};

pub struct InventoryLedger {
    ticket_types: Arc<dyn TicketTypeRepository>,
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl InventoryLedger {
    pub fn new(
        ticket_types: Arc<dyn TicketTypeRepository>,
        uow_factory: Arc<dyn UnitOfWorkFactory>,
    ) -> Self {
        Self {
            ticket_types,
            uow_factory,
        }
    }

    /// Checks that `quantity` units are currently available.
    ///
    /// # Errors
    ///
    /// - `TicketTypeNotFound` if the type does not exist
    /// - `OutOfStock` if the type is inactive or has fewer units left
    pub async fn reserve(
        &self,
        ticket_type_id: TicketTypeId,
        quantity: u32,
    ) -> Result<Reservation, InventoryError> {
        let ticket_type = self
            .ticket_types
            .find_by_id(&ticket_type_id)
            .await?
            .ok_or(InventoryError::TicketTypeNotFound(ticket_type_id))?;

        if quantity == 0 || !ticket_type.can_supply(quantity) {
            tracing::info!(
                ticket_type_id = %ticket_type_id,
                requested = quantity,
                remaining = ticket_type.remaining(),
                "Reservation refused"
            );
            return Err(InventoryError::out_of_stock(
                ticket_type_id,
                quantity,
                if ticket_type.is_active {
                    ticket_type.remaining()
                } else {
                    0
                },
            ));
        }

        Ok(Reservation::new(ticket_type_id, quantity))
    }

    /// Records the reserved sale inside an open unit of work.
    ///
    /// Nothing is durable until the caller commits `uow`.
    pub async fn commit_in(
        &self,
        uow: &mut dyn UnitOfWork,
        reservation: Reservation,
    ) -> Result<TicketType, InventoryError> {
        let id = reservation.ticket_type_id();
        let mut ticket_type = uow
            .lock_ticket_type(&id)
            .await?
            .ok_or(InventoryError::TicketTypeNotFound(id))?;

        ticket_type.record_sale(reservation.quantity())?;
        uow.update_ticket_type(&ticket_type).await?;
        Ok(ticket_type)
    }

    /// Records the reserved sale in its own unit of work.
    pub async fn commit(&self, reservation: Reservation) -> Result<TicketType, InventoryError> {
        let mut uow = self.uow_factory.begin().await?;
        match self.commit_in(uow.as_mut(), reservation).await {
            Ok(ticket_type) => {
                uow.commit().await?;
                Ok(ticket_type)
            }
            Err(e) => {
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Gives a reservation up. Reservations hold nothing, so this only logs.
    pub fn release(&self, reservation: Reservation) {
        tracing::debug!(
            ticket_type_id = %reservation.ticket_type_id(),
            quantity = reservation.quantity(),
            "Reservation released"
        );
    }
}
