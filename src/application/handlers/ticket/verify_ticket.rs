//! VerifyTicketHandler - check a ticket in at the door.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::ticket::{Ticket, TicketCode, TicketError};
use crate::ports::{EventCatalog, TicketRepository, UnitOfWorkFactory};

/// Query-with-effect: look up a ticket by code and consume it.
#[derive(Debug, Clone)]
pub struct VerifyTicketCommand {
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct VerifyTicketResult {
    pub ticket: Ticket,
    /// False if the ticket was already used, expired or cancelled.
    pub admitted_now: bool,
}

pub struct VerifyTicketHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    tickets: Arc<dyn TicketRepository>,
    catalog: Arc<dyn EventCatalog>,
}

impl VerifyTicketHandler {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        tickets: Arc<dyn TicketRepository>,
        catalog: Arc<dyn EventCatalog>,
    ) -> Self {
        Self {
            uow_factory,
            tickets,
            catalog,
        }
    }

    pub async fn handle(
        &self,
        cmd: VerifyTicketCommand,
    ) -> Result<VerifyTicketResult, TicketError> {
        let code = TicketCode::new(cmd.code.clone())
            .map_err(|_| TicketError::NotFound(cmd.code.clone()))?;

        let ticket = self
            .tickets
            .find_by_code(&code)
            .await?
            .ok_or_else(|| TicketError::NotFound(cmd.code.clone()))?;

        let event_has_ended = self
            .catalog
            .find_event(&ticket.event_id)
            .await?
            .map(|event| event.has_ended(Timestamp::now()))
            .unwrap_or(false);

        let mut uow = self.uow_factory.begin().await?;
        let Some(mut ticket) = uow.lock_ticket(&code).await? else {
            uow.rollback().await?;
            return Err(TicketError::NotFound(cmd.code));
        };

        let admitted_now = ticket.check_in(event_has_ended);
        if admitted_now {
            uow.update_ticket(&ticket).await?;
            uow.commit().await?;
            tracing::info!(code = %code, status = %ticket.status, "Ticket checked in");
        } else {
            uow.rollback().await?;
            tracing::info!(code = %code, status = %ticket.status, "Ticket presented again");
        }

        Ok(VerifyTicketResult {
            ticket,
            admitted_now,
        })
    }
}
