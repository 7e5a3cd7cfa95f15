//! Ticket entity - one admission, minted per purchased unit.

use serde::{Deserialize, Serialize};

use super::{TicketCode, TicketStatus};
use crate::domain::foundation::{
    EventId, RegistrationId, StateMachine, TicketId, TicketTypeId, Timestamp,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub event_id: EventId,
    pub ticket_type_id: TicketTypeId,
    pub registration_id: RegistrationId,
    pub code: TicketCode,
    /// Scan URL embedding the code.
    pub verification_url: String,
    /// Opaque scannable payload rendered from the verification URL.
    pub verification_token: String,
    pub status: TicketStatus,
    pub issued_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ticket {
    /// Mints an ACTIVE ticket.
    pub fn issue(
        event_id: EventId,
        ticket_type_id: TicketTypeId,
        registration_id: RegistrationId,
        code: TicketCode,
        verification_url: String,
        verification_token: String,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: TicketId::new(),
            event_id,
            ticket_type_id,
            registration_id,
            code,
            verification_url,
            verification_token,
            status: TicketStatus::Active,
            issued_at: now,
            updated_at: now,
        }
    }

    /// Checks the ticket in at the door.
    ///
    /// An ACTIVE ticket becomes USED, or EXPIRED when the event is over.
    /// Returns true if the status changed; other statuses are left as they are.
    pub fn check_in(&mut self, event_has_ended: bool) -> bool {
        let target = if event_has_ended {
            TicketStatus::Expired
        } else {
            TicketStatus::Used
        };

        match self.status.transition_to(target) {
            Ok(next) => {
                self.status = next;
                self.updated_at = Timestamp::now();
                true
            }
            Err(_) => false,
        }
    }
}
