//! Reservation - a soft claim on ticket-type capacity.
//!
//! A reservation proves that capacity was available when the buyer asked.
//! It is not a hold: the authoritative check happens again when the sale is
//! committed under a row lock. Reservations are consumed by value so the
//! same claim cannot be committed or released twice.

use crate::domain::foundation::TicketTypeId;

#[derive(Debug, PartialEq, Eq)]
pub struct Reservation {
    ticket_type_id: TicketTypeId,
    quantity: u32,
}

impl Reservation {
    pub(crate) fn new(ticket_type_id: TicketTypeId, quantity: u32) -> Self {
        Self {
            ticket_type_id,
            quantity,
        }
    }

    pub fn ticket_type_id(&self) -> TicketTypeId {
        self.ticket_type_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}
