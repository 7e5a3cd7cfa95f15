//! Ticket domain events.

use serde::{Deserialize, Serialize};

use super::{Ticket, TicketCode};
use crate::domain::catalog::EventDetails;
use crate::domain::foundation::{MessageId, RegistrationId, TicketId, TicketTypeId, Timestamp};
use crate::domain::registration::Buyer;
use crate::domain_event;

/// Ticket summary carried in purchase notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedTicket {
    pub ticket_id: TicketId,
    pub ticket_type_id: TicketTypeId,
    pub code: TicketCode,
    pub verification_url: String,
    pub verification_token: String,
}

impl From<&Ticket> for IssuedTicket {
    fn from(ticket: &Ticket) -> Self {
        Self {
            ticket_id: ticket.id,
            ticket_type_id: ticket.ticket_type_id,
            code: ticket.code.clone(),
            verification_url: ticket.verification_url.clone(),
            verification_token: ticket.verification_token.clone(),
        }
    }
}

/// Tickets were minted for a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPurchasedEvent {
    pub message_id: MessageId,
    pub registration_id: RegistrationId,
    pub buyer: Buyer,
    pub tickets: Vec<IssuedTicket>,
    pub event_details: EventDetails,
    pub purchased_at: Timestamp,
}

impl TicketPurchasedEvent {
    pub fn new(
        registration_id: RegistrationId,
        buyer: Buyer,
        tickets: &[Ticket],
        event_details: EventDetails,
    ) -> Self {
        Self {
            message_id: MessageId::new(),
            registration_id,
            buyer,
            tickets: tickets.iter().map(IssuedTicket::from).collect(),
            event_details,
            purchased_at: Timestamp::now(),
        }
    }
}

domain_event!(
    TicketPurchasedEvent,
    event_type = "tickets.purchased.v1",
    aggregate_id = registration_id,
    aggregate_type = "Registration",
    occurred_at = purchased_at,
    message_id = message_id
);
