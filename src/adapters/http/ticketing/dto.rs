//! HTTP DTOs for the ticketing endpoints.
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::application::RegisterForEventResult;
use crate::domain::foundation::{EventId, RegistrationId, TicketTypeId};
use crate::domain::payment::{PaymentInstrument, Transaction};
use crate::domain::ticket::Ticket;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /events/:event_id/registrations`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub ticket_type_id: TicketTypeId,
    pub quantity: u32,
    pub full_name: String,
    pub email: String,
    /// Required when the ticket type is paid.
    #[serde(default)]
    pub payment_instrument: Option<PaymentInstrument>,
}

/// Body of `POST /payment`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentRequest {
    pub registration_id: RegistrationId,
    pub buyer_email: String,
    pub buyer_name: String,
    pub payment_instrument: PaymentInstrument,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub code: String,
    pub status: String,
    pub verification_url: String,
    pub verification_token: String,
}

impl From<&Ticket> for TicketResponse {
    fn from(ticket: &Ticket) -> Self {
        Self {
            code: ticket.code.as_str().to_string(),
            status: ticket.status.as_str().to_string(),
            verification_url: ticket.verification_url.clone(),
            verification_token: ticket.verification_token.clone(),
        }
    }
}

/// Checkout details for a paid registration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub authorization_url: String,
    pub reference: String,
}

impl From<&Transaction> for PaymentResponse {
    fn from(transaction: &Transaction) -> Self {
        Self {
            authorization_url: transaction.authorization_url.clone(),
            reference: transaction.reference.clone(),
        }
    }
}

/// Registration summary.
///
/// `tickets` is filled for free registrations, `payment` for paid ones.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub registration_id: RegistrationId,
    pub event_id: EventId,
    pub ticket_type_id: TicketTypeId,
    pub quantity: u32,
    pub status: String,
    pub tickets: Vec<TicketResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentResponse>,
}

impl From<RegisterForEventResult> for RegistrationResponse {
    fn from(result: RegisterForEventResult) -> Self {
        let (tickets, payment) = match &result {
            RegisterForEventResult::Confirmed { tickets, .. } => {
                (tickets.iter().map(TicketResponse::from).collect(), None)
            }
            RegisterForEventResult::AwaitingPayment { transaction, .. } => {
                (Vec::new(), Some(PaymentResponse::from(transaction)))
            }
        };
        let registration = result.registration();

        Self {
            registration_id: registration.id,
            event_id: registration.event_id,
            ticket_type_id: registration.ticket_type_id,
            quantity: registration.requested_quantity,
            status: registration.status.as_str().to_string(),
            tickets,
            payment,
        }
    }
}

/// Result of presenting a ticket at the door.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTicketResponse {
    pub code: String,
    pub status: String,
    /// True only for the check-in that flipped the ticket to USED.
    pub admitted: bool,
    pub event_id: EventId,
    pub ticket_type_id: TicketTypeId,
}

/// Acknowledgement returned to the payment gateway.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
