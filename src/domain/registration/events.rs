//! Registration domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Money, RegistrationId, Timestamp};
use crate::domain::payment::PaymentMethod;
use crate::domain_event;

/// A paid registration is waiting for the buyer to complete payment.
///
/// Carries everything a payment-processing consumer needs to follow up
/// (reminders, abandoned checkout handling) without reading our tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessPaymentEvent {
    pub message_id: MessageId,
    pub registration_id: RegistrationId,
    pub transaction_reference: String,
    pub authorization_url: String,
    pub buyer_name: String,
    pub buyer_email: String,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub requested_at: Timestamp,
}

domain_event!(
    ProcessPaymentEvent,
    event_type = "payment.requested.v1",
    aggregate_id = registration_id,
    aggregate_type = "Registration",
    occurred_at = requested_at,
    message_id = message_id
);
