//! Payment domain events.

use serde::{Deserialize, Serialize};

use super::{Transaction, TransactionStatus};
use crate::domain::foundation::{MessageId, Money, RegistrationId, Timestamp};
use crate::domain_event;

/// Published exactly once per terminal transition of a transaction.
///
/// Denormalized so notifiers can email the buyer without a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusEvent {
    pub message_id: MessageId,
    pub reference: String,
    pub registration_id: RegistrationId,
    pub buyer_email: String,
    pub buyer_name: String,
    pub status: TransactionStatus,
    pub amount: Money,
    pub timestamp: Timestamp,
}

impl PaymentStatusEvent {
    pub fn for_transaction(transaction: &Transaction) -> Self {
        Self {
            message_id: MessageId::new(),
            reference: transaction.reference.clone(),
            registration_id: transaction.registration_id,
            buyer_email: transaction.buyer_email.clone(),
            buyer_name: transaction.buyer_name.clone(),
            status: transaction.status,
            amount: transaction.amount.clone(),
            timestamp: Timestamp::now(),
        }
    }
}

domain_event!(
    PaymentStatusEvent,
    event_type = "payment.status.v1",
    aggregate_id = reference,
    aggregate_type = "Transaction",
    occurred_at = timestamp,
    message_id = message_id
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SerializableDomainEvent;
    use crate::domain::payment::{PaymentMethod, PaymentOutcome};
    use crate::domain::registration::Buyer;

    #[test]
    fn envelope_is_keyed_by_reference() {
        let buyer = Buyer::new("Ada Obi", "ada@example.com").unwrap();
        let mut tx = Transaction::open(
            "ref_77",
            RegistrationId::new(),
            "100.00".parse().unwrap(),
            PaymentMethod::Card,
            &buyer,
            "https://pay.example/ref_77",
        );
        tx.settle(PaymentOutcome::Success, None).unwrap();

        let envelope = PaymentStatusEvent::for_transaction(&tx).to_envelope().unwrap();

        assert_eq!(envelope.event_type, "payment.status.v1");
        assert_eq!(envelope.aggregate_id, "ref_77");
        assert_eq!(envelope.payload["status"], "SUCCESS");
        assert_eq!(envelope.payload["buyer_email"], "ada@example.com");
    }
}
