//! Transaction entity - one attempt to collect money for a registration.
//!
//! Created PENDING when the gateway opens the payment, settled exactly once.
//! The gateway `reference` is globally unique and is the idempotency key for
//! payment callbacks. The registration link is a plain correlation id.

use serde::{Deserialize, Serialize};

use super::{PaymentMethod, PaymentOutcome, TransactionStatus};
use crate::domain::foundation::{
    Money, RegistrationId, StateMachine, Timestamp, TransactionId, ValidationError,
};
use crate::domain::registration::Buyer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub reference: String,
    pub registration_id: RegistrationId,
    pub amount: Money,
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    /// Settlement channel reported by the gateway (card, bank, ...).
    pub channel: Option<String>,
    pub buyer_email: String,
    pub buyer_name: String,
    pub authorization_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Transaction {
    /// Records a freshly opened gateway payment.
    pub fn open(
        reference: impl Into<String>,
        registration_id: RegistrationId,
        amount: Money,
        payment_method: PaymentMethod,
        buyer: &Buyer,
        authorization_url: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: TransactionId::new(),
            reference: reference.into(),
            registration_id,
            amount,
            status: TransactionStatus::Pending,
            payment_method,
            channel: None,
            buyer_email: buyer.email.clone(),
            buyer_name: buyer.full_name.clone(),
            authorization_url: authorization_url.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_terminal()
    }

    /// Applies the final outcome. Fails if the transaction was already settled.
    pub fn settle(
        &mut self,
        outcome: PaymentOutcome,
        channel: Option<String>,
    ) -> Result<TransactionStatus, ValidationError> {
        self.status = self.status.transition_to(outcome.status())?;
        if channel.is_some() {
            self.channel = channel;
        }
        self.updated_at = Timestamp::now();
        Ok(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction() -> Transaction {
        let buyer = Buyer::new("Ada Obi", "ada@example.com").unwrap();
        Transaction::open(
            "ref_123",
            RegistrationId::new(),
            "5000.00".parse().unwrap(),
            PaymentMethod::Card,
            &buyer,
            "https://checkout.example/ref_123",
        )
    }

    #[test]
    fn open_transaction_is_pending() {
        let tx = transaction();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(!tx.is_settled());
        assert_eq!(tx.buyer_email, "ada@example.com");
    }

    #[test]
    fn settle_records_channel() {
        let mut tx = transaction();
        let status = tx
            .settle(PaymentOutcome::Success, Some("card".to_string()))
            .unwrap();

        assert_eq!(status, TransactionStatus::Success);
        assert_eq!(tx.channel.as_deref(), Some("card"));
        assert!(tx.is_settled());
    }

    #[test]
    fn settle_twice_is_rejected() {
        let mut tx = transaction();
        tx.settle(PaymentOutcome::Failed, None).unwrap();

        assert!(tx.settle(PaymentOutcome::Success, None).is_err());
        assert_eq!(tx.status, TransactionStatus::Failed);
    }
}
