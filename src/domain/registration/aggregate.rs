//! Registration aggregate - a buyer's request for tickets to one event.

use serde::{Deserialize, Serialize};

use super::{Buyer, RegistrationStatus};
use crate::domain::foundation::{
    EventId, RegistrationId, StateMachine, TicketTypeId, Timestamp, UserId, ValidationError,
};
use crate::domain::payment::PaymentMethod;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub ticket_type_id: TicketTypeId,
    pub buyer: Buyer,
    /// Quantity as asked for. The minted count comes from `IssuancePolicy`.
    pub requested_quantity: u32,
    pub status: RegistrationStatus,
    /// Chosen instrument for paid registrations.
    pub payment_method: Option<PaymentMethod>,
    /// Authenticated principal that submitted the registration, if any.
    pub registered_by: Option<UserId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Registration {
    /// Creates a new PENDING registration.
    pub fn new(
        event_id: EventId,
        ticket_type_id: TicketTypeId,
        buyer: Buyer,
        requested_quantity: u32,
        payment_method: Option<PaymentMethod>,
        registered_by: Option<UserId>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: RegistrationId::new(),
            event_id,
            ticket_type_id,
            buyer,
            requested_quantity,
            status: RegistrationStatus::Pending,
            payment_method,
            registered_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RegistrationStatus::Pending
    }

    /// Marks tickets as issued.
    pub fn confirm(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(RegistrationStatus::Confirmed)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Marks the registration as failed.
    pub fn fail(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(RegistrationStatus::Failed)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration::new(
            EventId::new(),
            TicketTypeId::new(),
            Buyer::new("Ada Obi", "ada@example.com").unwrap(),
            2,
            Some(PaymentMethod::Card),
            None,
        )
    }

    #[test]
    fn new_registration_is_pending() {
        let reg = registration();
        assert!(reg.is_pending());
        assert_eq!(reg.requested_quantity, 2);
    }

    #[test]
    fn confirm_is_one_way() {
        let mut reg = registration();
        reg.confirm().unwrap();

        assert_eq!(reg.status, RegistrationStatus::Confirmed);
        assert!(reg.fail().is_err());
        assert_eq!(reg.status, RegistrationStatus::Confirmed);
    }

    #[test]
    fn failed_registration_cannot_confirm() {
        let mut reg = registration();
        reg.fail().unwrap();
        assert!(reg.confirm().is_err());
    }
}
