//! How many tickets a registration mints, and what it costs.
//!
//! - Free ticket types mint one ticket regardless of the requested quantity.
//! - Paid ticket types of a virtual event mint one access pass per registration.
//! - Otherwise one ticket is minted per requested unit.
//!
//! Intake reserves and the issuer commits the same count, so both call here.

use crate::domain::catalog::EventDetails;
use crate::domain::foundation::Money;
use crate::domain::inventory::TicketType;

pub struct IssuancePolicy;

impl IssuancePolicy {
    pub fn units_to_mint(ticket_type: &TicketType, event: &EventDetails, requested: u32) -> u32 {
        if !ticket_type.is_paid || event.is_virtual {
            1
        } else {
            requested
        }
    }

    /// Price of `units` tickets of this type.
    pub fn amount_due(ticket_type: &TicketType, units: u32) -> Money {
        if ticket_type.is_paid {
            ticket_type.price.times(units)
        } else {
            Money::zero()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventId, Timestamp};

    fn event(is_virtual: bool) -> EventDetails {
        let now = Timestamp::now();
        EventDetails {
            id: EventId::new(),
            name: "Summit".to_string(),
            venue: "Main Hall".to_string(),
            starts_at: now.plus_secs(86_400),
            ends_at: now.plus_secs(90_000),
            is_virtual,
        }
    }

    fn ticket_type(price: &str) -> TicketType {
        TicketType::new(EventId::new(), "Standard", price.parse().unwrap(), 100).unwrap()
    }

    #[test]
    fn free_types_are_coerced_to_one() {
        assert_eq!(IssuancePolicy::units_to_mint(&ticket_type("0"), &event(false), 3), 1);
    }

    #[test]
    fn paid_virtual_events_mint_one_pass() {
        assert_eq!(IssuancePolicy::units_to_mint(&ticket_type("10"), &event(true), 4), 1);
    }

    #[test]
    fn paid_in_person_events_mint_requested_quantity() {
        assert_eq!(IssuancePolicy::units_to_mint(&ticket_type("10"), &event(false), 4), 4);
    }

    #[test]
    fn amount_due_multiplies_price() {
        assert_eq!(
            IssuancePolicy::amount_due(&ticket_type("12.50"), 3),
            "37.50".parse().unwrap()
        );
        assert!(IssuancePolicy::amount_due(&ticket_type("0"), 3).is_zero());
    }
}
