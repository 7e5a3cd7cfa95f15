//! TicketType entity - capacity and sales counter for one kind of ticket.
//!
//! Invariants:
//! - `0 <= sold_count <= quantity`
//! - `is_active == false` exactly when `sold_count == quantity`
//!
//! `version` increments on every recorded sale so storage can detect
//! concurrent writers.

use serde::{Deserialize, Serialize};

use super::InventoryError;
use crate::domain::foundation::{EventId, Money, TicketTypeId, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketType {
    pub id: TicketTypeId,
    pub event_id: EventId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
    pub sold_count: u32,
    pub is_paid: bool,
    pub is_active: bool,
    pub version: i64,
}

impl TicketType {
    /// Creates a new ticket type with nothing sold.
    ///
    /// A zero price makes the type free.
    pub fn new(
        event_id: EventId,
        name: impl Into<String>,
        price: Money,
        quantity: u32,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if quantity == 0 {
            return Err(ValidationError::out_of_range(
                "quantity",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }

        Ok(Self {
            id: TicketTypeId::new(),
            event_id,
            name,
            is_paid: !price.is_zero(),
            price,
            quantity,
            sold_count: 0,
            is_active: true,
            version: 0,
        })
    }

    /// Tickets still available for sale.
    pub fn remaining(&self) -> u32 {
        self.quantity.saturating_sub(self.sold_count)
    }

    /// True when the type is on sale and has room for `quantity` more units.
    pub fn can_supply(&self, quantity: u32) -> bool {
        self.is_active && quantity <= self.remaining()
    }

    pub fn is_sold_out(&self) -> bool {
        self.sold_count >= self.quantity
    }

    /// Records the sale of `quantity` units.
    ///
    /// Deactivates the type in the same step when it becomes sold out.
    pub fn record_sale(&mut self, quantity: u32) -> Result<(), InventoryError> {
        if quantity == 0 || !self.can_supply(quantity) {
            return Err(InventoryError::out_of_stock(
                self.id,
                quantity,
                if self.is_active { self.remaining() } else { 0 },
            ));
        }

        self.sold_count += quantity;
        self.is_active = self.sold_count < self.quantity;
        self.version += 1;
        Ok(())
    }
}
