//! Inventory handlers.
//!
//! The ledger guarding ticket-type capacity.

mod ledger;

pub use ledger::InventoryLedger;
