//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, money, errors, message envelope)
//! - `catalog` - Read-only event metadata owned by event management
//! - `inventory` - Ticket types, capacity and reservations
//! - `registration` - Purchase requests and the issuance policy
//! - `payment` - Transactions, outcomes and gateway callbacks
//! - `ticket` - Issued tickets and purchase notifications

pub mod catalog;
pub mod foundation;
pub mod inventory;
pub mod payment;
pub mod registration;
pub mod ticket;
