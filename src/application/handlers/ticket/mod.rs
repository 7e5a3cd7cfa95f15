//! Ticket handlers.
//!
//! ## Services
//! - `TicketIssuer` - atomic ticket minting for a registration
//!
//! ## Commands
//! - Checking a ticket in by its code

mod issuer;
mod verify_ticket;

pub use issuer::{TicketIssuer, TicketIssuerConfig};
pub use verify_ticket::{VerifyTicketCommand, VerifyTicketHandler, VerifyTicketResult};
