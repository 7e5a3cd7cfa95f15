//! Ticket domain - issued tickets, their codes and purchase notifications.

mod code;
mod entity;
mod errors;
mod events;
mod status;

pub use code::TicketCode;
pub use errors::{IssuanceError, TicketError};
pub use events::{IssuedTicket, TicketPurchasedEvent};
pub use status::TicketStatus;
pub use entity::Ticket;
