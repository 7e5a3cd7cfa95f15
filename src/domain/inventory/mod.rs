//! Inventory domain - ticket types and capacity accounting.

mod errors;
mod reservation;
mod ticket_type;

pub use errors::InventoryError;
pub use reservation::Reservation;
pub use ticket_type::TicketType;
