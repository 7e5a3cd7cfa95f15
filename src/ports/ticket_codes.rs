//! Ports for minting ticket codes and scannable verification tokens.

use crate::domain::foundation::DomainError;
use crate::domain::ticket::TicketCode;

/// Produces random, globally unique ticket codes.
pub trait TicketCodeGenerator: Send + Sync {
    fn generate(&self) -> Result<TicketCode, DomainError>;
}

/// Renders a verification URL into the opaque token embedded in a ticket
/// (QR payload, barcode string).
pub trait TokenRenderer: Send + Sync {
    fn render(&self, verification_url: &str) -> Result<String, DomainError>;
}
