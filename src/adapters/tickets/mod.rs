//! Ticket code and verification token adapters.

mod code_generator;
mod token_renderer;

pub use code_generator::RandomTicketCodeGenerator;
pub use token_renderer::SignedUrlTokenRenderer;
