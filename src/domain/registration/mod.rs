//! Registration domain - purchase requests and the rules for fulfilling them.

mod aggregate;
mod buyer;
mod errors;
mod events;
mod policy;
mod status;

pub use aggregate::Registration;
pub use buyer::Buyer;
pub use errors::RegistrationError;
pub use events::ProcessPaymentEvent;
pub use policy::IssuancePolicy;
pub use status::RegistrationStatus;
