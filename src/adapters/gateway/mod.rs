//! Payment gateway adapters.
//!
//! - `PaystackGateway` - Paystack REST API
//! - `MockPaymentGateway` - Configurable mock for tests

mod mock;
mod paystack;

pub use mock::MockPaymentGateway;
pub use paystack::{PaystackConfig, PaystackGateway};
