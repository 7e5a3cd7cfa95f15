//! Payment domain - transactions, payment outcomes and gateway callbacks.

mod errors;
mod events;
mod method;
mod status;
mod transaction;
mod webhook;
mod webhook_errors;

pub use errors::{PaymentError, SettlementError};
pub use events::PaymentStatusEvent;
pub use method::{PaymentInstrument, PaymentMethod};
pub use status::{PaymentOutcome, TransactionStatus};
pub use transaction::Transaction;
pub use webhook::{
    peek_reference, sign_payload, WebhookData, WebhookNotification, WebhookVerifier,
    CHARGE_SUCCESS_EVENT,
};
pub use webhook_errors::WebhookError;
