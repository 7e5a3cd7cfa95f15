//! Payment handlers.
//!
//! - `InitiatePaymentHandler` - opens (or resumes) a gateway checkout
//! - `HandlePaymentWebhookHandler` - verifies and applies gateway callbacks
//! - `ReconcilePendingPaymentsHandler` / `PaymentReconciler` - settles payments
//!   whose callback never arrived
//! - `PaymentSettlement` - the single settle-once path both of the above share

mod handle_payment_webhook;
mod initiate_payment;
mod reconcile_pending_payments;
mod reconciler;
mod settlement;

pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
pub use initiate_payment::{InitiatePaymentCommand, InitiatePaymentHandler, InitiatePaymentResult};
pub use reconcile_pending_payments::{
    ReconcilePendingPaymentsHandler, ReconciliationConfig, ReconciliationReport,
};
pub use reconciler::PaymentReconciler;
pub use settlement::{PaymentSettlement, SettlementResult};
