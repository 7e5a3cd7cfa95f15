//! Application handlers.
//!
//! Command handlers and the shared services they orchestrate.
//!
//! - `inventory` - capacity ledger
//! - `registration` - purchase intake
//! - `payment` - gateway checkout, callbacks, settlement, reconciliation
//! - `ticket` - issuance and verification

pub mod inventory;
pub mod payment;
pub mod registration;
pub mod ticket;

pub use inventory::InventoryLedger;
pub use payment::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    InitiatePaymentCommand, InitiatePaymentHandler, InitiatePaymentResult, PaymentReconciler,
    PaymentSettlement, ReconcilePendingPaymentsHandler, ReconciliationConfig,
    ReconciliationReport, SettlementResult,
};
pub use registration::{
    RegisterForEventCommand, RegisterForEventHandler, RegisterForEventResult,
    DEFAULT_MAX_QUANTITY,
};
pub use ticket::{
    TicketIssuer, TicketIssuerConfig, VerifyTicketCommand, VerifyTicketHandler,
    VerifyTicketResult,
};
