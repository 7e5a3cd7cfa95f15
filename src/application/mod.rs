//! Application layer - Commands, Handlers and the services they share.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Every write runs inside an explicit unit of work.

pub mod handlers;

pub use handlers::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    InitiatePaymentCommand, InitiatePaymentHandler, InitiatePaymentResult, InventoryLedger,
    PaymentReconciler, PaymentSettlement, ReconcilePendingPaymentsHandler, ReconciliationConfig,
    ReconciliationReport, RegisterForEventCommand, RegisterForEventHandler,
    RegisterForEventResult, SettlementResult, TicketIssuer, TicketIssuerConfig,
    VerifyTicketCommand, VerifyTicketHandler, VerifyTicketResult, DEFAULT_MAX_QUANTITY,
};
