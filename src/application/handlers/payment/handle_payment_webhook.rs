//! HandlePaymentWebhookHandler - processes signed payment callbacks from the gateway.
//!
//! 1. Verify the HMAC signature over the raw body
//! 2. Parse the notification
//! 3. Apply the outcome through `PaymentSettlement`
//!
//! Redelivered callbacks find the transaction already settled and are
//! acknowledged without side effects, unless the payment was captured and its
//! tickets were never minted. Then the redelivery finishes issuance.

use std::sync::Arc;

use crate::domain::payment::{peek_reference, TransactionStatus, WebhookError, WebhookVerifier};

use super::settlement::{PaymentSettlement, SettlementResult};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw webhook payload, exactly as received.
    pub payload: Vec<u8>,
    /// `X-Signature` header, if present.
    pub signature: Option<String>,
}

/// Result of webhook processing.
#[derive(Debug, Clone)]
pub enum HandlePaymentWebhookResult {
    /// Transaction settled; `tickets_issued` is zero for failed payments.
    Settled {
        reference: String,
        status: TransactionStatus,
        tickets_issued: usize,
    },
    /// A redelivery found the payment captured without tickets and issued them.
    Recovered {
        reference: String,
        tickets_issued: usize,
    },
    /// Payment captured but issuance failed; the registration is FAILED.
    IssuanceFailed { reference: String },
}

pub struct HandlePaymentWebhookHandler {
    verifier: WebhookVerifier,
    settlement: Arc<PaymentSettlement>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(verifier: WebhookVerifier, settlement: Arc<PaymentSettlement>) -> Self {
        Self {
            verifier,
            settlement,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // 1. Verify signature and parse
        let Some(signature) = cmd.signature.as_deref() else {
            tracing::warn!(
                reference = ?peek_reference(&cmd.payload),
                "Payment webhook without signature rejected"
            );
            return Err(WebhookError::MissingSignature);
        };

        let notification = match self.verifier.verify_and_parse(&cmd.payload, signature) {
            Ok(notification) => notification,
            Err(WebhookError::InvalidSignature) => {
                tracing::warn!(
                    reference = ?peek_reference(&cmd.payload),
                    "Payment webhook signature mismatch"
                );
                return Err(WebhookError::InvalidSignature);
            }
            Err(e) => return Err(e),
        };

        let reference = notification.data.reference.clone();
        let outcome = notification.outcome();
        tracing::debug!(
            reference = %reference,
            event = %notification.event,
            "Payment webhook verified"
        );

        // 2. Apply outcome
        match self
            .settlement
            .apply_outcome(&reference, outcome, notification.data.channel)
            .await?
        {
            SettlementResult::Settled {
                transaction,
                tickets,
            } => Ok(HandlePaymentWebhookResult::Settled {
                reference,
                status: transaction.status,
                tickets_issued: tickets.len(),
            }),
            SettlementResult::Recovered { tickets, .. } => {
                Ok(HandlePaymentWebhookResult::Recovered {
                    reference,
                    tickets_issued: tickets.len(),
                })
            }
            SettlementResult::IssuanceFailed { .. } => {
                Ok(HandlePaymentWebhookResult::IssuanceFailed { reference })
            }
            SettlementResult::AlreadySettled { .. } => {
                Err(WebhookError::AlreadyProcessed(reference))
            }
        }
    }
}
