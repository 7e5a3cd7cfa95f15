//! Payment gateway port.
//!
//! Abstracts the external payment provider that hosts the checkout page and
//! reports payment outcomes. Implementations perform exactly one HTTP
//! exchange per call and never retry on their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::RegistrationId;
use crate::domain::payment::{PaymentError, PaymentMethod, PaymentOutcome};

/// Request to open a payment with the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializePaymentRequest {
    /// Amount in minor units (kobo, cents).
    pub amount_minor: i64,
    pub email: String,
    pub payment_method: PaymentMethod,
    /// Correlation id echoed back by the gateway in metadata.
    pub registration_id: RegistrationId,
}

/// Checkout handle returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Where to redirect the buyer.
    pub authorization_url: String,
    pub access_code: String,
    /// Gateway-assigned, globally unique transaction reference.
    pub reference: String,
}

/// Status of a transaction as reported by the gateway's verify endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayPaymentStatus {
    Success,
    Failed,
    Abandoned,
    Reversed,
    /// Still waiting on the buyer or the bank.
    Pending,
}

impl GatewayPaymentStatus {
    /// Parses the gateway's status string; unknown values count as pending.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "success" => GatewayPaymentStatus::Success,
            "failed" => GatewayPaymentStatus::Failed,
            "abandoned" => GatewayPaymentStatus::Abandoned,
            "reversed" => GatewayPaymentStatus::Reversed,
            _ => GatewayPaymentStatus::Pending,
        }
    }

    /// Final outcome, or `None` while the payment is still open.
    pub fn outcome(&self) -> Option<PaymentOutcome> {
        match self {
            GatewayPaymentStatus::Success => Some(PaymentOutcome::Success),
            GatewayPaymentStatus::Failed
            | GatewayPaymentStatus::Abandoned
            | GatewayPaymentStatus::Reversed => Some(PaymentOutcome::Failed),
            GatewayPaymentStatus::Pending => None,
        }
    }
}

/// Result of asking the gateway about a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedPayment {
    pub reference: String,
    pub status: GatewayPaymentStatus,
    pub channel: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a transaction and returns the checkout handle.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` on HTTP 401
    /// - `Forbidden` on HTTP 403
    /// - `ServiceCommunication` on any other non-2xx status or transport failure
    async fn initialize(
        &self,
        request: InitializePaymentRequest,
    ) -> Result<PaymentSession, PaymentError>;

    /// Fetches the current status of a transaction.
    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, PaymentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_status_maps_to_outcome() {
        assert_eq!(
            GatewayPaymentStatus::parse("success").outcome(),
            Some(PaymentOutcome::Success)
        );
        assert_eq!(
            GatewayPaymentStatus::parse("abandoned").outcome(),
            Some(PaymentOutcome::Failed)
        );
        assert_eq!(GatewayPaymentStatus::parse("ongoing").outcome(), None);
    }

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn PaymentGateway) {}
}
