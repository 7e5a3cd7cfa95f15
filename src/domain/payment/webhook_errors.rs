//! Webhook error types for payment callback handling.
//!
//! Status codes drive the gateway's redelivery behaviour:
//! - 2xx: acknowledged, no redelivery
//! - 4xx: rejected, no redelivery
//! - 5xx: redelivered later

use axum::http::StatusCode;
use thiserror::Error;

use super::SettlementError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The signature header was absent.
    #[error("Missing signature header")]
    MissingSignature,

    /// HMAC over the raw body did not match the signature header.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Body or signature header could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No transaction carries the callback's reference.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// The transaction was already settled; the callback is a duplicate.
    #[error("Transaction {0} already processed")]
    AlreadyProcessed(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the gateway should redeliver this callback.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Database(_) | WebhookError::TransactionNotFound(_)
        )
    }

    /// Maps the error to an appropriate HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::FORBIDDEN
            }

            WebhookError::ParseError(_) => StatusCode::BAD_REQUEST,

            // Duplicates are acknowledged as success
            WebhookError::AlreadyProcessed(_) => StatusCode::OK,

            WebhookError::TransactionNotFound(_) | WebhookError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<SettlementError> for WebhookError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::TransactionNotFound(reference) => {
                WebhookError::TransactionNotFound(reference)
            }
            SettlementError::Infrastructure(msg) => WebhookError::Database(msg),
        }
    }
}
