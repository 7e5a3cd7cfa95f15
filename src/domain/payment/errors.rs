//! Payment error types.
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Unauthorized | 401 |
//! | Forbidden | 403 |
//! | ServiceCommunication | 502 |
//! | InvalidAmount | 400 |
//! | RegistrationNotFound | 404 |
//! | InvalidState | 409 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, RegistrationId};

/// Errors raised while opening or verifying a payment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Gateway rejected our credentials (HTTP 401).
    #[error("Payment gateway rejected the credentials")]
    Unauthorized,

    /// Gateway refused the operation (HTTP 403).
    #[error("Payment gateway refused the request")]
    Forbidden,

    /// Any other gateway failure: non-2xx status, transport error or timeout.
    /// `status` is absent when no HTTP response was received.
    #[error("Payment gateway communication failed{}: {body}", status_suffix(.status))]
    ServiceCommunication { status: Option<u16>, body: String },

    #[error("Invalid payment amount: {0}")]
    InvalidAmount(String),

    #[error("Registration not found: {0}")]
    RegistrationNotFound(RegistrationId),

    #[error("Payment cannot be initiated: {0}")]
    InvalidState(String),

    #[error("Payment storage error: {0}")]
    Infrastructure(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|s| format!(" with status {}", s))
        .unwrap_or_default()
}

impl PaymentError {
    /// Wraps a transport-level failure (connect, read, decode).
    pub fn network(err: impl std::fmt::Display) -> Self {
        PaymentError::ServiceCommunication {
            status: None,
            body: err.to_string(),
        }
    }

    /// Maps a non-success gateway response.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 => PaymentError::Unauthorized,
            403 => PaymentError::Forbidden,
            _ => PaymentError::ServiceCommunication {
                status: Some(status),
                body: body.into(),
            },
        }
    }

    pub fn timeout(after_secs: u64) -> Self {
        PaymentError::ServiceCommunication {
            status: None,
            body: format!("gateway did not respond within {}s", after_secs),
        }
    }

    /// Returns true if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::ServiceCommunication { .. } | PaymentError::Infrastructure(_)
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::Unauthorized => ErrorCode::Unauthorized,
            PaymentError::Forbidden => ErrorCode::Forbidden,
            PaymentError::ServiceCommunication { .. } => ErrorCode::PaymentGatewayError,
            PaymentError::InvalidAmount(_) => ErrorCode::ValidationFailed,
            PaymentError::RegistrationNotFound(_) => ErrorCode::RegistrationNotFound,
            PaymentError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            PaymentError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        PaymentError::Infrastructure(err.to_string())
    }
}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

/// Errors raised while applying a final payment outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Settlement storage error: {0}")]
    Infrastructure(String),
}

impl From<DomainError> for SettlementError {
    fn from(err: DomainError) -> Self {
        SettlementError::Infrastructure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_and_403_map_to_auth_errors() {
        assert_eq!(PaymentError::from_status(401, "nope"), PaymentError::Unauthorized);
        assert_eq!(PaymentError::from_status(403, "nope"), PaymentError::Forbidden);
    }

    #[test]
    fn other_statuses_keep_raw_body() {
        let err = PaymentError::from_status(502, "{\"message\":\"upstream\"}");
        assert_eq!(
            err,
            PaymentError::ServiceCommunication {
                status: Some(502),
                body: "{\"message\":\"upstream\"}".to_string()
            }
        );
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Payment gateway communication failed with status 502: {\"message\":\"upstream\"}"
        );
    }

    #[test]
    fn network_error_has_no_status() {
        let err = PaymentError::network("connection refused");
        assert_eq!(
            err.to_string(),
            "Payment gateway communication failed: connection refused"
        );
    }

    #[test]
    fn auth_errors_are_not_retryable() {
        assert!(!PaymentError::Unauthorized.is_retryable());
        assert!(!PaymentError::Forbidden.is_retryable());
    }
}
