//! Ticketing configuration: purchase limits, ticket tokens and payment reconciliation.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::payment::is_http_url;
use super::server::Environment;
use crate::application::{ReconciliationConfig, DEFAULT_MAX_QUANTITY};

#[derive(Debug, Clone, Deserialize)]
pub struct TicketingConfig {
    /// Largest quantity accepted in one registration
    #[serde(default = "default_max_quantity")]
    pub max_quantity: u32,

    /// Base of the scan URL embedded in each ticket
    pub verification_base_url: String,

    /// HMAC key for verification tokens
    pub token_secret: SecretString,

    /// Seconds between reconciliation sweeps
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,

    /// PENDING transactions older than this are checked with the gateway
    #[serde(default = "default_stale_after")]
    pub stale_after_secs: u64,

    /// PENDING transactions older than this are failed
    #[serde(default = "default_expire_after")]
    pub expire_after_secs: u64,

    /// Transactions examined per sweep
    #[serde(default = "default_reconcile_batch")]
    pub reconcile_batch_size: u32,
}

impl TicketingConfig {
    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs)
    }

    pub fn reconciliation(&self, gateway_timeout: Duration) -> ReconciliationConfig {
        ReconciliationConfig {
            stale_after: Duration::from_secs(self.stale_after_secs),
            expire_after: Duration::from_secs(self.expire_after_secs),
            batch_size: self.reconcile_batch_size,
            gateway_timeout,
        }
    }

    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.max_quantity == 0 || self.max_quantity > 100 {
            return Err(ValidationError::InvalidMaxQuantity);
        }
        if !is_http_url(&self.verification_base_url) {
            return Err(ValidationError::InvalidUrl("ticketing.verification_base_url"));
        }
        if environment == Environment::Production
            && !self.verification_base_url.starts_with("https://")
        {
            return Err(ValidationError::UrlMustBeHttps("ticketing.verification_base_url"));
        }
        if self.token_secret.expose_secret().len() < 32 {
            return Err(ValidationError::SigningSecretTooShort);
        }
        if self.reconcile_interval_secs == 0 {
            return Err(ValidationError::InvalidTimeout("ticketing.reconcile_interval_secs"));
        }
        if self.expire_after_secs <= self.stale_after_secs {
            return Err(ValidationError::InvalidReconciliationWindow);
        }
        if self.reconcile_batch_size == 0 || self.reconcile_batch_size > 1000 {
            return Err(ValidationError::InvalidBatchSize);
        }
        Ok(())
    }
}

fn default_max_quantity() -> u32 {
    DEFAULT_MAX_QUANTITY
}

fn default_reconcile_interval() -> u64 {
    60
}

fn default_stale_after() -> u64 {
    15 * 60
}

fn default_expire_after() -> u64 {
    24 * 60 * 60
}

fn default_reconcile_batch() -> u32 {
    50
}
