//! Payment gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::gateway::PaystackConfig;

/// Payment gateway configuration (Paystack)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Gateway secret API key (`sk_test_...` / `sk_live_...`)
    pub secret_key: SecretString,

    /// Shared secret for webhook signatures; defaults to the secret key
    pub webhook_secret: Option<SecretString>,

    /// API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Where hosted checkout sends the buyer afterwards
    pub callback_url: Option<String>,

    /// ISO 4217 currency code
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Gateway request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl PaymentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_live_mode(&self) -> bool {
        self.secret_key.expose_secret().starts_with("sk_live_")
    }

    /// Secret the gateway signs callbacks with.
    pub fn webhook_secret(&self) -> SecretString {
        self.webhook_secret
            .clone()
            .unwrap_or_else(|| self.secret_key.clone())
    }

    /// Gateway client settings.
    pub fn paystack(&self) -> PaystackConfig {
        let config = PaystackConfig::new(self.secret_key.clone())
            .with_base_url(self.api_base_url.clone())
            .with_currency(self.currency.clone())
            .with_timeout(self.timeout());
        match &self.callback_url {
            Some(url) => config.with_callback_url(url.clone()),
            None => config,
        }
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        let key = self.secret_key.expose_secret();
        if key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__SECRET_KEY"));
        }
        if !key.starts_with("sk_") {
            return Err(ValidationError::InvalidGatewayKey);
        }
        if self.is_live_mode() && environment != Environment::Production {
            return Err(ValidationError::LiveKeyOutsideProduction);
        }
        if !is_http_url(&self.api_base_url) {
            return Err(ValidationError::InvalidUrl("payment.api_base_url"));
        }
        if let Some(url) = &self.callback_url {
            if !is_http_url(url) {
                return Err(ValidationError::InvalidUrl("payment.callback_url"));
            }
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency(self.currency.clone()));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("payment.timeout_secs"));
        }
        Ok(())
    }
}

pub(super) fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

fn default_api_base_url() -> String {
    "https://api.paystack.co".to_string()
}

fn default_currency() -> String {
    "NGN".to_string()
}

fn default_timeout() -> u64 {
    10
}
