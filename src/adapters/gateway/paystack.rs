//! Paystack payment gateway adapter.
//!
//! Implements the `PaymentGateway` port over the Paystack REST API:
//! - `POST /transaction/initialize` opens a hosted checkout
//! - `GET /transaction/verify/{reference}` reports a transaction's status
//!
//! Requests carry the secret key as a bearer token. Each call performs one
//! HTTP exchange and never retries; callers own retry policy.
//!
//! # Configuration
//!
//! ```ignore
//! let config = PaystackConfig::new(secret_key)
//!     .with_callback_url("https://boxoffice.example.com/payments/done");
//! let gateway = PaystackGateway::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::payment::PaymentError;
use crate::ports::{
    GatewayPaymentStatus, InitializePaymentRequest, PaymentGateway, PaymentSession,
    VerifiedPayment,
};

/// Paystack API configuration.
#[derive(Clone)]
pub struct PaystackConfig {
    /// Secret API key (sk_live_... or sk_test_...).
    secret_key: SecretString,

    /// Base URL for the API (default: https://api.paystack.co).
    api_base_url: String,

    /// Where the hosted checkout sends the buyer afterwards.
    callback_url: Option<String>,

    /// ISO currency code charged in.
    currency: String,

    /// Per-request timeout.
    timeout: Duration,
}

impl PaystackConfig {
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            secret_key,
            api_base_url: "https://api.paystack.co".to_string(),
            callback_url: None,
            currency: "NGN".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct InitializeBody<'a> {
    email: &'a str,
    /// Minor units, as a string per the API.
    amount: String,
    currency: &'a str,
    channels: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<&'a str>,
    metadata: InitializeMetadata,
}

#[derive(Debug, Serialize)]
struct InitializeMetadata {
    registration_id: String,
}

/// Paystack wraps every response in `{status, message, data}`.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    status: bool,
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    access_code: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    reference: String,
    status: String,
    #[serde(default)]
    channel: Option<String>,
}

fn initialize_body<'a>(
    request: &'a InitializePaymentRequest,
    config: &'a PaystackConfig,
) -> InitializeBody<'a> {
    InitializeBody {
        email: &request.email,
        amount: request.amount_minor.to_string(),
        currency: &config.currency,
        channels: vec![request.payment_method.as_str()],
        callback_url: config.callback_url.as_deref(),
        metadata: InitializeMetadata {
            registration_id: request.registration_id.to_string(),
        },
    }
}

fn unwrap_data<T>(response: ApiResponse<T>) -> Result<T, PaymentError> {
    match (response.status, response.data) {
        (true, Some(data)) => Ok(data),
        _ => Err(PaymentError::ServiceCommunication {
            status: None,
            body: response.message,
        }),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Adapter
// ════════════════════════════════════════════════════════════════════════════

/// Paystack payment gateway adapter.
pub struct PaystackGateway {
    config: PaystackConfig,
    http_client: reqwest::Client,
}

impl PaystackGateway {
    pub fn new(config: PaystackConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(PaymentError::network)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                error = %error_text,
                "Paystack {} failed",
                operation
            );
            return Err(PaymentError::from_status(status.as_u16(), error_text));
        }

        let body: ApiResponse<T> = response.json().await.map_err(|e| {
            PaymentError::network(format!("Failed to parse Paystack response: {}", e))
        })?;
        unwrap_data(body)
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn initialize(
        &self,
        request: InitializePaymentRequest,
    ) -> Result<PaymentSession, PaymentError> {
        let url = format!("{}/transaction/initialize", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.secret_key.expose_secret())
            .json(&initialize_body(&request, &self.config))
            .send()
            .await
            .map_err(PaymentError::network)?;

        let data: InitializeData = Self::read_json(response, "initialize").await?;

        tracing::debug!(
            reference = %data.reference,
            registration_id = %request.registration_id,
            "Paystack transaction initialized"
        );

        Ok(PaymentSession {
            authorization_url: data.authorization_url,
            access_code: data.access_code,
            reference: data.reference,
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, PaymentError> {
        let url = format!(
            "{}/transaction/verify/{}",
            self.config.api_base_url, reference
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.config.secret_key.expose_secret())
            .send()
            .await
            .map_err(PaymentError::network)?;

        let data: VerifyData = Self::read_json(response, "verify").await?;

        Ok(VerifiedPayment {
            reference: data.reference,
            status: GatewayPaymentStatus::parse(&data.status),
            channel: data.channel,
        })
    }
}
