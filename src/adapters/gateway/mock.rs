//! Mock payment gateway for testing.
//!
//! Supports:
//! - Deterministic references (`ref_1`, `ref_2`, ...)
//! - Error injection per operation
//! - Configurable verify results
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::payment::PaymentError;
use crate::ports::{
    GatewayPaymentStatus, InitializePaymentRequest, PaymentGateway, PaymentSession,
    VerifiedPayment,
};

#[derive(Default)]
struct MockState {
    next_reference: u32,
    initialize_error: Option<PaymentError>,
    verify_error: Option<PaymentError>,
    statuses: HashMap<String, GatewayPaymentStatus>,
    initialize_delay: Option<Duration>,
    initialized: Vec<InitializePaymentRequest>,
    verified: Vec<String>,
}

/// Mock payment gateway.
///
/// # Example
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// gateway.fail_initialize(PaymentError::Unauthorized);
/// gateway.set_status("ref_1", GatewayPaymentStatus::Success);
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Every `initialize` call fails with `error` until cleared.
    pub fn fail_initialize(&self, error: PaymentError) {
        self.state().initialize_error = Some(error);
    }

    /// Every `verify` call fails with `error` until cleared.
    pub fn fail_verify(&self, error: PaymentError) {
        self.state().verify_error = Some(error);
    }

    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.initialize_error = None;
        state.verify_error = None;
    }

    /// Status `verify` reports for `reference` (default: pending).
    pub fn set_status(&self, reference: impl Into<String>, status: GatewayPaymentStatus) {
        self.state().statuses.insert(reference.into(), status);
    }

    /// Makes `initialize` sleep before answering.
    pub fn delay_initialize(&self, delay: Duration) {
        self.state().initialize_delay = Some(delay);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertions
    // ════════════════════════════════════════════════════════════════════════════

    pub fn initialize_calls(&self) -> Vec<InitializePaymentRequest> {
        self.state().initialized.clone()
    }

    pub fn verify_calls(&self) -> Vec<String> {
        self.state().verified.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn initialize(
        &self,
        request: InitializePaymentRequest,
    ) -> Result<PaymentSession, PaymentError> {
        let delay = self.state().initialize_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state();
        state.initialized.push(request);
        if let Some(error) = state.initialize_error.clone() {
            return Err(error);
        }

        state.next_reference += 1;
        let reference = format!("ref_{}", state.next_reference);
        Ok(PaymentSession {
            authorization_url: format!("https://checkout.mock/{}", reference),
            access_code: format!("access_{}", state.next_reference),
            reference,
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, PaymentError> {
        let mut state = self.state();
        state.verified.push(reference.to_string());
        if let Some(error) = state.verify_error.clone() {
            return Err(error);
        }

        let status = state
            .statuses
            .get(reference)
            .copied()
            .unwrap_or(GatewayPaymentStatus::Pending);
        Ok(VerifiedPayment {
            reference: reference.to_string(),
            status,
            channel: Some("card".to_string()),
        })
    }
}
