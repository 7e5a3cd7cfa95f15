//! Payment callback verification and parsing.
//!
//! The gateway signs every callback with HMAC-SHA512 over the raw request
//! body using the shared secret, hex-encoded in the `X-Signature` header.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;
use super::PaymentOutcome;

/// Callback event name that reports a successful charge.
pub const CHARGE_SUCCESS_EVENT: &str = "charge.success";

/// Parsed callback body: `{event, data: {reference, channel}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookNotification {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookData {
    pub reference: String,
    #[serde(default)]
    pub channel: Option<String>,
}

impl WebhookNotification {
    /// Any event other than a successful charge settles the payment as failed.
    pub fn outcome(&self) -> PaymentOutcome {
        if self.event == CHARGE_SUCCESS_EVENT {
            PaymentOutcome::Success
        } else {
            PaymentOutcome::Failed
        }
    }
}

/// Verifier for payment gateway callbacks.
pub struct WebhookVerifier {
    secret: SecretString,
}

impl WebhookVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies the signature over `payload` and parses the notification.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` - header is not hex, or the HMAC does not match
    /// - `ParseError` - signature is valid but the body is not a notification
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookNotification, WebhookError> {
        let provided = hex::decode(signature_header.trim())
            .map_err(|_| WebhookError::InvalidSignature)?;
        let expected = self.compute_signature(payload)?;

        if !constant_time_compare(&expected, &provided) {
            return Err(WebhookError::InvalidSignature);
        }

        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    fn compute_signature(&self, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = Hmac::<Sha512>::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Best-effort extraction of the reference from an unverified body, for logging.
pub fn peek_reference(payload: &[u8]) -> Option<String> {
    serde_json::from_slice::<serde_json::Value>(payload)
        .ok()?
        .get("data")?
        .get("reference")?
        .as_str()
        .map(str::to_string)
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes the hex HMAC-SHA512 signature a gateway would send. Test helper.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    match Hmac::<Sha512>::new_from_slice(secret.as_bytes()) {
        Ok(mut mac) => {
            mac.update(payload);
            hex::encode(mac.finalize().into_bytes())
        }
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "sk_test_webhook_secret";

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SecretString::new(TEST_SECRET.to_string()))
    }

    // ══════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_valid_signature() {
        let payload = br#"{"event":"charge.success","data":{"reference":"ref_1","channel":"card"}}"#;
        let signature = sign_payload(TEST_SECRET, payload);

        let notification = verifier().verify_and_parse(payload, &signature).unwrap();

        assert_eq!(notification.data.reference, "ref_1");
        assert_eq!(notification.data.channel.as_deref(), Some("card"));
        assert_eq!(notification.outcome(), PaymentOutcome::Success);
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let payload = br#"{"event":"charge.success","data":{"reference":"ref_1"}}"#;
        let signature = sign_payload("another_secret", payload);

        let result = verifier().verify_and_parse(payload, &signature);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_tampered_payload_fails() {
        let original = br#"{"event":"charge.failed","data":{"reference":"ref_1"}}"#;
        let tampered = br#"{"event":"charge.success","data":{"reference":"ref_1"}}"#;
        let signature = sign_payload(TEST_SECRET, original);

        let result = verifier().verify_and_parse(tampered, &signature);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_non_hex_header_fails() {
        let result = verifier().verify_and_parse(b"{}", "zz-not-hex");
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_accepts_upper_case_hex() {
        let payload = br#"{"event":"charge.success","data":{"reference":"ref_9"}}"#;
        let signature = sign_payload(TEST_SECRET, payload).to_uppercase();

        assert!(verifier().verify_and_parse(payload, &signature).is_ok());
    }

    // ══════════════════════════════════════════════════════════════
    // Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signed_garbage_is_a_parse_error() {
        let payload = b"not json";
        let signature = sign_payload(TEST_SECRET, payload);

        let result = verifier().verify_and_parse(payload, &signature);

        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn non_success_events_fail_the_payment() {
        let notification = WebhookNotification {
            event: "charge.failed".to_string(),
            data: WebhookData {
                reference: "ref_2".to_string(),
                channel: None,
            },
        };
        assert_eq!(notification.outcome(), PaymentOutcome::Failed);
    }

    #[test]
    fn peek_reference_reads_unverified_body() {
        let payload = br#"{"event":"x","data":{"reference":"ref_peek"}}"#;
        assert_eq!(peek_reference(payload).as_deref(), Some("ref_peek"));
        assert_eq!(peek_reference(b"garbage"), None);
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_compare_behaves_like_equality() {
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 4]));
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 3, 4]));
    }
}
