//! Signed verification tokens.
//!
//! A token is `base64url(url) "." base64url(HMAC-SHA256(secret, url))`. It
//! carries the verification URL and proves it was minted here, so a scanner
//! can check it offline before calling the verification endpoint.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::TokenRenderer;

type HmacSha256 = Hmac<Sha256>;

pub struct SignedUrlTokenRenderer {
    secret: SecretString,
}

impl SignedUrlTokenRenderer {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self) -> Result<HmacSha256, DomainError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes()).map_err(|e| {
            DomainError::new(ErrorCode::InternalError, format!("Invalid token key: {}", e))
        })
    }

    /// Returns the embedded URL if `token` was signed with this renderer's secret.
    pub fn verify(&self, token: &str) -> Option<String> {
        let (payload, signature) = token.split_once('.')?;
        let url = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(&url);
        mac.verify_slice(&signature).ok()?;

        String::from_utf8(url).ok()
    }
}

impl TokenRenderer for SignedUrlTokenRenderer {
    fn render(&self, verification_url: &str) -> Result<String, DomainError> {
        let mut mac = self.mac()?;
        mac.update(verification_url.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(verification_url),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }
}
