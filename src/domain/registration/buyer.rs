//! Buyer contact details captured at registration.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    pub full_name: String,
    pub email: String,
}

impl Buyer {
    /// Validates and normalizes buyer details.
    ///
    /// Names are trimmed, emails trimmed and lower-cased.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let full_name = full_name.into().trim().to_string();
        let email = email.into().trim().to_lowercase();

        if full_name.is_empty() {
            return Err(ValidationError::empty_field("full_name"));
        }
        if full_name.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::invalid_format(
                "full_name",
                format!("must be at most {} characters", MAX_NAME_LEN),
            ));
        }
        if email.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !is_plausible_email(&email) {
            return Err(ValidationError::invalid_format(
                "email",
                "expected an address like name@example.com",
            ));
        }

        Ok(Self { full_name, email })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
