//! Registration status state machine.
//!
//! A registration moves exactly once from PENDING to CONFIRMED or FAILED and
//! is never reopened.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    /// Accepted, awaiting payment or issuance.
    Pending,

    /// Tickets issued.
    Confirmed,

    /// Payment failed or issuance was rolled back.
    Failed,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "PENDING",
            RegistrationStatus::Confirmed => "CONFIRMED",
            RegistrationStatus::Failed => "FAILED",
        }
    }
}

impl StateMachine for RegistrationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RegistrationStatus::*;
        matches!((self, target), (Pending, Confirmed) | (Pending, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RegistrationStatus::*;
        match self {
            Pending => vec![Confirmed, Failed],
            Confirmed | Failed => vec![],
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RegistrationStatus::Pending),
            "CONFIRMED" => Ok(RegistrationStatus::Confirmed),
            "FAILED" => Ok(RegistrationStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "registration_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_is_the_only_non_terminal_state() {
        assert!(!RegistrationStatus::Pending.is_terminal());
        assert!(RegistrationStatus::Confirmed.is_terminal());
        assert!(RegistrationStatus::Failed.is_terminal());
    }

    #[test]
    fn failed_cannot_be_reopened() {
        assert!(RegistrationStatus::Failed
            .transition_to(RegistrationStatus::Pending)
            .is_err());
        assert!(RegistrationStatus::Failed
            .transition_to(RegistrationStatus::Confirmed)
            .is_err());
    }

    #[test]
    fn parses_database_representation() {
        assert_eq!(
            "CONFIRMED".parse::<RegistrationStatus>().unwrap(),
            RegistrationStatus::Confirmed
        );
        assert!("confirmed".parse::<RegistrationStatus>().is_err());
    }
}
