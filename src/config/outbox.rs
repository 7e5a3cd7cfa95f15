//! Outbox relay configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::events::OutboxPublisherConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct OutboxConfig {
    /// Poll interval in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Entries published per poll
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Published entries older than this are deleted
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u32,
}

impl OutboxConfig {
    pub fn publisher_config(&self) -> OutboxPublisherConfig {
        OutboxPublisherConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            batch_size: self.batch_size,
            retention_hours: self.retention_hours,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval_ms == 0 {
            return Err(ValidationError::InvalidTimeout("outbox.poll_interval_ms"));
        }
        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ValidationError::InvalidBatchSize);
        }
        Ok(())
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            batch_size: default_batch_size(),
            retention_hours: default_retention_hours(),
        }
    }
}

fn default_poll_interval() -> u64 {
    500
}

fn default_batch_size() -> u32 {
    100
}

fn default_retention_hours() -> u32 {
    72
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publisher_config_from_defaults() {
        let config = OutboxConfig::default().publisher_config();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.retention_hours, 72);
    }

    #[test]
    fn test_zero_batch_rejected() {
        let config = OutboxConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidBatchSize));
    }
}
