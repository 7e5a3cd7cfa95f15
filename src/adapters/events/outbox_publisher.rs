//! OutboxPublisher - relays staged events from the outbox to the broker.
//!
//! Second half of the transactional outbox:
//! 1. A unit of work stages events next to the state change that produced them
//! 2. **OutboxPublisher polls the outbox and publishes to the broker** ← This module
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `poll_interval` | 100ms | How often to check for unpublished events |
//! | `batch_size` | 100 | Max events to publish per poll cycle |
//! | `retention_hours` | 72 | Published entries older than this are deleted |
//!
//! ## Graceful Shutdown
//!
//! The service listens for a shutdown signal and publishes one final batch
//! before stopping.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::domain::foundation::DomainError;
use crate::ports::{EventPublisher, OutboxStore};

/// Configuration for the OutboxPublisher service.
#[derive(Debug, Clone)]
pub struct OutboxPublisherConfig {
    pub poll_interval: Duration,
    pub batch_size: u32,
    pub retention_hours: u32,
}

impl Default for OutboxPublisherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            batch_size: 100,
            retention_hours: 72,
        }
    }
}

impl OutboxPublisherConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_batch_size(mut self, size: u32) -> Self {
        self.batch_size = size;
        self
    }
}

/// Background service that publishes events from the outbox.
pub struct OutboxPublisher {
    outbox: Arc<dyn OutboxStore>,
    event_publisher: Arc<dyn EventPublisher>,
    config: OutboxPublisherConfig,
}

impl OutboxPublisher {
    pub fn new(outbox: Arc<dyn OutboxStore>, event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self::with_config(outbox, event_publisher, OutboxPublisherConfig::default())
    }

    pub fn with_config(
        outbox: Arc<dyn OutboxStore>,
        event_publisher: Arc<dyn EventPublisher>,
        config: OutboxPublisherConfig,
    ) -> Self {
        Self {
            outbox,
            event_publisher,
            config,
        }
    }

    /// Run the publisher loop until shutdown signal is received.
    ///
    /// Storage errors while polling are logged and retried on the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), DomainError> {
        let mut interval = time::interval(self.config.poll_interval);
        let mut cleanup = time::interval(Duration::from_secs(60 * 60));

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        // Shutdown requested - process one final batch then exit
                        self.process_batch().await?;
                        tracing::info!("Outbox publisher stopped");
                        return Ok(());
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.process_batch().await {
                        tracing::error!(error = %e, "Outbox poll failed");
                    }
                }

                _ = cleanup.tick() => {
                    match self.outbox.cleanup_old(self.config.retention_hours).await {
                        Ok(0) => {}
                        Ok(removed) => tracing::debug!(removed, "Outbox cleanup"),
                        Err(e) => tracing::warn!(error = %e, "Outbox cleanup failed"),
                    }
                }
            }
        }
    }

    /// Publish a single batch of pending entries.
    ///
    /// A failed entry is marked failed and retried on a later poll.
    pub async fn process_batch(&self) -> Result<usize, DomainError> {
        let entries = self.outbox.get_pending(self.config.batch_size).await?;
        let mut published_count = 0;

        for entry in entries {
            match self.event_publisher.publish(entry.event.clone()).await {
                Ok(()) => {
                    self.outbox.mark_published(entry.id).await?;
                    published_count += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        message_id = entry.event.message_id.as_str(),
                        event_type = %entry.event.event_type,
                        attempts = entry.attempts + 1,
                        error = %e,
                        "Failed to publish event"
                    );
                    self.outbox.mark_failed(entry.id, &e.to_string()).await?;
                }
            }
        }

        Ok(published_count)
    }

    /// Run exactly one poll cycle.
    pub async fn poll_once(&self) -> Result<usize, DomainError> {
        self.process_batch().await
    }
}
