//! OutboxStore port - relay side of the transactional outbox.
//!
//! 1. A unit of work stages events next to the state change that produced them
//! 2. `OutboxPublisher` reads pending entries from this store
//! 3. It publishes them to the broker and marks them published or failed
//!
//! An event therefore reaches the broker if and only if its state change
//! committed, at least once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, MessageEnvelope};

/// Status of an outbox entry in the delivery pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    /// Written but not yet published
    Pending,
    /// Successfully handed to the broker
    Published,
    /// Last publish attempt failed (retried on the next poll)
    Failed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Published => "published",
            OutboxStatus::Failed => "failed",
        }
    }
}

/// An entry in the event outbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: Uuid,
    pub event: MessageEnvelope,
    pub status: OutboxStatus,
    pub created_at: DateTime<Utc>,
    /// When the entry was last published or failed
    pub processed_at: Option<DateTime<Utc>>,
    pub attempts: u32,
    pub last_error: Option<String>,
}

impl OutboxEntry {
    /// Create a new pending entry for an event.
    pub fn new(event: MessageEnvelope) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            status: OutboxStatus::Pending,
            created_at: Utc::now(),
            processed_at: None,
            attempts: 0,
            last_error: None,
        }
    }

    pub fn mark_published(&mut self) {
        self.status = OutboxStatus::Published;
        self.processed_at = Some(Utc::now());
        self.attempts += 1;
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = OutboxStatus::Failed;
        self.processed_at = Some(Utc::now());
        self.attempts += 1;
        self.last_error = Some(error.into());
    }

    /// Pending and failed entries are both due for (re)delivery.
    pub fn is_deliverable(&self) -> bool {
        self.status != OutboxStatus::Published
    }
}

#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Entries awaiting delivery (pending or failed), oldest first.
    async fn get_pending(&self, limit: u32) -> Result<Vec<OutboxEntry>, DomainError>;

    async fn mark_published(&self, id: Uuid) -> Result<(), DomainError>;

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), DomainError>;

    /// Deletes entries published more than `older_than_hours` ago.
    async fn cleanup_old(&self, older_than_hours: u32) -> Result<u64, DomainError>;
}
