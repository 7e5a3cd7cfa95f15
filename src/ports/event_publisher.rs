//! EventPublisher port - the narrow interface to the message broker.
//!
//! Domain code never publishes directly: events are staged into the outbox
//! inside a unit of work and relayed here by the outbox publisher.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MessageEnvelope};

/// Port for publishing messages.
///
/// Implementations must ensure:
/// - Messages are delivered at-least-once (consumers may see duplicates)
/// - Errors are propagated to the caller so the outbox can retry
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single message.
    async fn publish(&self, event: MessageEnvelope) -> Result<(), DomainError>;

    /// Publish several messages in order, stopping at the first failure.
    async fn publish_all(&self, events: Vec<MessageEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
