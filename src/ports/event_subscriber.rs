//! EventSubscriber port - in-process consumers of published messages.
//!
//! The notification subsystem lives outside this service; subscribers here
//! are used for local wiring and tests.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, MessageEnvelope};

/// Handler for processing published messages.
///
/// Implementations should be idempotent: delivery is at-least-once.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: MessageEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to messages by event type.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe handler to multiple event types.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}
