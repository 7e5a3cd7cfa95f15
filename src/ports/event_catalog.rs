//! Event catalog port - read access to events owned by event management.

use async_trait::async_trait;

use crate::domain::catalog::EventDetails;
use crate::domain::foundation::{DomainError, EventId};

#[async_trait]
pub trait EventCatalog: Send + Sync {
    /// Returns `None` if the event does not exist.
    async fn find_event(&self, id: &EventId) -> Result<Option<EventDetails>, DomainError>;
}
