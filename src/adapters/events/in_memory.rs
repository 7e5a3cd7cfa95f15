//! In-process event bus.
//!
//! Routes each relayed envelope to the handlers subscribed to its type and
//! keeps a bounded window of recent envelopes. Single-node deployments without
//! Redis use it as the relay target; tests use the window for assertions.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode, MessageEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

/// How many envelopes `InMemoryEventBus::new` keeps.
pub const DEFAULT_RETENTION: usize = 1_000;

type Routes = HashMap<String, Vec<Arc<dyn EventHandler>>>;

pub struct InMemoryEventBus {
    routes: RwLock<Routes>,
    recent: Mutex<VecDeque<MessageEnvelope>>,
    retention: usize,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }

    /// Keeps at most `retention` envelopes; older ones are dropped first.
    pub fn with_retention(retention: usize) -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
            recent: Mutex::new(VecDeque::with_capacity(retention.min(64))),
            retention,
        }
    }

    /// Retained envelopes, oldest first.
    pub fn published_events(&self) -> Vec<MessageEnvelope> {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<MessageEnvelope> {
        self.retained(|e| e.event_type == event_type)
    }

    /// Envelopes of one purchase, keyed by registration id.
    pub fn events_for_correlation(&self, correlation_id: &str) -> Vec<MessageEnvelope> {
        self.retained(|e| e.metadata.correlation_id.as_deref() == Some(correlation_id))
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        !self.events_of_type(event_type).is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn clear(&self) {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn retained(&self, keep: impl Fn(&MessageEnvelope) -> bool) -> Vec<MessageEnvelope> {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| keep(e))
            .cloned()
            .collect()
    }

    fn remember(&self, event: &MessageEnvelope) -> Result<(), DomainError> {
        if self.retention == 0 {
            return Ok(());
        }
        let mut recent = self.recent.lock().map_err(|_| poisoned("history"))?;
        while recent.len() >= self.retention {
            recent.pop_front();
        }
        recent.push_back(event.clone());
        Ok(())
    }

    fn handlers_for(&self, event_type: &str) -> Result<Vec<Arc<dyn EventHandler>>, DomainError> {
        let routes = self.routes.read().map_err(|_| poisoned("routes"))?;
        Ok(routes.get(event_type).cloned().unwrap_or_default())
    }

    fn route(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(what: &str) -> DomainError {
    DomainError::new(
        ErrorCode::InternalError,
        format!("event bus {} lock poisoned", what),
    )
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: MessageEnvelope) -> Result<(), DomainError> {
        self.remember(&event)?;

        let handlers = self.handlers_for(&event.event_type)?;
        let mut failures = Vec::new();
        for handler in handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                tracing::warn!(
                    handler = handler.name(),
                    event_type = %event.event_type,
                    error = %e,
                    "Event handler failed"
                );
                failures.push(format!("{}: {}", handler.name(), e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Handler errors: {}", failures.join(", ")),
            ))
        }
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.route(event_type, handler);
    }

    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        for event_type in event_types {
            self.route(event_type, Arc::clone(&handler));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn envelope(event_type: &str, registration: &str) -> MessageEnvelope {
        MessageEnvelope::new(event_type, "agg-1", "Registration", json!({}))
            .with_correlation_id(registration)
    }

    struct Tally(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler for Tally {
        async fn handle(&self, _: MessageEnvelope) -> Result<(), DomainError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "Tally"
        }
    }

    struct BrokenMailer;

    #[async_trait]
    impl EventHandler for BrokenMailer {
        async fn handle(&self, _: MessageEnvelope) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "smtp refused"))
        }

        fn name(&self) -> &'static str {
            "BuyerMailer"
        }
    }

    #[tokio::test]
    async fn keeps_envelopes_in_relay_order() {
        let bus = InMemoryEventBus::new();

        bus.publish(envelope("payment.status.v1", "reg-1")).await.unwrap();
        bus.publish(envelope("tickets.purchased.v1", "reg-1")).await.unwrap();

        let types: Vec<_> = bus
            .published_events()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(types, vec!["payment.status.v1", "tickets.purchased.v1"]);
        assert!(bus.has_event("tickets.purchased.v1"));
    }

    #[tokio::test]
    async fn history_is_bounded() {
        let bus = InMemoryEventBus::with_retention(2);

        for registration in ["reg-1", "reg-2", "reg-3"] {
            bus.publish(envelope("tickets.purchased.v1", registration))
                .await
                .unwrap();
        }

        assert_eq!(bus.event_count(), 2);
        assert!(bus.events_for_correlation("reg-1").is_empty());
        assert_eq!(bus.events_for_correlation("reg-3").len(), 1);
    }

    #[tokio::test]
    async fn zero_retention_still_routes() {
        let bus = InMemoryEventBus::with_retention(0);
        let seen = Arc::new(AtomicUsize::new(0));
        bus.subscribe("payment.status.v1", Arc::new(Tally(seen.clone())));

        bus.publish(envelope("payment.status.v1", "r")).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn filters_by_type_and_correlation() {
        let bus = InMemoryEventBus::new();

        bus.publish(envelope("payment.status.v1", "reg-1")).await.unwrap();
        bus.publish(envelope("payment.status.v1", "reg-2")).await.unwrap();
        bus.publish(envelope("tickets.purchased.v1", "reg-1")).await.unwrap();

        assert_eq!(bus.events_of_type("payment.status.v1").len(), 2);
        assert_eq!(bus.events_for_correlation("reg-1").len(), 2);
    }

    #[tokio::test]
    async fn handlers_see_only_their_types() {
        let bus = InMemoryEventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        bus.subscribe_all(
            &["payment.status.v1", "tickets.purchased.v1"],
            Arc::new(Tally(seen.clone())),
        );
        bus.subscribe("payment.status.v1", Arc::new(Tally(seen.clone())));

        bus.publish(envelope("payment.status.v1", "r")).await.unwrap();
        bus.publish(envelope("tickets.purchased.v1", "r")).await.unwrap();
        bus.publish(envelope("payment.requested.v1", "r")).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failing_handler_fails_the_publish() {
        let bus = InMemoryEventBus::new();
        bus.subscribe("payment.status.v1", Arc::new(BrokenMailer));

        let err = bus
            .publish(envelope("payment.status.v1", "r"))
            .await
            .unwrap_err();

        assert!(err.message.contains("BuyerMailer"));
        assert_eq!(bus.event_count(), 1);
    }

    #[tokio::test]
    async fn clear_empties_history() {
        let bus = InMemoryEventBus::new();
        bus.publish_all(vec![envelope("a.v1", "r"), envelope("b.v1", "r")])
            .await
            .unwrap();

        bus.clear();

        assert_eq!(bus.event_count(), 0);
    }
}
