//! Messaging adapters.
//!
//! - `InMemoryEventBus` - in-process routing with a bounded history (single node, tests)
//! - `RedisEventPublisher` - Redis pub/sub publisher
//! - `OutboxPublisher` - Background relay from the outbox to a publisher

mod in_memory;
mod outbox_publisher;
mod redis;

pub use in_memory::{InMemoryEventBus, DEFAULT_RETENTION};
pub use outbox_publisher::{OutboxPublisher, OutboxPublisherConfig};
pub use self::redis::{RedisEventPublisher, DEFAULT_CHANNEL_PREFIX};
