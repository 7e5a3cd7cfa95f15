//! Redis publisher for multi-instance deployments.
//!
//! Each message is `PUBLISH`ed as its JSON envelope on a channel named after
//! the event type, prefixed with the configured namespace:
//! `boxoffice:tickets.purchased.v1`. Downstream notifiers subscribe per type.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{DomainError, ErrorCode, MessageEnvelope};
use crate::ports::EventPublisher;

pub const DEFAULT_CHANNEL_PREFIX: &str = "boxoffice";

#[derive(Clone)]
pub struct RedisEventPublisher {
    conn: MultiplexedConnection,
    channel_prefix: String,
}

impl RedisEventPublisher {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            channel_prefix: DEFAULT_CHANNEL_PREFIX.to_string(),
        }
    }

    pub fn with_channel_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.channel_prefix = prefix.into();
        self
    }

    /// Opens a multiplexed connection to `url`.
    pub async fn connect(url: &str) -> Result<Self, DomainError> {
        let client = redis::Client::open(url).map_err(cache_error)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(cache_error)?;
        Ok(Self::new(conn))
    }

    fn channel_for(&self, event_type: &str) -> String {
        channel_name(&self.channel_prefix, event_type)
    }
}

fn channel_name(prefix: &str, event_type: &str) -> String {
    format!("{}:{}", prefix, event_type)
}

fn cache_error(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::BrokerUnavailable, format!("Redis error: {}", e))
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: MessageEnvelope) -> Result<(), DomainError> {
        let channel = self.channel_for(&event.event_type);
        let payload = serde_json::to_string(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize message: {}", e),
            )
        })?;

        let mut conn = self.conn.clone();
        let receivers: i64 = conn.publish(&channel, payload).await.map_err(cache_error)?;

        tracing::debug!(
            channel = %channel,
            message_id = event.message_id.as_str(),
            receivers,
            "Message published"
        );
        Ok(())
    }
}
