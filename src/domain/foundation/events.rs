//! Outbox messages.
//!
//! Each purchase step stages a fact (`payment.requested`, `payment.status`,
//! `tickets.purchased`) in the same unit of work that changes state. The fact
//! is stored as a `MessageEnvelope`, which the relay later hands to the bus.
//! Envelopes of one purchase share the registration id as correlation id.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::{DomainError, ErrorCode, Timestamp};

/// A fact recorded by the purchase pipeline.
///
/// Implement with `domain_event!` rather than by hand.
pub trait DomainEvent: Send + Sync {
    /// Versioned routing key, e.g. `tickets.purchased.v1`.
    fn event_type(&self) -> &'static str;
    fn aggregate_id(&self) -> String;
    fn aggregate_type(&self) -> &'static str;
    fn occurred_at(&self) -> Timestamp;
    /// Stable across relay retries so consumers can drop duplicates.
    fn message_id(&self) -> MessageId;
}

pub trait SerializableDomainEvent: DomainEvent + Serialize {
    fn to_envelope(&self) -> Result<MessageEnvelope, DomainError> {
        MessageEnvelope::from_event(self)
    }
}

impl<T: DomainEvent + Serialize> SerializableDomainEvent for T {}

/// Wires a struct into `DomainEvent` by naming its fields.
///
/// ```ignore
/// domain_event!(
///     TicketPurchasedEvent,
///     event_type = "tickets.purchased.v1",
///     aggregate_id = registration_id,
///     aggregate_type = "Registration",
///     occurred_at = purchased_at,
///     message_id = message_id
/// );
/// ```
#[macro_export]
macro_rules! domain_event {
    (
        $event:ident,
        event_type = $event_type:expr,
        aggregate_id = $aggregate_id:ident,
        aggregate_type = $aggregate_type:expr,
        occurred_at = $occurred_at:ident,
        message_id = $message_id:ident
    ) => {
        impl $crate::domain::foundation::DomainEvent for $event {
            fn event_type(&self) -> &'static str {
                $event_type
            }

            fn aggregate_id(&self) -> String {
                self.$aggregate_id.to_string()
            }

            fn aggregate_type(&self) -> &'static str {
                $aggregate_type
            }

            fn occurred_at(&self) -> $crate::domain::foundation::Timestamp {
                self.$occurred_at
            }

            fn message_id(&self) -> $crate::domain::foundation::MessageId {
                self.$message_id.clone()
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for MessageId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Registration id of the purchase the message belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// Row payload of the outbox and unit of transport on the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub message_id: MessageId,
    pub event_type: String,
    pub schema_version: u32,
    /// Transaction reference, registration id or ticket type id.
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub occurred_at: Timestamp,
    pub payload: JsonValue,
    pub metadata: MessageMetadata,
}

/// `payment.status.v2` is version 2. Unversioned types count as 1.
pub(crate) fn schema_version_of(event_type: &str) -> u32 {
    event_type
        .rsplit_once(".v")
        .and_then(|(_, n)| n.parse().ok())
        .unwrap_or(1)
}

impl MessageEnvelope {
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        payload: JsonValue,
    ) -> Self {
        let event_type = event_type.into();
        Self {
            message_id: MessageId::new(),
            schema_version: schema_version_of(&event_type),
            event_type,
            aggregate_id: aggregate_id.into(),
            aggregate_type: aggregate_type.into(),
            occurred_at: Timestamp::now(),
            payload,
            metadata: MessageMetadata::default(),
        }
    }

    pub fn from_event<E>(event: &E) -> Result<Self, DomainError>
    where
        E: DomainEvent + Serialize + ?Sized,
    {
        let event_type = event.event_type();
        let payload = serde_json::to_value(event).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("cannot encode {}: {}", event_type, e),
            )
        })?;

        Ok(Self {
            message_id: event.message_id(),
            event_type: event_type.to_string(),
            schema_version: schema_version_of(event_type),
            aggregate_id: event.aggregate_id(),
            aggregate_type: event.aggregate_type().to_string(),
            occurred_at: event.occurred_at(),
            payload,
            metadata: MessageMetadata::default(),
        })
    }

    pub fn with_correlation_id(mut self, registration: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(registration.into());
        self
    }

    /// Decodes the payload into the event a consumer expects.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}
