//! Event metadata owned by the event-management collaborator.
//!
//! The ticketing pipeline only reads these details: to validate that a
//! registration targets a real event, to decide per-registration ticketing for
//! virtual events, and to denormalize them into purchase notifications.

use serde::{Deserialize, Serialize};

use super::foundation::{EventId, Timestamp};

/// Read-only projection of a ticketed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub id: EventId,
    pub name: String,
    pub venue: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_virtual: bool,
}

impl EventDetails {
    /// True once the event's end time has passed.
    pub fn has_ended(&self, now: Timestamp) -> bool {
        now.is_after(&self.ends_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_ended_compares_against_end_time() {
        let now = Timestamp::now();
        let event = EventDetails {
            id: EventId::new(),
            name: "RustConf".to_string(),
            venue: "Hall A".to_string(),
            starts_at: now.minus_secs(7200),
            ends_at: now.minus_secs(60),
            is_virtual: false,
        };

        assert!(event.has_ended(now));
        assert!(!event.has_ended(now.minus_secs(120)));
    }
}
