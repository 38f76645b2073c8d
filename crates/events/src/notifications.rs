use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventcloud_core::{EventId, TenantId, UserId};
use eventcloud_notifications::Notification;

/// Notification: an event was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCancelled {
    pub event_id: EventId,
    pub tenant_id: Option<TenantId>,
    /// Actor who cancelled the event, when known.
    pub cancelled_by: Option<UserId>,
    pub occurred_at: DateTime<Utc>,
}

/// Domain notifications emitted by event operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventNotification {
    EventCancelled(EventCancelled),
}

impl Notification for EventNotification {
    fn notification_type(&self) -> &'static str {
        match self {
            EventNotification::EventCancelled(_) => "events.event.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            EventNotification::EventCancelled(n) => n.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_notification_metadata() {
        let occurred = Utc::now();
        let n = EventNotification::EventCancelled(EventCancelled {
            event_id: EventId::new(),
            tenant_id: Some(TenantId::new()),
            cancelled_by: None,
            occurred_at: occurred,
        });

        assert_eq!(n.notification_type(), "events.event.cancelled");
        assert_eq!(n.version(), 1);
        assert_eq!(n.occurred_at(), occurred);
    }

    #[test]
    fn serializes_with_stable_field_names() {
        let n = EventNotification::EventCancelled(EventCancelled {
            event_id: EventId::new(),
            tenant_id: None,
            cancelled_by: Some(UserId::new()),
            occurred_at: Utc::now(),
        });

        let value = serde_json::to_value(&n).unwrap();
        let payload = &value["EventCancelled"];
        assert!(payload.get("event_id").is_some());
        assert!(payload.get("cancelled_by").is_some());
        assert!(payload.get("occurred_at").is_some());
    }
}
