use chrono::{DateTime, Utc};

/// A domain-level notification.
///
/// Notifications are:
/// - **immutable** (treat them as facts)
/// - **versioned** (schema evolution)
/// - delivered **at-least-once** (consumers must be idempotent)
pub trait Notification: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable notification name/type identifier (e.g. "events.event.cancelled").
    fn notification_type(&self) -> &'static str;

    /// Schema version for this notification type.
    fn version(&self) -> u32;

    /// When the notification occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
