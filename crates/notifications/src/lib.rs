//! Domain notification plumbing: trait, sink abstraction, in-memory sink.
//!
//! Notifications are **outputs** of domain operations. Entities append them to
//! a pending buffer; the orchestrating layer dispatches them to a sink after a
//! successful commit. Delivery is best-effort and at-least-once — a failed
//! publish must never fail the operation that produced the notification.

pub mod in_memory;
pub mod notification;
pub mod sink;

pub use in_memory::{InMemorySink, InMemorySinkError};
pub use notification::Notification;
pub use sink::{NotificationSink, Subscription};
