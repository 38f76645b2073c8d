//! Notification publishing/subscription abstraction (mechanics only).
//!
//! The sink is intentionally **lightweight** and makes minimal assumptions:
//!
//! - **Transport-agnostic**: works with in-memory channels, message brokers, webhooks, etc.
//! - **At-least-once delivery**: notifications may be delivered multiple times;
//!   consumers must be idempotent
//! - **Best-effort**: a failed publish is surfaced to the dispatching layer, which
//!   logs it and moves on — the domain operation that produced the notification
//!   has already committed and must not be rolled back
//! - **No persistence**: the sink distributes, it does not store; the persistence
//!   store remains the source of truth for entity state

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to a notification stream.
///
/// Each subscription gets a copy of every notification published to the sink
/// (broadcast semantics). Subscriptions are designed for single-threaded
/// consumption; distribute across threads with your own channel if needed.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next notification is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a notification without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a notification.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Domain-agnostic notification sink (pub/sub abstraction).
///
/// Sits downstream of the persistence store: entities record what happened,
/// the orchestration layer commits, then publishes. If publication fails the
/// notification is lost from the sink's perspective but the state change is
/// durable — consumers needing stronger guarantees should poll the store.
pub trait NotificationSink<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, S> NotificationSink<M> for Arc<S>
where
    S: NotificationSink<M> + ?Sized,
{
    type Error = S::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
