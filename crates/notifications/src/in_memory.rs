//! In-memory notification sink for tests/dev.

use std::sync::{Mutex, mpsc};

use crate::sink::{NotificationSink, Subscription};

#[derive(Debug)]
pub enum InMemorySinkError {
    /// Publish failed due to internal lock poisoning.
    Poisoned,
}

/// In-memory pub/sub sink.
///
/// - No IO / no async
/// - Best-effort fan-out
/// - At-least-once acceptable (subscribers must be idempotent)
#[derive(Debug)]
pub struct InMemorySink<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemorySink<M> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> Default for InMemorySink<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> NotificationSink<M> for InMemorySink<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemorySinkError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| InMemorySinkError::Poisoned)?;

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(message.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive messages until the process restarts.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fans_out_to_every_subscriber() {
        let sink: InMemorySink<u32> = InMemorySink::new();
        let a = sink.subscribe();
        let b = sink.subscribe();

        sink.publish(7).unwrap();

        assert_eq!(a.try_recv().unwrap(), 7);
        assert_eq!(b.try_recv().unwrap(), 7);
    }

    #[test]
    fn dropped_subscribers_do_not_block_publishing() {
        let sink: InMemorySink<u32> = InMemorySink::new();
        let kept = sink.subscribe();
        drop(sink.subscribe());

        sink.publish(1).unwrap();
        sink.publish(2).unwrap();

        assert_eq!(kept.try_recv().unwrap(), 1);
        assert_eq!(kept.try_recv().unwrap(), 2);
    }
}
