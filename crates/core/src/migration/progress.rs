//! Progress events published while a run saves records.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event name every progress message carries.
pub const PROGRESS_EVENT: &str = "progress";

/// One record saved out of `total` for the current entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Always [`PROGRESS_EVENT`].
    pub event: String,
    /// Human readable step, e.g. `Saving Invoices`.
    pub message: String,
    /// Records handled so far, starting at 1.
    pub count: usize,
    /// Records of this entity.
    pub total: usize,
}

impl ProgressEvent {
    /// Event for saving record `count` of `total` of `label`.
    #[must_use]
    pub fn saving(label: &str, count: usize, total: usize) -> Self {
        Self {
            event: PROGRESS_EVENT.to_string(),
            message: format!("Saving {label}"),
            count,
            total,
        }
    }
}

/// Receives progress events.
pub trait ProgressSink: Send + Sync {
    /// Publishes one event. Must not block.
    fn publish(&self, event: ProgressEvent);
}

/// Fans events out to every subscriber; events published without
/// subscribers are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastProgress {
    sender: broadcast::Sender<ProgressEvent>,
}

impl BroadcastProgress {
    /// Creates a channel buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastProgress {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl ProgressSink for BroadcastProgress {
    fn publish(&self, event: ProgressEvent) {
        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn publish(&self, _event: ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let event = ProgressEvent::saving("Credit Memos", 3, 10);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event": "progress",
                "message": "Saving Credit Memos",
                "count": 3,
                "total": 10
            })
        );
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let progress = BroadcastProgress::new(8);
        progress.publish(ProgressEvent::saving("Accounts", 1, 2));

        let mut receiver = progress.subscribe();
        progress.publish(ProgressEvent::saving("Accounts", 2, 2));
        let event = receiver.recv().await.unwrap();
        assert_eq!(event.count, 2);
    }
}
