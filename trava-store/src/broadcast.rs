use tokio::sync::broadcast;
use tracing::debug;

use trava_core::events::{NotificationSink, SearchEvent};

/// Notification sink backed by a tokio broadcast channel; the SSE layer
/// subscribes to the same channel. Publishing with no subscribers is
/// normal (poll-only clients) and not an error.
pub struct BroadcastSink {
    tx: broadcast::Sender<SearchEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.tx.subscribe()
    }

    pub fn sender(&self) -> broadcast::Sender<SearchEvent> {
        self.tx.clone()
    }
}

impl NotificationSink for BroadcastSink {
    fn publish(&self, event: SearchEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("no live subscribers for {}", e.0.name());
        }
    }
}
