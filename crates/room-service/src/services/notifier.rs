//! Room notification channel.
//!
//! Browsers viewing a room subscribe to the room's topic and reload their
//! state when the session starts. Broadcasts are fire-and-forget: a topic
//! without subscribers simply drops the message.

use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Message sent when a room's session has started.
pub const STARTED_MESSAGE: &str = "started";

/// Buffered messages per topic before slow subscribers start lagging.
const TOPIC_CAPACITY: usize = 16;

/// Trait for room broadcasts (enables mocking).
pub trait RoomNotifier: Send + Sync {
    /// Broadcast `message` to every subscriber of `topic`.
    fn broadcast(&self, topic: &str, message: &str);
}

/// In-process topic broadcaster backed by `tokio::sync::broadcast`.
#[derive(Debug, Default)]
pub struct TopicBroadcaster {
    topics: Mutex<HashMap<String, broadcast::Sender<String>>>,
}

impl TopicBroadcaster {
    /// Create a broadcaster with no topics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `topic`, creating it if needed.
    ///
    /// Topics whose subscribers have all gone are dropped here as well as on
    /// broadcast, so the map only holds topics with live receivers.
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<String> {
        let mut topics = match self.topics.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        topics.retain(|_, sender| sender.receiver_count() > 0);

        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }
}

impl RoomNotifier for TopicBroadcaster {
    fn broadcast(&self, topic: &str, message: &str) {
        let mut topics = match self.topics.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let Some(sender) = topics.get(topic) else {
            tracing::trace!(target: "rooms.service.notifier", topic = %topic, "No subscribers for topic");
            return;
        };

        // Err means every receiver is gone
        if sender.send(message.to_string()).is_err() {
            topics.remove(topic);
            tracing::trace!(target: "rooms.service.notifier", topic = %topic, "Pruned topic without subscribers");
        }
    }
}
