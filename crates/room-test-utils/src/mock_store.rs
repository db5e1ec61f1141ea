//! Mock room repository and notifier.
//!
//! Both mocks append to one shared [`EventLog`], so tests can assert that a
//! room was persisted as online before its channel was notified.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::types::RoomId;
use room_service::errors::RoomError;
use room_service::models::RoomStatusUpdate;
use room_service::repositories::RoomRepository;
use room_service::services::notifier::RoomNotifier;
use std::sync::{Arc, Mutex};

/// Side effect observed by a mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A room status update was persisted.
    StatusUpdated {
        room_id: RoomId,
        online: bool,
        last_session: DateTime<Utc>,
    },
    /// A message was broadcast.
    Broadcast { topic: String, message: String },
}

/// Ordered log shared between mocks.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&self, event: RecordedEvent) {
        self.events.lock().unwrap().push(event);
    }

    /// All events, in order.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Broadcast events only.
    pub fn broadcasts(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::Broadcast { topic, message } => Some((topic, message)),
                RecordedEvent::StatusUpdated { .. } => None,
            })
            .collect()
    }
}

/// Mock room repository.
#[derive(Debug)]
pub struct MockRoomRepository {
    log: EventLog,
    failure: Option<String>,
}

impl MockRoomRepository {
    /// Repository that accepts every update.
    #[must_use]
    pub fn new(log: EventLog) -> Self {
        Self { log, failure: None }
    }

    /// Repository that rejects every update.
    #[must_use]
    pub fn failing(log: EventLog, message: &str) -> Self {
        Self {
            log,
            failure: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl RoomRepository for MockRoomRepository {
    async fn update_status(
        &self,
        room_id: RoomId,
        update: RoomStatusUpdate,
    ) -> Result<(), RoomError> {
        if let Some(message) = &self.failure {
            return Err(RoomError::Persistence(message.clone()));
        }

        self.log.push(RecordedEvent::StatusUpdated {
            room_id,
            online: update.online,
            last_session: update.last_session,
        });
        Ok(())
    }
}

/// Notifier recording every broadcast.
#[derive(Debug)]
pub struct RecordingNotifier {
    log: EventLog,
}

impl RecordingNotifier {
    /// Create a notifier writing to `log`.
    #[must_use]
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl RoomNotifier for RecordingNotifier {
    fn broadcast(&self, topic: &str, message: &str) {
        self.log.push(RecordedEvent::Broadcast {
            topic: topic.to_string(),
            message: message.to_string(),
        });
    }
}
