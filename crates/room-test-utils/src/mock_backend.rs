//! Mock conferencing backend.
//!
//! Plays back a scripted sequence of responses, one per call. Once the
//! script is exhausted the last response repeats. Every call is recorded
//! with the flattened parameters it received.

use async_trait::async_trait;
use common::types::RoomId;
use room_service::errors::BbbError;
use room_service::models::MeetingInfo;
use room_service::services::bbb_client::{MeetingBackend, StartMeetingRequest};
use room_service::services::meeting_options::StartOptions;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A recorded create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStart {
    /// Provider passed to the backend.
    pub provider: String,
    /// Room being started.
    pub room_id: RoomId,
    /// Typed options as received.
    pub options: StartOptions,
    /// Options flattened to backend parameters.
    pub params: BTreeMap<String, String>,
    /// Presentation URL as received.
    pub presentation_url: Option<String>,
}

/// Mock conferencing backend.
#[derive(Debug)]
pub struct MockMeetingBackend {
    responses: Vec<Result<MeetingInfo, BbbError>>,
    call_count: AtomicUsize,
    calls: Mutex<Vec<RecordedStart>>,
}

impl MockMeetingBackend {
    /// Backend that always succeeds with `create_time`.
    #[must_use]
    pub fn succeeding(create_time: &str) -> Self {
        Self::with_responses(vec![Ok(crate::fixtures::meeting_info(create_time))])
    }

    /// Backend that always fails with `error`.
    #[must_use]
    pub fn failing(error: BbbError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    /// Backend returning `responses` in order.
    #[must_use]
    pub fn with_responses(responses: Vec<Result<MeetingInfo, BbbError>>) -> Self {
        Self {
            responses,
            call_count: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of calls made.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Recorded calls, in call order.
    pub fn calls(&self) -> Vec<RecordedStart> {
        self.calls.lock().unwrap().clone()
    }

    /// The most recent call.
    pub fn last_call(&self) -> Option<RecordedStart> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl MeetingBackend for MockMeetingBackend {
    async fn start_meeting(&self, request: StartMeetingRequest<'_>) -> Result<MeetingInfo, BbbError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);

        self.calls.lock().unwrap().push(RecordedStart {
            provider: request.provider.to_string(),
            room_id: request.room.id,
            options: request.options.clone(),
            params: request
                .options
                .to_params()
                .expect("start options should serialize"),
            presentation_url: request.presentation_url.map(str::to_string),
        });

        let idx = count.min(self.responses.len().saturating_sub(1));
        match self.responses.get(idx) {
            Some(response) => response.clone(),
            None => Ok(crate::fixtures::meeting_info("1700000000000")),
        }
    }
}
