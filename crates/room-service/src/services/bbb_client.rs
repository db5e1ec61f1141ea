//! Conferencing backend client interface.
//!
//! The backend's wire protocol (checksummed create calls, XML responses) is
//! implemented elsewhere. This module defines the seam the start flow calls
//! through and the shape of its successful response.
//!
//! Options cross this seam as a typed [`StartOptions`]; implementations
//! flatten them with [`StartOptions::to_params`] when they build the request.

use crate::errors::BbbError;
use crate::models::{MeetingInfo, Room};
use crate::services::meeting_options::StartOptions;
use async_trait::async_trait;

/// A create-meeting request for one room.
#[derive(Debug, Clone, Copy)]
pub struct StartMeetingRequest<'a> {
    /// Tenant whose backend should host the meeting.
    pub provider: &'a str,

    /// Room being started.
    pub room: &'a Room,

    /// Final option set.
    pub options: &'a StartOptions,

    /// Presentation to preload, already escaped for the backend.
    pub presentation_url: Option<&'a str>,
}

/// Trait for conferencing backend operations (enables mocking).
#[async_trait]
pub trait MeetingBackend: Send + Sync {
    /// Create (or join the existing) meeting for a room.
    ///
    /// # Errors
    ///
    /// Returns a classified [`BbbError`]; a duplicate meeting identifier is
    /// reported as `BbbErrorKind::DuplicateIdentifier`.
    async fn start_meeting(&self, request: StartMeetingRequest<'_>) -> Result<MeetingInfo, BbbError>;
}
