//! Meeting start orchestration.
//!
//! # Flow
//!
//! 1. Resolve the room's backend settings and its viewer access code
//! 2. Apply the server tag policy to the settings
//! 3. Merge the computed options (join links, callbacks, metadata)
//! 4. Call the conferencing backend, retrying transient failures
//!    (max 3 attempts, no delay, duplicate meeting IDs are never retried)
//! 5. Persist the room as online with the backend's create time
//! 6. Broadcast `started` on the room's channel
//!
//! Settings and options are built once; every attempt sends the same request.
//! No lock is taken per room: two concurrent starts for the same room both
//! reach the backend, and callers needing at-most-one must serialize them.

use crate::config::Config;
use crate::errors::{BbbError, RoomError};
use crate::models::{ActingUser, MeetingInfo, Room, RoomStatusUpdate};
use crate::observability::metrics;
use crate::repositories::{PresentationStore, RoomRepository};
use crate::services::bbb_client::{MeetingBackend, StartMeetingRequest};
use crate::services::meeting_options::{escape_presentation_url, OptionBuilder, StartOptions};
use crate::services::notifier::{RoomNotifier, STARTED_MESSAGE};
use crate::services::server_tag::ServerTagPolicy;
use crate::services::settings::{viewer_access_code, SettingsFilter, SettingsGateway, SettingsQuery};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Maximum number of backend create calls per start.
pub const MAX_START_ATTEMPTS: usize = 3;

/// A request to start a room's session.
#[derive(Debug)]
pub struct StartRequest<'a> {
    /// Room to start; its status fields are updated on success.
    pub room: &'a mut Room,

    /// Public base URL the request arrived on.
    pub base_url: &'a str,

    /// User asking for the start, if signed in.
    pub current_user: Option<&'a ActingUser>,

    /// Tenant whose backend hosts the session.
    pub provider: &'a str,
}

/// Result of a successful start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingStarted {
    /// Meeting metadata returned by the backend.
    pub meeting: MeetingInfo,

    /// Session start time written to the room.
    pub last_session: DateTime<Utc>,

    /// Backend calls made, including the successful one.
    pub attempts: usize,
}

/// Starts room sessions.
pub struct MeetingStarter {
    settings: Arc<dyn SettingsGateway>,
    backend: Arc<dyn MeetingBackend>,
    rooms: Arc<dyn RoomRepository>,
    notifier: Arc<dyn RoomNotifier>,
    presentations: Arc<dyn PresentationStore>,
    server_tags: ServerTagPolicy,
    options: OptionBuilder,
}

impl MeetingStarter {
    /// Create a starter over the given collaborators.
    pub fn new(
        config: &Config,
        settings: Arc<dyn SettingsGateway>,
        backend: Arc<dyn MeetingBackend>,
        rooms: Arc<dyn RoomRepository>,
        notifier: Arc<dyn RoomNotifier>,
        presentations: Arc<dyn PresentationStore>,
    ) -> Self {
        Self {
            settings,
            backend,
            rooms,
            notifier,
            presentations,
            server_tags: ServerTagPolicy::new(config.server_tags.clone()),
            options: OptionBuilder::new(config),
        }
    }

    /// Start the session of `request.room`.
    ///
    /// # Errors
    ///
    /// - `RoomError::Settings` - a settings lookup failed (not retried)
    /// - `RoomError::Bbb` - the backend failed; a duplicate meeting ID fails
    ///   on the first attempt, any other failure after the last attempt
    /// - `RoomError::InvalidCreateTime` - the backend's create time is not
    ///   epoch milliseconds
    /// - `RoomError::Persistence` - the room status update failed; nothing is
    ///   broadcast
    pub async fn start(&self, request: StartRequest<'_>) -> Result<MeetingStarted, RoomError> {
        let started_at = Instant::now();

        let result = self.run(request).await;

        let status = match &result {
            Ok(_) => "success",
            Err(e) => e.error_type(),
        };
        metrics::record_meeting_start(status, started_at.elapsed());

        result
    }

    #[instrument(skip_all, fields(room_id = %request.room.id, friendly_id = %request.room.friendly_id, provider = %request.provider))]
    async fn run(&self, request: StartRequest<'_>) -> Result<MeetingStarted, RoomError> {
        let StartRequest {
            room,
            base_url,
            current_user,
            provider,
        } = request;

        // Step 1: Resolve settings for the owner's provider
        let bbb_filter = SettingsFilter::BbbOptions;
        let settings = self
            .settings
            .resolve(SettingsQuery {
                room_id: room.id,
                provider: &room.owner.provider,
                current_user,
                filter: &bbb_filter,
            })
            .await?;

        let code_filter = SettingsFilter::viewer_access_code();
        let code_settings = self
            .settings
            .resolve(SettingsQuery {
                room_id: room.id,
                provider: &room.owner.provider,
                current_user,
                filter: &code_filter,
            })
            .await?;
        let access_code = viewer_access_code(&code_settings);

        // Step 2: Server tag routing
        let mut options = StartOptions::from_settings(settings);
        let decision = self.server_tags.apply(&mut options, room);
        metrics::record_server_tag(decision.outcome());

        // Step 3: Computed options win over settings
        options.merge_computed(
            self.options
                .build(room, base_url, current_user, &access_code),
        );

        let presentation_url = room
            .presentation
            .as_ref()
            .and_then(|presentation| self.presentations.url_for(presentation, base_url))
            .map(|url| escape_presentation_url(&url));

        tracing::debug!(
            target: "rooms.service.meeting_starter",
            server_tag = ?options.server_tag(),
            server_tag_outcome = decision.outcome(),
            has_presentation = presentation_url.is_some(),
            "Built meeting options"
        );

        // Step 4: Backend call with retry
        let (meeting, attempts) = self
            .start_with_retry(StartMeetingRequest {
                provider,
                room: &*room,
                options: &options,
                presentation_url: presentation_url.as_deref(),
            })
            .await?;

        // Step 5: Persist, then update the in-memory room
        let last_session = parse_create_time(&meeting.create_time)?;
        self.rooms
            .update_status(
                room.id,
                RoomStatusUpdate {
                    online: true,
                    last_session,
                },
            )
            .await?;
        room.online = true;
        room.last_session = Some(last_session);

        // Step 6: Tell the room's subscribers
        self.notifier
            .broadcast(&room.channel_topic(), STARTED_MESSAGE);

        tracing::info!(
            target: "rooms.service.meeting_starter",
            room_id = %room.id,
            meeting_id = %meeting.meeting_id,
            attempts = attempts,
            last_session = %last_session,
            "Meeting started"
        );

        Ok(MeetingStarted {
            meeting,
            last_session,
            attempts,
        })
    }

    /// Call the backend until it succeeds, fails deterministically, or the
    /// attempt budget is spent. The last failure is returned unchanged.
    async fn start_with_retry(
        &self,
        request: StartMeetingRequest<'_>,
    ) -> Result<(MeetingInfo, usize), BbbError> {
        let mut retries = 0;

        loop {
            let attempt = retries + 1;

            tracing::debug!(
                target: "rooms.service.meeting_starter",
                room_id = %request.room.id,
                attempt = attempt,
                "Calling conferencing backend"
            );

            match self.backend.start_meeting(request).await {
                Ok(meeting) => {
                    metrics::record_start_attempt("success");
                    return Ok((meeting, attempt));
                }
                Err(e) if !e.is_retryable() => {
                    metrics::record_start_attempt("duplicate_id");
                    tracing::warn!(
                        target: "rooms.service.meeting_starter",
                        room_id = %request.room.id,
                        error = %e,
                        attempt = attempt,
                        "Backend rejected duplicate meeting ID, not retrying"
                    );
                    return Err(e);
                }
                Err(e) => {
                    metrics::record_start_attempt("retryable_error");
                    retries += 1;

                    if retries >= MAX_START_ATTEMPTS {
                        tracing::error!(
                            target: "rooms.service.meeting_starter",
                            room_id = %request.room.id,
                            error = %e,
                            "Failed to start meeting after {} attempts",
                            MAX_START_ATTEMPTS
                        );
                        return Err(e);
                    }

                    tracing::warn!(
                        target: "rooms.service.meeting_starter",
                        room_id = %request.room.id,
                        error = %e,
                        attempt = attempt,
                        "Backend start failed, will retry"
                    );
                }
            }
        }
    }
}

/// Parse the backend's create time (epoch milliseconds as a string).
fn parse_create_time(raw: &str) -> Result<DateTime<Utc>, RoomError> {
    let millis: i64 = raw.trim().parse().map_err(|e| {
        RoomError::InvalidCreateTime(format!("'{}' is not epoch milliseconds: {}", raw, e))
    })?;

    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| RoomError::InvalidCreateTime(format!("'{}' is out of range", raw)))
}
