//! Integration tests for the meeting start flow.
//!
//! Drives `MeetingStarter` end to end against the mock collaborators from
//! `room-test-utils`: settings resolution, server tag routing, the backend
//! retry loop, persistence and the room channel broadcast.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::types::RoleId;
use room_service::config::Config;
use room_service::errors::{BbbError, BbbErrorKind, RoomError};
use room_service::models::{FallbackMode, Room};
use room_service::repositories::RoutedPresentationStore;
use room_service::services::{
    MeetingStarted, MeetingStarter, SettingsFilter, StartRequest, TopicBroadcaster,
    MAX_START_ATTEMPTS,
};
use room_test_utils::{
    acting_user, config_with_tags, meeting_info, EventLog, MockMeetingBackend,
    MockRoomRepository, MockSettingsGateway, RecordedEvent, RecordingNotifier, TestRoom,
    TEST_BASE_URL, TEST_PROVIDER,
};

const CREATE_TIME: &str = "1700000000000";

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    settings: Arc<MockSettingsGateway>,
    backend: Arc<MockMeetingBackend>,
    log: EventLog,
    starter: MeetingStarter,
}

impl Harness {
    fn new(settings: MockSettingsGateway, backend: MockMeetingBackend) -> Self {
        Self::with_config(&Config::default(), settings, backend)
    }

    fn with_config(
        config: &Config,
        settings: MockSettingsGateway,
        backend: MockMeetingBackend,
    ) -> Self {
        let log = EventLog::new();
        Self::assemble(
            config,
            settings,
            backend,
            MockRoomRepository::new(log.clone()),
            log,
        )
    }

    fn with_failing_repository(settings: MockSettingsGateway, backend: MockMeetingBackend) -> Self {
        let log = EventLog::new();
        Self::assemble(
            &Config::default(),
            settings,
            backend,
            MockRoomRepository::failing(log.clone(), "rooms table locked"),
            log,
        )
    }

    fn assemble(
        config: &Config,
        settings: MockSettingsGateway,
        backend: MockMeetingBackend,
        rooms: MockRoomRepository,
        log: EventLog,
    ) -> Self {
        let settings = Arc::new(settings);
        let backend = Arc::new(backend);
        let starter = MeetingStarter::new(
            config,
            settings.clone(),
            backend.clone(),
            Arc::new(rooms),
            Arc::new(RecordingNotifier::new(log.clone())),
            Arc::new(RoutedPresentationStore),
        );

        Self {
            settings,
            backend,
            log,
            starter,
        }
    }

    async fn start(&self, room: &mut Room) -> Result<MeetingStarted, RoomError> {
        self.starter
            .start(StartRequest {
                room,
                base_url: TEST_BASE_URL,
                current_user: None,
                provider: TEST_PROVIDER,
            })
            .await
    }
}

fn transient(message: &str) -> BbbError {
    BbbError::new("internalError", message)
}

// ============================================================================
// Retry behavior
// ============================================================================

#[tokio::test]
async fn test_succeeds_on_first_attempt() {
    let harness = Harness::new(
        MockSettingsGateway::empty(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().build();

    let started = harness.start(&mut room).await.unwrap();

    assert_eq!(started.attempts, 1);
    assert_eq!(started.meeting, meeting_info(CREATE_TIME));
    assert_eq!(harness.backend.call_count(), 1);
}

#[tokio::test]
async fn test_retries_transient_failures_with_identical_options() -> anyhow::Result<()> {
    let harness = Harness::new(
        MockSettingsGateway::builder().setting("record", "true").build(),
        MockMeetingBackend::with_responses(vec![
            Err(transient("first")),
            Err(transient("second")),
            Ok(meeting_info(CREATE_TIME)),
        ]),
    );
    let mut room = TestRoom::random().build();

    let started = harness.start(&mut room).await?;

    assert_eq!(started.attempts, 3);
    assert_eq!(harness.backend.call_count(), 3);

    // Settings are resolved once per start, not once per attempt
    assert_eq!(harness.settings.call_count(), 2);

    let calls = harness.backend.calls();
    assert!(calls.iter().all(|call| call == &calls[0]));
    assert_eq!(calls[0].params.get("record").map(String::as_str), Some("true"));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_id_is_not_retried() {
    let harness = Harness::new(
        MockSettingsGateway::empty(),
        MockMeetingBackend::failing(BbbError::duplicate_id("A meeting already exists")),
    );
    let mut room = TestRoom::random().build();

    let err = harness.start(&mut room).await.unwrap_err();

    assert_eq!(harness.backend.call_count(), 1);
    match err {
        RoomError::Bbb(e) => {
            assert_eq!(e.kind, BbbErrorKind::DuplicateIdentifier);
            assert_eq!(e.message, "A meeting already exists");
        }
        other => panic!("expected backend error, got {other:?}"),
    }
    assert!(!room.online);
    assert!(harness.log.events().is_empty());
}

#[tokio::test]
async fn test_duplicate_id_after_transient_failure_stops_retrying() {
    let harness = Harness::new(
        MockSettingsGateway::empty(),
        MockMeetingBackend::with_responses(vec![
            Err(transient("flaky")),
            Err(BbbError::duplicate_id("taken")),
            Ok(meeting_info(CREATE_TIME)),
        ]),
    );
    let mut room = TestRoom::random().build();

    let err = harness.start(&mut room).await.unwrap_err();

    assert_eq!(harness.backend.call_count(), 2);
    assert_eq!(err.error_type(), "bbb_duplicate_id");
}

#[tokio::test]
async fn test_gives_up_after_max_attempts_with_last_error() {
    let harness = Harness::new(
        MockSettingsGateway::empty(),
        MockMeetingBackend::with_responses(vec![
            Err(transient("one")),
            Err(transient("two")),
            Err(transient("three")),
            Ok(meeting_info(CREATE_TIME)),
        ]),
    );
    let mut room = TestRoom::random().build();

    let err = harness.start(&mut room).await.unwrap_err();

    assert_eq!(harness.backend.call_count(), MAX_START_ATTEMPTS);
    match err {
        RoomError::Bbb(e) => assert_eq!(e, transient("three")),
        other => panic!("expected backend error, got {other:?}"),
    }
    assert!(!room.online);
    assert!(room.last_session.is_none());
    assert!(harness.log.broadcasts().is_empty());
}

// ============================================================================
// Persistence and notification
// ============================================================================

#[tokio::test]
async fn test_persists_then_broadcasts() {
    let harness = Harness::new(
        MockSettingsGateway::empty(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::new("abc-def-ghi").build();
    let expected = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();

    let started = harness.start(&mut room).await.unwrap();

    assert_eq!(started.last_session, expected);
    assert!(room.online);
    assert_eq!(room.last_session, Some(expected));
    assert_eq!(
        harness.log.events(),
        vec![
            RecordedEvent::StatusUpdated {
                room_id: room.id,
                online: true,
                last_session: expected,
            },
            RecordedEvent::Broadcast {
                topic: "abc-def-ghi_rooms_channel".to_string(),
                message: "started".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_persistence_failure_skips_broadcast() {
    let harness = Harness::with_failing_repository(
        MockSettingsGateway::empty(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().build();

    let err = harness.start(&mut room).await.unwrap_err();

    assert!(matches!(err, RoomError::Persistence(msg) if msg == "rooms table locked"));
    assert_eq!(harness.backend.call_count(), 1);
    assert!(harness.log.events().is_empty());
    assert!(!room.online);
}

#[tokio::test]
async fn test_invalid_create_time_is_not_persisted() {
    let harness = Harness::new(
        MockSettingsGateway::empty(),
        MockMeetingBackend::succeeding("not-a-number"),
    );
    let mut room = TestRoom::random().build();

    let err = harness.start(&mut room).await.unwrap_err();

    assert!(matches!(err, RoomError::InvalidCreateTime(_)));
    assert_eq!(harness.backend.call_count(), 1);
    assert!(harness.log.events().is_empty());
}

#[tokio::test]
async fn test_settings_failure_never_reaches_backend() {
    let harness = Harness::new(
        MockSettingsGateway::failing("settings store down"),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().build();

    let err = harness.start(&mut room).await.unwrap_err();

    assert!(matches!(err, RoomError::Settings(_)));
    assert_eq!(harness.backend.call_count(), 0);
    assert!(harness.log.events().is_empty());
}

#[tokio::test]
async fn test_topic_broadcaster_delivers_to_subscribers() {
    let settings = Arc::new(MockSettingsGateway::empty());
    let backend = Arc::new(MockMeetingBackend::succeeding(CREATE_TIME));
    let broadcaster = Arc::new(TopicBroadcaster::new());
    let starter = MeetingStarter::new(
        &Config::default(),
        settings,
        backend,
        Arc::new(MockRoomRepository::new(EventLog::new())),
        broadcaster.clone(),
        Arc::new(RoutedPresentationStore),
    );
    let mut room = TestRoom::new("abc-def-ghi").build();
    let mut receiver = broadcaster.subscribe(&room.channel_topic());

    starter
        .start(StartRequest {
            room: &mut room,
            base_url: TEST_BASE_URL,
            current_user: None,
            provider: TEST_PROVIDER,
        })
        .await
        .unwrap();

    assert_eq!(receiver.recv().await.unwrap(), "started");
}

// ============================================================================
// Settings lookup
// ============================================================================

#[tokio::test]
async fn test_settings_resolved_with_owner_provider() {
    let harness = Harness::new(
        MockSettingsGateway::empty(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().with_owner_provider("tenant-a").build();
    let user = acting_user(Some("en"));

    harness
        .starter
        .start(StartRequest {
            room: &mut room,
            base_url: TEST_BASE_URL,
            current_user: Some(&user),
            provider: "tenant-b",
        })
        .await
        .unwrap();

    let queries = harness.settings.queries();
    assert_eq!(queries.len(), 2);
    assert!(queries.iter().all(|q| q.provider == "tenant-a" && q.has_user));
    assert_eq!(queries[0].filter, SettingsFilter::BbbOptions);
    assert_eq!(queries[1].filter, SettingsFilter::viewer_access_code());

    // The backend call itself goes to the requesting provider
    assert_eq!(harness.backend.last_call().unwrap().provider, "tenant-b");
}

// ============================================================================
// Computed options
// ============================================================================

#[tokio::test]
async fn test_computed_options_sent_to_backend() {
    let harness = Harness::new(
        MockSettingsGateway::builder()
            .setting("logoutURL", "https://elsewhere.example.com")
            .build(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::new("abc-def-ghi").with_name("Standup").build();

    harness.start(&mut room).await.unwrap();

    let params = harness.backend.last_call().unwrap().params;
    let join_url = "https://gl.example.com/rooms/abc-def-ghi/join";
    assert_eq!(params["loginURL"], join_url);
    assert_eq!(params["logoutURL"], join_url);
    assert_eq!(params["meta_endCallbackUrl"], "https://gl.example.com/meeting_ended");
    assert_eq!(
        params["meta_bbb-recording-ready-url"],
        "https://gl.example.com/recording_ready"
    );
    assert_eq!(params["meta_bbb-origin"], "greenlight");
    assert_eq!(params["meta_bbb-origin-server-name"], "gl.example.com");
    assert_eq!(params["meta_bbb-origin-version"], "v3");
    assert_eq!(params["meta_bbb-context-name"], "Standup");
    assert_eq!(params["meta_bbb-context-id"], "abc-def-ghi");
    assert_eq!(
        params["moderatorOnlyMessage"],
        format!("To invite someone to the meeting, send them this link:<br>{join_url}")
    );
}

#[tokio::test]
async fn test_access_code_added_to_moderator_message() {
    let harness = Harness::new(
        MockSettingsGateway::builder().access_code("8472").build(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().build();

    harness.start(&mut room).await.unwrap();

    let params = harness.backend.last_call().unwrap().params;
    assert!(params["moderatorOnlyMessage"].ends_with("<br>Access Code: 8472"));
    assert!(!params.contains_key("glViewerAccessCode"));
}

#[tokio::test]
async fn test_blank_access_code_omitted() {
    let harness = Harness::new(
        MockSettingsGateway::builder().access_code("   ").build(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().build();

    harness.start(&mut room).await.unwrap();

    let params = harness.backend.last_call().unwrap().params;
    assert!(!params["moderatorOnlyMessage"].contains("Access Code"));
}

#[tokio::test]
async fn test_presentation_url_escaped() {
    let harness = Harness::new(
        MockSettingsGateway::empty(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().with_presentation("k3y", "Q&A.pdf").build();

    harness.start(&mut room).await.unwrap();

    assert_eq!(
        harness.backend.last_call().unwrap().presentation_url.as_deref(),
        Some("https://gl.example.com/presentations/k3y/Q%26A.pdf")
    );
}

#[tokio::test]
async fn test_presentation_filename_percent_encoded() {
    let harness = Harness::new(
        MockSettingsGateway::empty(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random()
        .with_presentation("k3y", "Q&A deck#1?.pdf")
        .build();

    harness.start(&mut room).await.unwrap();

    assert_eq!(
        harness.backend.last_call().unwrap().presentation_url.as_deref(),
        Some("https://gl.example.com/presentations/k3y/Q%26A%20deck%231%3F.pdf")
    );
}

#[tokio::test]
async fn test_no_presentation_sends_no_url() {
    let harness = Harness::new(
        MockSettingsGateway::empty(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().build();

    harness.start(&mut room).await.unwrap();

    assert!(harness.backend.last_call().unwrap().presentation_url.is_none());
}

// ============================================================================
// Server tag routing
// ============================================================================

#[tokio::test]
async fn test_required_server_tag_routed() {
    let harness = Harness::with_config(
        &config_with_tags(&["gpu"], None, FallbackMode::Unset),
        MockSettingsGateway::builder().server_tag("gpu", true).build(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().build();

    harness.start(&mut room).await.unwrap();

    let call = harness.backend.last_call().unwrap();
    assert_eq!(call.options.server_tag(), Some("gpu!"));
    assert_eq!(call.params["meta_server-tag"], "gpu!");
    assert!(!call.params.contains_key("serverTag"));
    assert!(!call.params.contains_key("serverTagRequired"));
}

#[tokio::test]
async fn test_fallback_mode_overrides_room_flag() {
    let harness = Harness::with_config(
        &config_with_tags(&["gpu"], None, FallbackMode::Desired),
        MockSettingsGateway::builder().server_tag("gpu", true).build(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().build();

    harness.start(&mut room).await.unwrap();

    assert_eq!(
        harness.backend.last_call().unwrap().params["meta_server-tag"],
        "gpu"
    );
}

#[tokio::test]
async fn test_restricted_tag_dropped_for_other_roles() {
    let allowed = RoleId::new();
    let config = config_with_tags(&["gpu"], Some(("gpu", &[allowed])), FallbackMode::Unset);

    let harness = Harness::with_config(
        &config,
        MockSettingsGateway::builder().server_tag("gpu", false).build(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().with_owner_role(RoleId::new()).build();

    harness.start(&mut room).await.unwrap();

    let call = harness.backend.last_call().unwrap();
    assert_eq!(call.options.server_tag(), None);
    assert!(!call.params.contains_key("meta_server-tag"));
    assert!(!call.params.contains_key("serverTag"));

    // The same tag is routed for the allowed role
    let harness = Harness::with_config(
        &config,
        MockSettingsGateway::builder().server_tag("gpu", false).build(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().with_owner_role(allowed).build();

    harness.start(&mut room).await.unwrap();

    assert_eq!(
        harness.backend.last_call().unwrap().params["meta_server-tag"],
        "gpu"
    );
}

#[tokio::test]
async fn test_unknown_tag_dropped() {
    let harness = Harness::with_config(
        &config_with_tags(&["gpu"], None, FallbackMode::Required),
        MockSettingsGateway::builder().server_tag("quantum", true).build(),
        MockMeetingBackend::succeeding(CREATE_TIME),
    );
    let mut room = TestRoom::random().build();

    harness.start(&mut room).await.unwrap();

    assert!(!harness
        .backend
        .last_call()
        .unwrap()
        .params
        .contains_key("meta_server-tag"));
}
