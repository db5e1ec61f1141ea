//! Pre-configured test data fixtures.
//!
//! Provides builders and test data for:
//! - Rooms with owners, roles and presentations
//! - Acting users with locales
//! - Server tag configurations
//! - Backend create responses

use common::types::{FriendlyId, RoleId, RoomId, UserId};
use room_service::config::Config;
use room_service::models::{
    ActingUser, FallbackMode, MeetingInfo, Presentation, Room, RoomOwner, ServerTagConfig,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Base URL used by fixtures.
pub const TEST_BASE_URL: &str = "https://gl.example.com";

/// Provider used by fixtures.
pub const TEST_PROVIDER: &str = "greenroom";

/// Test room fixture.
#[derive(Debug, Clone)]
pub struct TestRoom {
    room: Room,
}

impl TestRoom {
    /// Create a test room with the given friendly ID.
    #[must_use]
    pub fn new(friendly_id: &str) -> Self {
        Self {
            room: Room {
                id: RoomId::new(),
                friendly_id: FriendlyId::from(friendly_id),
                name: "Test Room".to_string(),
                owner: RoomOwner {
                    id: UserId::new(),
                    role_id: RoleId::new(),
                    provider: TEST_PROVIDER.to_string(),
                },
                online: false,
                last_session: None,
                presentation: None,
            },
        }
    }

    /// Create a test room with a random friendly ID.
    #[must_use]
    pub fn random() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self::new(&format!("room-{}", suffix.get(..8).unwrap_or("00000000")))
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.room.name = name.to_string();
        self
    }

    /// Set the owner's role.
    #[must_use]
    pub fn with_owner_role(mut self, role_id: RoleId) -> Self {
        self.room.owner.role_id = role_id;
        self
    }

    /// Set the owner's provider.
    #[must_use]
    pub fn with_owner_provider(mut self, provider: &str) -> Self {
        self.room.owner.provider = provider.to_string();
        self
    }

    /// Attach a presentation.
    #[must_use]
    pub fn with_presentation(mut self, key: &str, filename: &str) -> Self {
        self.room.presentation = Some(Presentation {
            key: key.to_string(),
            filename: filename.to_string(),
        });
        self
    }

    /// Build the room.
    #[must_use]
    pub fn build(self) -> Room {
        self.room
    }
}

/// Acting user with the given locale.
#[must_use]
pub fn acting_user(language: Option<&str>) -> ActingUser {
    ActingUser {
        id: UserId::new(),
        role_id: RoleId::new(),
        language: language.map(str::to_string),
    }
}

/// Backend create response with `create_time`.
#[must_use]
pub fn meeting_info(create_time: &str) -> MeetingInfo {
    MeetingInfo {
        meeting_id: format!("meeting-{}", create_time),
        internal_meeting_id: Some(format!("internal-{}", create_time)),
        create_time: create_time.to_string(),
    }
}

/// Config with a tag catalog of `tags`, optionally restricting `restricted`
/// to `roles`.
#[must_use]
pub fn config_with_tags(
    tags: &[&str],
    restricted: Option<(&str, &[RoleId])>,
    fallback_mode: FallbackMode,
) -> Config {
    let names: HashMap<String, String> = tags
        .iter()
        .map(|tag| (tag.to_string(), format!("{} servers", tag)))
        .collect();

    let mut roles = HashMap::new();
    if let Some((tag, allowed)) = restricted {
        roles.insert(
            tag.to_string(),
            allowed.iter().copied().collect::<HashSet<RoleId>>(),
        );
    }

    Config {
        server_tags: ServerTagConfig {
            names,
            roles,
            fallback_mode,
        },
        ..Config::default()
    }
}
