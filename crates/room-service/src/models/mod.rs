//! Room Service models.
//!
//! Contains data types used across the room service.

use chrono::{DateTime, Utc};
use common::types::{FriendlyId, RoleId, RoomId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Settings key holding the viewer access code.
pub const VIEWER_ACCESS_CODE_SETTING: &str = "glViewerAccessCode";

/// Settings key carrying the requested server tag.
pub const SERVER_TAG_SETTING: &str = "serverTag";

/// Settings key carrying whether the requested server tag is mandatory.
pub const SERVER_TAG_REQUIRED_SETTING: &str = "serverTagRequired";

/// A joinable conferencing room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    /// Internal room identifier.
    pub id: RoomId,

    /// Public identifier used in join links.
    pub friendly_id: FriendlyId,

    /// Display name.
    pub name: String,

    /// Owner of the room.
    pub owner: RoomOwner,

    /// Whether a session is currently running.
    pub online: bool,

    /// Start time of the most recent session.
    pub last_session: Option<DateTime<Utc>>,

    /// Presentation preloaded into new sessions, if one is attached.
    pub presentation: Option<Presentation>,
}

impl Room {
    /// Notification topic for subscribers of this room.
    pub fn channel_topic(&self) -> String {
        format!("{}_rooms_channel", self.friendly_id)
    }
}

/// The owning user of a room, as far as starting a session needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOwner {
    /// User identifier.
    pub id: UserId,

    /// Role of the owner (drives server tag eligibility).
    pub role_id: RoleId,

    /// Tenant the owner belongs to.
    pub provider: String,
}

/// The user asking for a session to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    /// User identifier.
    pub id: UserId,

    /// Role of the user.
    pub role_id: RoleId,

    /// Preferred locale (e.g. "en", "fr-CA").
    pub language: Option<String>,
}

/// A presentation file attached to a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    /// Storage key of the file.
    pub key: String,

    /// Original filename.
    pub filename: String,
}

/// Status fields written to the room store after a successful start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomStatusUpdate {
    /// Room is online.
    pub online: bool,

    /// Session start time reported by the backend.
    pub last_session: DateTime<Utc>,
}

/// Meeting metadata returned by the conferencing backend on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingInfo {
    /// Meeting identifier as known to the backend.
    #[serde(rename = "meetingID")]
    pub meeting_id: String,

    /// Backend-internal meeting identifier.
    #[serde(rename = "internalMeetingID", default)]
    pub internal_meeting_id: Option<String>,

    /// Creation time as epoch milliseconds, encoded as a numeric string.
    #[serde(rename = "createTime")]
    pub create_time: String,
}

/// Server tag override applied to every tag decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackMode {
    /// Use the per-room `serverTagRequired` setting.
    #[default]
    Unset,

    /// Every eligible tag is mandatory.
    Required,

    /// Every eligible tag is a preference only.
    Desired,
}

/// Operator-defined server tag catalog.
///
/// Loaded once from configuration and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerTagConfig {
    /// Tag name -> display name.
    pub names: HashMap<String, String>,

    /// Tag name -> roles allowed to use it. Tags absent here are open to
    /// every role.
    pub roles: HashMap<String, HashSet<RoleId>>,

    /// Global override for the required flag.
    pub fallback_mode: FallbackMode,
}

impl ServerTagConfig {
    /// Whether `role` may route sessions with `tag`.
    pub fn is_eligible(&self, tag: &str, role: &RoleId) -> bool {
        if !self.names.contains_key(tag) {
            return false;
        }

        match self.roles.get(tag) {
            Some(allowed) => allowed.contains(role),
            None => true,
        }
    }
}
