//! Server tag routing policy.
//!
//! Rooms may ask for their sessions to run on a tagged pool of backend
//! servers through the `serverTag` / `serverTagRequired` settings. Those raw
//! settings are never forwarded. The policy replaces them with a single
//! `meta_server-tag` routing field when the tag is known and the room owner's
//! role may use it, and drops them silently otherwise.
//!
//! A trailing `!` on the routing field makes the tag mandatory: the backend
//! refuses to start the session when no server carries the tag, instead of
//! falling back to an untagged server.

use crate::models::{
    FallbackMode, Room, ServerTagConfig, SERVER_TAG_REQUIRED_SETTING, SERVER_TAG_SETTING,
};
use crate::services::meeting_options::StartOptions;

/// Suffix marking a tag as mandatory.
pub const REQUIRED_SUFFIX: char = '!';

/// What the policy did with a start's options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerTagDecision {
    /// No tag was requested.
    NotRequested,

    /// The routing field was set.
    Applied {
        /// Requested tag.
        tag: String,
        /// Whether the tag is mandatory.
        required: bool,
    },

    /// The tag is unknown or not allowed for the owner's role.
    Dropped {
        /// Requested tag.
        tag: String,
    },
}

impl ServerTagDecision {
    /// Bounded label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ServerTagDecision::NotRequested => "none",
            ServerTagDecision::Applied { required: true, .. } => "required",
            ServerTagDecision::Applied { required: false, .. } => "desired",
            ServerTagDecision::Dropped { .. } => "dropped",
        }
    }
}

/// Applies the operator's server tag catalog to start options.
#[derive(Debug, Clone, Default)]
pub struct ServerTagPolicy {
    config: ServerTagConfig,
}

impl ServerTagPolicy {
    /// Create a policy over a read-only tag catalog.
    pub fn new(config: ServerTagConfig) -> Self {
        Self { config }
    }

    /// Replace the raw tag settings in `options` with the routing field.
    ///
    /// Applying the policy to its own output changes nothing: the raw
    /// settings are always gone after the first pass.
    pub fn apply(&self, options: &mut StartOptions, room: &Room) -> ServerTagDecision {
        let settings = options.settings_mut();
        let tag = settings.remove(SERVER_TAG_SETTING);
        let per_room_required = settings.remove(SERVER_TAG_REQUIRED_SETTING);

        let tag = match tag {
            Some(tag) if !tag.trim().is_empty() => tag,
            _ => return ServerTagDecision::NotRequested,
        };

        let required = match self.config.fallback_mode {
            FallbackMode::Required => true,
            FallbackMode::Desired => false,
            FallbackMode::Unset => per_room_required.as_deref() == Some("true"),
        };

        if !self.config.is_eligible(&tag, &room.owner.role_id) {
            tracing::debug!(
                target: "rooms.service.server_tag",
                room_id = %room.id,
                tag = %tag,
                "Server tag unknown or not allowed for owner role, dropping"
            );
            return ServerTagDecision::Dropped { tag };
        }

        let routing = if required {
            format!("{}{}", tag, REQUIRED_SUFFIX)
        } else {
            tag.clone()
        };
        options.set_server_tag(routing);

        ServerTagDecision::Applied { tag, required }
    }
}
