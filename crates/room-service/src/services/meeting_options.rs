//! Session-start options.
//!
//! [`StartOptions`] is assembled in three layers, each overriding the one
//! before it on key collision:
//!
//! 1. room settings returned by the settings lookup
//! 2. the routing field written by the server tag policy
//! 3. [`ComputedOptions`] derived by [`OptionBuilder`]
//!
//! The layers stay typed until [`StartOptions::to_params`] flattens them into
//! the backend's key/value form.

use crate::config::Config;
use crate::locales::MessageCatalog;
use crate::models::{ActingUser, Room};
use crate::routes::RoomRoutes;
use crate::services::settings::RoomSettings;
use common::secret::{non_blank, SecretString};
use serde::Serialize;
use std::collections::BTreeMap;

/// Backend parameter carrying the routing tag.
pub const SERVER_TAG_PARAM: &str = "meta_server-tag";

/// Origin reported to the backend.
pub const ORIGIN: &str = "greenlight";

/// Options computed for every start, in backend parameter naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputedOptions {
    #[serde(rename = "moderatorOnlyMessage")]
    pub moderator_only_message: String,

    #[serde(rename = "loginURL")]
    pub login_url: String,

    #[serde(rename = "logoutURL")]
    pub logout_url: String,

    #[serde(rename = "meta_endCallbackUrl")]
    pub end_callback_url: String,

    #[serde(rename = "meta_bbb-recording-ready-url")]
    pub recording_ready_url: String,

    #[serde(rename = "meta_bbb-origin")]
    pub origin: String,

    #[serde(
        rename = "meta_bbb-origin-server-name",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin_server_name: Option<String>,

    #[serde(rename = "meta_bbb-origin-version")]
    pub origin_version: String,

    #[serde(rename = "meta_bbb-context-name")]
    pub context_name: String,

    #[serde(rename = "meta_bbb-context-id")]
    pub context_id: String,
}

/// Full option set for one start request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    settings: RoomSettings,
    server_tag: Option<String>,
    computed: Option<ComputedOptions>,
}

impl StartOptions {
    /// Start from the room's backend settings.
    pub fn from_settings(settings: RoomSettings) -> Self {
        Self {
            settings,
            server_tag: None,
            computed: None,
        }
    }

    /// Pass-through room settings.
    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub(crate) fn settings_mut(&mut self) -> &mut RoomSettings {
        &mut self.settings
    }

    /// Routing tag, including the `!` suffix when mandatory.
    pub fn server_tag(&self) -> Option<&str> {
        self.server_tag.as_deref()
    }

    pub(crate) fn set_server_tag(&mut self, tag: String) {
        self.server_tag = Some(tag);
    }

    /// Merge computed options; they take precedence over settings.
    pub fn merge_computed(&mut self, computed: ComputedOptions) {
        self.computed = Some(computed);
    }

    /// Flatten into backend parameters.
    ///
    /// # Errors
    ///
    /// Fails only if the computed options cannot be serialized.
    pub fn to_params(&self) -> Result<BTreeMap<String, String>, serde_json::Error> {
        let mut params = self.settings.clone();

        if let Some(tag) = &self.server_tag {
            params.insert(SERVER_TAG_PARAM.to_string(), tag.clone());
        }

        if let Some(computed) = &self.computed {
            if let serde_json::Value::Object(fields) = serde_json::to_value(computed)? {
                for (key, value) in fields {
                    if let serde_json::Value::String(value) = value {
                        params.insert(key, value);
                    }
                }
            }
        }

        Ok(params)
    }
}

/// Derives the computed options of a start.
#[derive(Debug, Clone)]
pub struct OptionBuilder {
    version_tag: String,
    messages: MessageCatalog,
}

impl OptionBuilder {
    /// Create a builder from service configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            version_tag: config.version_tag.clone(),
            messages: MessageCatalog::new(config.default_locale.clone()),
        }
    }

    /// Compute the options for starting `room` under `base_url`.
    pub fn build(
        &self,
        room: &Room,
        base_url: &str,
        current_user: Option<&ActingUser>,
        access_code: &SecretString,
    ) -> ComputedOptions {
        let routes = RoomRoutes::new(base_url);
        let room_url = routes.join_url(&room.friendly_id);
        let locale = current_user.and_then(|user| user.language.as_deref());

        let moderator_only_message =
            self.messages
                .moderator_message(locale, &room_url, non_blank(access_code));

        ComputedOptions {
            moderator_only_message,
            login_url: room_url.clone(),
            logout_url: room_url,
            end_callback_url: routes.meeting_ended_url(),
            recording_ready_url: routes.recording_ready_url(),
            origin: ORIGIN.to_string(),
            origin_server_name: routes.host(),
            origin_version: self.version_tag.clone(),
            context_name: room.name.clone(),
            context_id: room.friendly_id.to_string(),
        }
    }
}

/// Escape a presentation URL for the backend.
///
/// The backend receives the URL as one value inside an already delimited
/// parameter string, so a literal `&` would split it.
pub fn escape_presentation_url(url: &str) -> String {
    url.replace('&', "%26")
}
