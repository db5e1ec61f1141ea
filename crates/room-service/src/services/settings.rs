//! Room settings lookup.
//!
//! Settings resolution (room configuration merged with provider-wide
//! defaults and the acting user's permissions) is owned by another component.
//! The start flow only consumes its result through [`SettingsGateway`].

use crate::errors::RoomError;
use crate::models::{ActingUser, VIEWER_ACCESS_CODE_SETTING};
use async_trait::async_trait;
use common::secret::SecretString;
use common::types::RoomId;
use std::collections::BTreeMap;

/// Resolved settings, keyed by setting name.
pub type RoomSettings = BTreeMap<String, String>;

/// Which settings a lookup should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsFilter {
    /// Only the options forwarded to the conferencing backend.
    BbbOptions,

    /// The named settings.
    Named {
        /// Setting names.
        names: Vec<String>,
        /// Reveal access code values instead of masking them.
        show_codes: bool,
    },
}

impl SettingsFilter {
    /// Filter for the viewer access code, with the value revealed.
    pub fn viewer_access_code() -> Self {
        SettingsFilter::Named {
            names: vec![VIEWER_ACCESS_CODE_SETTING.to_string()],
            show_codes: true,
        }
    }
}

/// A single settings lookup.
#[derive(Debug, Clone, Copy)]
pub struct SettingsQuery<'a> {
    /// Room being started.
    pub room_id: RoomId,

    /// Provider of the room's owner.
    pub provider: &'a str,

    /// User asking for the settings, if any.
    pub current_user: Option<&'a ActingUser>,

    /// Settings to return.
    pub filter: &'a SettingsFilter,
}

/// Trait for settings lookups (enables mocking).
#[async_trait]
pub trait SettingsGateway: Send + Sync {
    /// Resolve the settings selected by `query.filter`.
    ///
    /// # Errors
    ///
    /// - `RoomError::Settings` - lookup failed
    async fn resolve(&self, query: SettingsQuery<'_>) -> Result<RoomSettings, RoomError>;
}

/// Extract the viewer access code from an access-code lookup.
///
/// A missing key is the same as no code.
pub fn viewer_access_code(settings: &RoomSettings) -> SecretString {
    SecretString::from(
        settings
            .get(VIEWER_ACCESS_CODE_SETTING)
            .cloned()
            .unwrap_or_default(),
    )
}
