//! URL building for room links and backend callbacks.
//!
//! Every URL handed to the conferencing backend is rooted at the public base
//! URL of the deployment, which arrives with each start request (the service
//! may be reached under several hostnames).

use common::types::FriendlyId;
use url::Url;

/// Path of the meeting-ended callback.
pub const MEETING_ENDED_PATH: &str = "meeting_ended";

/// Path of the recording-ready callback.
pub const RECORDING_READY_PATH: &str = "recording_ready";

/// Path prefix of stored presentation files.
pub const PRESENTATIONS_PATH: &str = "presentations";

/// URL helpers for one base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRoutes {
    root: String,
}

impl RoomRoutes {
    /// Create helpers rooted at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            root: format!("{}/", base_url.trim_end_matches('/')),
        }
    }

    /// Root URL, always ending in exactly one `/`.
    pub fn root_url(&self) -> &str {
        &self.root
    }

    /// Public join link of a room.
    pub fn join_url(&self, friendly_id: &FriendlyId) -> String {
        format!("{}rooms/{}/join", self.root, friendly_id)
    }

    /// Callback the backend calls when a meeting ends.
    pub fn meeting_ended_url(&self) -> String {
        format!("{}{}", self.root, MEETING_ENDED_PATH)
    }

    /// Callback the backend calls when a recording is ready.
    pub fn recording_ready_url(&self) -> String {
        format!("{}{}", self.root, RECORDING_READY_PATH)
    }

    /// Externally servable URL of a stored file.
    ///
    /// `key` and `filename` are percent-encoded as single path segments.
    /// Returns `None` when the base URL cannot carry a path.
    pub fn blob_url(&self, key: &str, filename: &str) -> Option<String> {
        let mut url = Url::parse(&self.root).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend([PRESENTATIONS_PATH, key, filename]);
        Some(url.into())
    }

    /// Host portion of the base URL, if it has one.
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.root)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
    }
}
