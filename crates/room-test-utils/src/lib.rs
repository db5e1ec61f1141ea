//! # Room Service Test Utilities
//!
//! Mock implementations of the room service's external collaborators and
//! fixtures for rooms, users and backend responses.
//!
//! ## Modules
//!
//! - `mock_settings` - Scripted settings lookups
//! - `mock_backend` - Scripted conferencing backend with call recording
//! - `mock_store` - Room repository and notifier sharing one event log
//! - `fixtures` - Rooms, users, configs and meeting responses
//!
//! ## Usage
//!
//! ```rust,ignore
//! use room_test_utils::*;
//!
//! let backend = MockMeetingBackend::with_responses(vec![
//!     Err(BbbError::new("serverUnreachable", "timeout")),
//!     Ok(meeting_info("1700000000000")),
//! ]);
//! let settings = MockSettingsGateway::builder().access_code("1234").build();
//! let log = EventLog::new();
//! let rooms = MockRoomRepository::new(log.clone());
//! let notifier = RecordingNotifier::new(log.clone());
//! ```

pub mod fixtures;
pub mod mock_backend;
pub mod mock_settings;
pub mod mock_store;

pub use fixtures::*;
pub use mock_backend::*;
pub use mock_settings::*;
pub use mock_store::*;
