//! Service layer for the room service.
//!
//! This module contains the start orchestration and the traits through
//! which it reaches external systems.
//!
//! # Components
//!
//! - `settings` - Room settings lookup
//! - `server_tag` - Server tag routing policy
//! - `meeting_options` - Start options and computed fields
//! - `bbb_client` - Conferencing backend interface
//! - `notifier` - Room channel broadcasts
//! - `meeting_starter` - Start orchestration with retry

pub mod bbb_client;
pub mod meeting_options;
pub mod meeting_starter;
pub mod notifier;
pub mod server_tag;
pub mod settings;

pub use bbb_client::{MeetingBackend, StartMeetingRequest};
pub use meeting_options::{ComputedOptions, OptionBuilder, StartOptions};
pub use meeting_starter::{MeetingStarted, MeetingStarter, StartRequest, MAX_START_ATTEMPTS};
pub use notifier::{RoomNotifier, TopicBroadcaster};
pub use server_tag::{ServerTagDecision, ServerTagPolicy};
pub use settings::{RoomSettings, SettingsFilter, SettingsGateway, SettingsQuery};
