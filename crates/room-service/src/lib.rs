//! Room Service Library
//!
//! Starts conferencing sessions for Greenroom rooms. A start gathers the
//! room's settings, applies the server-tag routing policy, derives the
//! computed session parameters and asks the conferencing backend to create
//! the meeting, retrying transient backend failures. On success the room is
//! marked online and subscribers of the room are notified.
//!
//! # Architecture
//!
//! ```text
//! services/meeting_starter.rs
//!   -> services/settings.rs       (room settings lookup)
//!   -> services/server_tag.rs     (routing policy)
//!   -> services/meeting_options.rs (computed parameters)
//!   -> services/bbb_client.rs     (conferencing backend)
//!   -> repositories/*.rs          (room status, presentations)
//!   -> services/notifier.rs       (room channel broadcast)
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types and failure classification
//! - `locales` - Moderator message templates
//! - `models` - Data models
//! - `routes` - URL building for join links and callbacks
//! - `services` - Orchestration and collaborator traits
//! - `repositories` - Room status and presentation storage traits

pub mod config;
pub mod errors;
pub mod locales;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
