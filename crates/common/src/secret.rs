//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Room access codes
//! travel through settings lookups, log statements and message templates, so
//! they are carried as [`SecretString`] until the single point where they are
//! rendered into the moderator message.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct RoomCodes {
//!     friendly_id: String,
//!     viewer_code: SecretString,  // Debug shows "[REDACTED]"
//! }
//!
//! let codes = RoomCodes {
//!     friendly_id: "abc-def-ghi".to_string(),
//!     viewer_code: SecretString::from("4321"),
//! };
//!
//! println!("{:?}", codes);
//!
//! // The value is only reachable through an explicit call
//! let code: &str = codes.viewer_code.expose_secret();
//! assert_eq!(code, "4321");
//! ```
//!
//! # Usage Guidelines
//!
//! Use `SecretString` for:
//! - Viewer and moderator access codes
//! - Backend shared secrets
//! - Bearer tokens

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretString};

/// Returns the exposed value when the secret holds something other than
/// whitespace.
///
/// Settings lookups return an empty string for "no code configured"; a code
/// made only of blanks is treated the same way.
#[must_use]
pub fn non_blank(secret: &SecretString) -> Option<&str> {
    let value = secret.expose_secret();
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
