//! Room Service error types.
//!
//! Remote failures from the conferencing backend are classified into
//! `BbbErrorKind` so the start loop can tell a transient failure from a
//! deterministic one. Every other failure is a dependency or internal error
//! and is propagated to the caller without retry.

use thiserror::Error;

/// Backend message key reported when a meeting ID is already in use.
pub const DUPLICATE_ID_KEY: &str = "idNotUnique";

/// Classification of a failed backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BbbErrorKind {
    /// The meeting identifier already exists on the backend.
    DuplicateIdentifier,

    /// Any other failure, carrying the backend's message key.
    Other(String),
}

impl BbbErrorKind {
    /// Classify a backend message key.
    pub fn from_key(key: &str) -> Self {
        if key == DUPLICATE_ID_KEY {
            BbbErrorKind::DuplicateIdentifier
        } else {
            BbbErrorKind::Other(key.to_string())
        }
    }

    /// The backend message key for this kind.
    pub fn key(&self) -> &str {
        match self {
            BbbErrorKind::DuplicateIdentifier => DUPLICATE_ID_KEY,
            BbbErrorKind::Other(key) => key,
        }
    }
}

/// Failure reported by the conferencing backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Conferencing backend error ({}): {message}", .kind.key())]
pub struct BbbError {
    /// Failure classification.
    pub kind: BbbErrorKind,

    /// Human readable message from the backend.
    pub message: String,
}

impl BbbError {
    /// Create an error from a backend message key and message.
    pub fn new(key: &str, message: impl Into<String>) -> Self {
        Self {
            kind: BbbErrorKind::from_key(key),
            message: message.into(),
        }
    }

    /// Create a duplicate-identifier error.
    pub fn duplicate_id(message: impl Into<String>) -> Self {
        Self {
            kind: BbbErrorKind::DuplicateIdentifier,
            message: message.into(),
        }
    }

    /// Whether repeating the same call may succeed.
    ///
    /// Identifier collisions are deterministic and never retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.kind, BbbErrorKind::DuplicateIdentifier)
    }
}

/// Room Service error type.
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Settings lookup failed: {0}")]
    Settings(String),

    #[error("Room update failed: {0}")]
    Persistence(String),

    #[error(transparent)]
    Bbb(#[from] BbbError),

    #[error("Invalid meeting create time: {0}")]
    InvalidCreateTime(String),
}

impl RoomError {
    /// Bounded label for metrics and logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            RoomError::Settings(_) => "settings",
            RoomError::Persistence(_) => "persistence",
            RoomError::Bbb(e) if e.is_retryable() => "bbb",
            RoomError::Bbb(_) => "bbb_duplicate_id",
            RoomError::InvalidCreateTime(_) => "invalid_create_time",
        }
    }
}
