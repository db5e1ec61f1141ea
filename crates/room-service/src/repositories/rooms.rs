//! Room status persistence.

use crate::errors::RoomError;
use crate::models::RoomStatusUpdate;
use async_trait::async_trait;
use common::types::RoomId;

/// Trait for room status writes (enables mocking).
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Persist the online flag and last session time of a room.
    ///
    /// # Errors
    ///
    /// - `RoomError::Persistence` - the update could not be written
    async fn update_status(&self, room_id: RoomId, update: RoomStatusUpdate)
        -> Result<(), RoomError>;
}
