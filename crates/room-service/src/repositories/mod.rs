//! Repository layer for the room service.
//!
//! Room records and presentation files are owned by the host application's
//! storage. The start flow writes two status fields and reads presentation
//! URLs through the traits defined here.

pub mod presentations;
pub mod rooms;

pub use presentations::{PresentationStore, RoutedPresentationStore};
pub use rooms::RoomRepository;
