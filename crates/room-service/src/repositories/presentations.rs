//! Presentation file URLs.

use crate::models::Presentation;
use crate::routes::RoomRoutes;

/// Trait for resolving presentation URLs (enables mocking).
pub trait PresentationStore: Send + Sync {
    /// Externally servable URL of `presentation` under `base_url`.
    fn url_for(&self, presentation: &Presentation, base_url: &str) -> Option<String>;
}

/// Serves presentations from the service's own `presentations/` route.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutedPresentationStore;

impl PresentationStore for RoutedPresentationStore {
    fn url_for(&self, presentation: &Presentation, base_url: &str) -> Option<String> {
        if presentation.key.is_empty() || presentation.filename.is_empty() {
            return None;
        }

        RoomRoutes::new(base_url).blob_url(&presentation.key, &presentation.filename)
    }
}
