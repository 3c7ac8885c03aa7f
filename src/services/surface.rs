use crate::models::{MapFrame, Marker, Notice, Region};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Rendering collaborator that displays discovery output
///
/// The orchestrator owns which markers it placed; the surface only draws.
pub trait MapSurface {
    /// Show the persistent "current location" marker
    fn show_user_location(&self, marker: &Marker);

    fn add_markers(&self, markers: &[Marker]);

    fn remove_markers(&self, ids: &[Uuid]);

    /// Fit the viewport to a region
    fn fit_region(&self, region: &Region);

    fn notify(&self, notice: &Notice);

    /// Remove everything, including the location marker
    fn clear(&self);
}

/// Surface that keeps the latest frame in memory for clients to poll
#[derive(Debug, Default)]
pub struct InMemorySurface {
    frame: Mutex<MapFrame>,
}

impl InMemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn frame(&self) -> MutexGuard<'_, MapFrame> {
        // A panicked writer leaves a complete frame behind, keep using it
        self.frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current frame
    pub fn snapshot(&self) -> MapFrame {
        self.frame().clone()
    }
}

impl MapSurface for InMemorySurface {
    fn show_user_location(&self, marker: &Marker) {
        self.frame().location_marker = Some(marker.clone());
    }

    fn add_markers(&self, markers: &[Marker]) {
        self.frame().markers.extend_from_slice(markers);
    }

    fn remove_markers(&self, ids: &[Uuid]) {
        self.frame().markers.retain(|m| !ids.contains(&m.id));
    }

    fn fit_region(&self, region: &Region) {
        self.frame().viewport = Some(*region);
    }

    fn notify(&self, notice: &Notice) {
        self.frame().notice = Some(notice.clone());
    }

    fn clear(&self) {
        *self.frame() = MapFrame::default();
    }
}

impl<S: MapSurface> MapSurface for std::sync::Arc<S> {
    fn show_user_location(&self, marker: &Marker) {
        (**self).show_user_location(marker)
    }

    fn add_markers(&self, markers: &[Marker]) {
        (**self).add_markers(markers)
    }

    fn remove_markers(&self, ids: &[Uuid]) {
        (**self).remove_markers(ids)
    }

    fn fit_region(&self, region: &Region) {
        (**self).fit_region(region)
    }

    fn notify(&self, notice: &Notice) {
        (**self).notify(notice)
    }

    fn clear(&self) {
        (**self).clear()
    }
}
