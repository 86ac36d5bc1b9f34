//! Viewer session

use roadmap_progress::ViewerKey;

/// Who is looking at roadmaps right now
///
/// The service reads the viewer from here for every progress call; switching
/// viewer is the only way it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    viewer: ViewerKey,
}

impl Session {
    #[inline]
    #[must_use]
    pub fn new(viewer: ViewerKey) -> Self {
        Self { viewer }
    }

    /// Current viewer
    #[inline]
    #[must_use]
    pub fn viewer(&self) -> &ViewerKey {
        &self.viewer
    }

    /// Replace the viewer, returning the previous one
    pub fn switch(&mut self, viewer: ViewerKey) -> ViewerKey {
        std::mem::replace(&mut self.viewer, viewer)
    }
}
