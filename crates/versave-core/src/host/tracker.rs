//! Dirty state tracking for the working file.

use chrono::{DateTime, Local};

/// Tracks unsaved changes in a session.
///
/// Drives the "unsaved changes" guard in front of version switches.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    /// Whether there are unsaved changes.
    dirty: bool,

    /// Whether a save is currently in progress.
    saving: bool,

    /// When the last successful save finished.
    last_saved: Option<DateTime<Local>>,
}

impl DirtyTracker {
    /// Create a new tracker with no unsaved changes.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn last_saved(&self) -> Option<DateTime<Local>> {
        self.last_saved
    }

    /// Mark the session as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn start_save(&mut self) {
        self.saving = true;
    }

    pub fn save_complete(&mut self) {
        self.dirty = false;
        self.saving = false;
        self.last_saved = Some(Local::now());
    }

    /// A failed save keeps the changes marked as unsaved.
    pub fn save_failed(&mut self) {
        self.saving = false;
    }

    /// A freshly loaded file has nothing to save.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_clean() {
        let tracker = DirtyTracker::new();
        assert!(!tracker.is_dirty());
        assert!(!tracker.is_saving());
        assert!(tracker.last_saved().is_none());
    }

    #[test]
    fn test_completed_save_clears_dirty() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty();
        tracker.start_save();
        assert!(tracker.is_saving());

        tracker.save_complete();
        assert!(!tracker.is_dirty());
        assert!(!tracker.is_saving());
        assert!(tracker.last_saved().is_some());
    }

    #[test]
    fn test_failed_save_stays_dirty() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty();
        tracker.start_save();
        tracker.save_failed();

        assert!(tracker.is_dirty());
        assert!(!tracker.is_saving());
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty();
        tracker.start_save();
        tracker.save_complete();
        tracker.mark_dirty();

        tracker.reset();
        assert!(!tracker.is_dirty());
        assert!(tracker.last_saved().is_none());
    }
}
