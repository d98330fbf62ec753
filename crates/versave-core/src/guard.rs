//! Unsaved-changes guard.
//!
//! Decides whether an operation that replaces the working file may run. The
//! guard never prompts or saves; callers ask the user and check again.

use std::fmt;
use std::path::PathBuf;

/// What the guard looks at: the open file and whether it has unsaved edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingFileState {
    /// `None` when nothing is open or the file was never saved.
    pub path: Option<PathBuf>,
    pub dirty: bool,
}

impl WorkingFileState {
    pub fn new(path: Option<PathBuf>, dirty: bool) -> Self {
        Self { path, dirty }
    }
}

/// Why a state-replacing operation may not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// The working file has modifications that were not persisted.
    UnsavedChanges,
    /// No saved file is open, so there is no project to switch within.
    NoProjectContext,
}

impl BlockReason {
    pub const fn message(&self) -> &'static str {
        match self {
            Self::UnsavedChanges => "The current file has unsaved changes.",
            Self::NoProjectContext => "No saved project is open.",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsavedChanges => f.write_str("unsaved changes"),
            Self::NoProjectContext => f.write_str("no project context"),
        }
    }
}

/// The guard's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clearance {
    Clear,
    Blocked(BlockReason),
}

impl Clearance {
    #[inline]
    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }
}

/// Check whether the working file may be replaced.
///
/// A missing path wins over dirtiness: an unsaved new scene has no project
/// to switch within, whatever its edit state.
pub fn check_clearance(state: &WorkingFileState) -> Clearance {
    if state.path.is_none() {
        return Clearance::Blocked(BlockReason::NoProjectContext);
    }
    if state.dirty {
        return Clearance::Blocked(BlockReason::UnsavedChanges);
    }
    Clearance::Clear
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_open_file_is_clear() {
        let state = WorkingFileState::new(Some(PathBuf::from("scene_v1.blend")), false);
        assert_eq!(check_clearance(&state), Clearance::Clear);
    }

    #[test]
    fn test_dirty_file_is_blocked() {
        let state = WorkingFileState::new(Some(PathBuf::from("scene_v1.blend")), true);
        assert_eq!(
            check_clearance(&state),
            Clearance::Blocked(BlockReason::UnsavedChanges)
        );
    }

    #[test]
    fn test_no_path_is_blocked_even_when_dirty() {
        for dirty in [false, true] {
            let state = WorkingFileState::new(None, dirty);
            assert_eq!(
                check_clearance(&state),
                Clearance::Blocked(BlockReason::NoProjectContext)
            );
        }
    }
}
