//! Interfaces to the host application.
//!
//! The core never touches the editing session or the disk directly. It goes
//! through two seams:
//! - [`Session`] - the working file state plus save/load primitives
//! - [`FileSystem`] - directory primitives
//!
//! [`StdFileSystem`] and [`FileSession`] implement them on top of `std::fs`.

mod fs;
mod session;
mod tracker;

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::guard::WorkingFileState;

pub use fs::StdFileSystem;
pub use session::FileSession;
pub use tracker::DirtyTracker;

/// The editing session that owns the working file.
pub trait Session {
    /// Path of the open file, `None` if it was never saved.
    fn current_file_path(&self) -> Option<PathBuf>;

    /// Whether the in-memory project changed since it was last persisted.
    fn is_dirty(&self) -> bool;

    /// Persist the working state at `path` and make it the open file.
    fn save_as(&mut self, path: &Path) -> io::Result<()>;

    /// Persist the working state at the current path.
    fn save(&mut self) -> io::Result<()>;

    /// Replace the working state with the contents of `path`.
    fn load(&mut self, path: &Path) -> io::Result<()>;

    /// Snapshot of the state the unsaved-changes guard looks at.
    fn working_state(&self) -> WorkingFileState {
        WorkingFileState {
            path: self.current_file_path(),
            dirty: self.is_dirty(),
        }
    }
}

/// Size and modification time of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub modified: DateTime<Local>,
}

/// Directory primitives used by discovery, bootstrapping and rotation.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and missing parents. Existing directories are fine.
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Regular files directly inside `dir`.
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Move `src` to `dst`, replacing `dst` if present.
    fn rename(&self, src: &Path, dst: &Path) -> io::Result<()>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    fn stat(&self, path: &Path) -> io::Result<FileStat>;
}
