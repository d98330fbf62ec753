//! File-backed editing session.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{DirtyTracker, Session};
use crate::backup::backup_file_name;

/// A session whose working state is the raw bytes of one file.
///
/// Writes go to a temp file first and are renamed into place. When saving
/// over an existing file with `backup_count > 0`, the previous contents are
/// kept as numbered backups next to it (`scene_v2.blend1`, `.blend2`, ...),
/// newest at slot 1.
#[derive(Debug, Clone, Default)]
pub struct FileSession {
    path: Option<PathBuf>,
    contents: Vec<u8>,
    tracker: DirtyTracker,
    backup_count: u32,
}

impl FileSession {
    /// A new, never saved session with empty contents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an existing file as the working file.
    pub fn open(path: &Path) -> io::Result<Self> {
        let mut session = Self::new();
        session.load(path)?;
        Ok(session)
    }

    /// Number of numbered backups kept when saving over an existing file.
    #[must_use]
    pub fn with_backup_count(mut self, count: u32) -> Self {
        self.backup_count = count;
        self
    }

    pub fn backup_count(&self) -> u32 {
        self.backup_count
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Replace the working contents. Marks the session dirty.
    pub fn set_contents(&mut self, contents: Vec<u8>) {
        self.contents = contents;
        self.tracker.mark_dirty();
    }

    pub fn mark_dirty(&mut self) {
        self.tracker.mark_dirty();
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    fn write_to(&mut self, path: &Path) -> io::Result<()> {
        self.tracker.start_save();
        match write_with_backups(path, &self.contents, self.backup_count) {
            Ok(()) => {
                self.tracker.save_complete();
                tracing::info!("Saved {}", path.display());
                Ok(())
            }
            Err(err) => {
                self.tracker.save_failed();
                Err(err)
            }
        }
    }
}

impl Session for FileSession {
    fn current_file_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    fn save_as(&mut self, path: &Path) -> io::Result<()> {
        self.write_to(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn save(&mut self) -> io::Result<()> {
        let Some(path) = self.path.clone() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "session has no file path",
            ));
        };
        self.write_to(&path)
    }

    fn load(&mut self, path: &Path) -> io::Result<()> {
        self.contents = fs::read(path)?;
        self.path = Some(path.to_path_buf());
        self.tracker.reset();
        tracing::info!("Loaded {}", path.display());
        Ok(())
    }
}

/// Atomic write (temp file + rename), shifting numbered backups first.
fn write_with_backups(path: &Path, contents: &[u8], backup_count: u32) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path);
    let result = replace_with_temp(path, &temp_path, contents, backup_count);
    if result.is_err()
        && temp_path.exists()
        && let Err(err) = fs::remove_file(&temp_path)
    {
        tracing::warn!("Failed to remove {}: {}", temp_path.display(), err);
    }
    result
}

fn replace_with_temp(
    path: &Path,
    temp_path: &Path,
    contents: &[u8],
    backup_count: u32,
) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    if backup_count > 0 && path.is_file() {
        shift_backups(path, backup_count)?;
    }

    fs::rename(temp_path, path)
}

/// Push `.<ext>1..` up one slot and move the current file into slot 1.
/// The artifact in the last slot is overwritten.
fn shift_backups(path: &Path, backup_count: u32) -> io::Result<()> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext_base = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    let slot_path = |slot: u32| dir.join(backup_file_name(&stem, &ext_base, slot));

    for slot in (1..backup_count).rev() {
        let from = slot_path(slot);
        if from.is_file() {
            fs::rename(&from, slot_path(slot + 1))?;
        }
    }
    fs::rename(path, slot_path(1))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_session_has_no_path() {
        let session = FileSession::new();
        assert!(session.current_file_path().is_none());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_save_as_sets_path_and_clears_dirty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene_v1.blend");

        let mut session = FileSession::new();
        session.set_contents(b"mesh".to_vec());
        assert!(session.is_dirty());

        session.save_as(&path).unwrap();
        assert_eq!(session.current_file_path(), Some(path.clone()));
        assert!(!session.is_dirty());
        assert_eq!(fs::read(&path).unwrap(), b"mesh");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut session = FileSession::new();
        let err = session.save().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_overwrite_produces_numbered_backups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene_v1.blend");

        let mut session = FileSession::new().with_backup_count(2);
        session.set_contents(b"one".to_vec());
        session.save_as(&path).unwrap();
        session.set_contents(b"two".to_vec());
        session.save().unwrap();
        session.set_contents(b"three".to_vec());
        session.save().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"three");
        assert_eq!(fs::read(dir.path().join("scene_v1.blend1")).unwrap(), b"two");
        assert_eq!(fs::read(dir.path().join("scene_v1.blend2")).unwrap(), b"one");
        assert!(!dir.path().join("scene_v1.blend3").exists());
    }

    #[test]
    fn test_no_backups_by_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene_v1.blend");

        let mut session = FileSession::new();
        session.save_as(&path).unwrap();
        session.save().unwrap();

        assert!(!dir.path().join("scene_v1.blend1").exists());
    }

    #[test]
    fn test_failed_write_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene_v1.blend");
        fs::write(&path, b"saved").unwrap();
        // A non-empty directory in slot 1 makes the backup shift fail.
        let slot = dir.path().join("scene_v1.blend1");
        fs::create_dir(&slot).unwrap();
        fs::write(slot.join("keep"), b"x").unwrap();

        let mut session = FileSession::open(&path).unwrap().with_backup_count(1);
        session.set_contents(b"edited".to_vec());

        assert!(session.save().is_err());
        assert!(session.is_dirty());
        assert!(!temp_path_for(&path).exists());
        assert_eq!(fs::read(&path).unwrap(), b"saved");
    }

    #[test]
    fn test_load_resets_dirty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene_v1.blend");
        fs::write(&path, b"saved").unwrap();

        let mut session = FileSession::new();
        session.mark_dirty();
        session.load(&path).unwrap();

        assert!(!session.is_dirty());
        assert_eq!(session.contents(), b"saved");
    }
}
