//! Entry points for the host UI.
//!
//! [`Versave`] owns the session and the file system and wires the components
//! together the way the host's menu entries and panels use them.

use std::path::{Path, PathBuf};

use crate::backup::{BackupEntry, BackupRotator, RotationReport};
use crate::config::VersaveConfig;
use crate::discovery::{VersionDiscovery, VersionSet};
use crate::error::{Result, VersaveError};
use crate::grammar::ProjectName;
use crate::guard::{BlockReason, Clearance, check_clearance};
use crate::host::{FileSystem, Session, StdFileSystem};
use crate::save::{IncrementalSaveController, SaveOutcome};
use crate::switcher::VersionSwitcher;

/// A save together with the backup rotation that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub outcome: SaveOutcome,
    /// `None` when rotation after saving is disabled.
    pub rotation: Option<RotationReport>,
}

/// Versioned saving for one editing session.
#[derive(Debug)]
pub struct Versave<S: Session, F: FileSystem = StdFileSystem> {
    session: S,
    fs: F,
    config: VersaveConfig,
}

impl<S: Session> Versave<S, StdFileSystem> {
    pub fn with_std_fs(session: S, config: VersaveConfig) -> Self {
        Self::new(session, StdFileSystem, config)
    }
}

impl<S: Session, F: FileSystem> Versave<S, F> {
    pub fn new(session: S, fs: F, config: VersaveConfig) -> Self {
        Self { session, fs, config }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }

    pub fn config(&self) -> &VersaveConfig {
        &self.config
    }

    /// Whether the working file may be replaced right now.
    pub fn clearance(&self) -> Clearance {
        check_clearance(&self.session.working_state())
    }

    /// Save as the next version, then rotate backups.
    pub fn save_next(&mut self, candidate: Option<&Path>) -> Result<SaveReport> {
        self.refuse_backup_target()?;
        let saver = IncrementalSaveController::from_config(&self.fs, &self.config);
        let outcome = saver.save_next(&mut self.session, candidate)?;
        Ok(self.after_save(outcome))
    }

    /// Save in place (or start a new project), then rotate backups.
    pub fn save(&mut self, candidate: Option<&Path>) -> Result<SaveReport> {
        self.refuse_backup_target()?;
        let saver = IncrementalSaveController::from_config(&self.fs, &self.config);
        let outcome = saver.save(&mut self.session, candidate)?;
        Ok(self.after_save(outcome))
    }

    /// Switch the session to another version of the open project.
    pub fn open(&mut self, path: &Path) -> Result<PathBuf> {
        VersionSwitcher::new(&self.fs)
            .with_implicit_base(self.config.discovery.implicit_first_version)
            .open(&mut self.session, path)
    }

    /// Move the numbered backups of `path` into the backup folder.
    pub fn rotate(&self, path: &Path) -> RotationReport {
        self.rotator().rotate(path)
    }

    /// Versions of `project` in `directory`.
    ///
    /// Only files with the open file's extension are listed, so numbered
    /// backups never show up as versions.
    pub fn list_versions(&self, directory: &Path, project: &ProjectName) -> Result<VersionSet> {
        let discovery = VersionDiscovery::new(&self.fs)
            .with_implicit_base(self.config.discovery.implicit_first_version);
        match self.session.current_file_path() {
            Some(current) => discovery.with_working_file(&current).list(directory, project),
            None => discovery.list(directory, project),
        }
    }

    /// Versions of the open project, `None` while the session has no file.
    pub fn list_current_versions(&self) -> Result<Option<VersionSet>> {
        let Some(current) = self.session.current_file_path() else {
            return Ok(None);
        };
        if ProjectName::from_path(&current).is_none() {
            return Ok(None);
        }
        VersionSwitcher::new(&self.fs)
            .with_implicit_base(self.config.discovery.implicit_first_version)
            .siblings(&current)
            .map(Some)
    }

    /// Rotated backups of the open file. Empty while the session has no file.
    pub fn list_backups(&self) -> Result<Vec<BackupEntry>> {
        match self.session.current_file_path() {
            Some(current) => self.rotator().list_backups(&current),
            None => Ok(Vec::new()),
        }
    }

    /// Delete one rotated backup of the open file.
    pub fn delete_backup(&self, slot: u32) -> Result<PathBuf> {
        let current = self.current_path()?;
        self.rotator().delete_backup(&current, slot)
    }

    /// Load a rotated backup of the open file into the session.
    ///
    /// Guarded like a version switch. The session then points into the backup
    /// folder and refuses `save` and `save_next` until it is saved elsewhere.
    pub fn open_backup(&mut self, slot: u32) -> Result<PathBuf> {
        if let Clearance::Blocked(reason) = self.clearance() {
            tracing::warn!("Not opening backup {}: {}", slot, reason);
            return Err(VersaveError::Blocked(reason));
        }
        let current = self.current_path()?;
        let path = self.rotator().backup_path(&current, slot)?;
        if !self.fs.exists(&path) {
            return Err(VersaveError::BackupNotFound { path });
        }

        self.session
            .load(&path)
            .map_err(|e| VersaveError::io("load", &path, e))?;
        tracing::info!("Opened backup {}", path.display());
        Ok(path)
    }

    fn current_path(&self) -> Result<PathBuf> {
        self.session
            .current_file_path()
            .ok_or(VersaveError::Blocked(BlockReason::NoProjectContext))
    }

    /// Saving into the backup folder would shift and rotate backups of backups.
    fn refuse_backup_target(&self) -> Result<()> {
        let backup_dir = Path::new(&self.config.backup.directory);
        if backup_dir.as_os_str().is_empty() {
            return Ok(());
        }
        if let Some(current) = self.session.current_file_path()
            && current.parent().is_some_and(|parent| parent.ends_with(backup_dir))
        {
            tracing::warn!("Not saving {}: it is a backup", current.display());
            return Err(VersaveError::BackupIsReadOnly { path: current });
        }
        Ok(())
    }

    fn after_save(&self, outcome: SaveOutcome) -> SaveReport {
        let rotation = self
            .config
            .backup
            .rotate_on_save
            .then(|| self.rotate(&outcome.path));
        SaveReport { outcome, rotation }
    }

    fn rotator(&self) -> BackupRotator<'_, F> {
        BackupRotator::new(&self.fs, &self.config.backup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FileSession;
    use std::fs;
    use tempfile::tempdir;

    fn service(session: FileSession) -> Versave<FileSession> {
        Versave::with_std_fs(session, VersaveConfig::default())
    }

    #[test]
    fn test_save_in_place_rotates_backups() {
        let dir = tempdir().unwrap();
        let v2 = dir.path().join("scene_v2.blend");
        fs::write(&v2, b"before").unwrap();

        let mut session = FileSession::open(&v2).unwrap().with_backup_count(1);
        session.set_contents(b"after".to_vec());
        let mut versave = service(session);

        let report = versave.save(None).unwrap();

        let rotation = report.rotation.unwrap();
        assert_eq!(rotation.moved_count(), 1);
        assert!(!dir.path().join("scene_v2.blend1").exists());
        assert_eq!(
            fs::read(dir.path().join("backup/scene_v2.blend1")).unwrap(),
            b"before"
        );
        assert_eq!(fs::read(&v2).unwrap(), b"after");
    }

    #[test]
    fn test_rotation_can_be_disabled() {
        let dir = tempdir().unwrap();
        let v1 = dir.path().join("scene_v1.blend");
        fs::write(&v1, b"one").unwrap();
        let mut config = VersaveConfig::default();
        config.backup.rotate_on_save = false;

        let session = FileSession::open(&v1).unwrap();
        let mut versave = Versave::with_std_fs(session, config);
        let report = versave.save_next(None).unwrap();

        assert!(report.rotation.is_none());
        assert_eq!(report.outcome.path, dir.path().join("scene_v2.blend"));
    }

    #[test]
    fn test_list_current_versions_marks_open_file() {
        let dir = tempdir().unwrap();
        for name in [
            "scene_v1.blend",
            "scene_v2.blend",
            "scene_v3.blend",
            "scene_v4.blend1",
        ] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let versave = service(FileSession::open(&dir.path().join("scene_v2.blend")).unwrap());

        let set = versave.list_current_versions().unwrap().unwrap();
        assert_eq!(set.versions(), vec![1, 2, 3]);
        let current: Vec<_> = set
            .iter()
            .filter(|e| e.is_current)
            .map(|e| e.version().get())
            .collect();
        assert_eq!(current, vec![2]);
    }

    #[test]
    fn test_unsaved_session_lists_nothing() {
        let versave = service(FileSession::new());
        assert!(versave.list_current_versions().unwrap().is_none());
        assert!(versave.list_backups().unwrap().is_empty());
        assert_eq!(
            versave.clearance(),
            Clearance::Blocked(BlockReason::NoProjectContext)
        );
        assert!(matches!(
            versave.delete_backup(1),
            Err(VersaveError::Blocked(BlockReason::NoProjectContext))
        ));
    }

    #[test]
    fn test_open_backup_is_guarded() {
        let dir = tempdir().unwrap();
        let v1 = dir.path().join("scene_v1.blend");
        fs::write(&v1, b"current").unwrap();
        fs::create_dir(dir.path().join("backup")).unwrap();
        fs::write(dir.path().join("backup/scene_v1.blend1"), b"older").unwrap();

        let mut session = FileSession::open(&v1).unwrap();
        session.mark_dirty();
        let mut versave = service(session);

        assert!(matches!(
            versave.open_backup(1),
            Err(VersaveError::Blocked(BlockReason::UnsavedChanges))
        ));

        let mut versave = service(FileSession::open(&v1).unwrap());
        assert!(matches!(
            versave.open_backup(2),
            Err(VersaveError::BackupNotFound { .. })
        ));
        let opened = versave.open_backup(1).unwrap();
        assert_eq!(opened, dir.path().join("backup/scene_v1.blend1"));
        assert_eq!(versave.session().contents(), b"older");
    }

    #[test]
    fn test_restored_backup_is_not_saved_over() {
        let dir = tempdir().unwrap();
        let v1 = dir.path().join("scene_v1.blend");
        fs::write(&v1, b"current").unwrap();
        fs::create_dir(dir.path().join("backup")).unwrap();
        fs::write(dir.path().join("backup/scene_v1.blend1"), b"slot1").unwrap();
        fs::write(dir.path().join("backup/scene_v1.blend11"), b"slot11").unwrap();

        let session = FileSession::open(&v1).unwrap().with_backup_count(1);
        let mut versave = service(session);
        versave.open_backup(1).unwrap();
        versave.session_mut().set_contents(b"edited".to_vec());

        let err = versave.save(None).unwrap_err();
        assert!(matches!(err, VersaveError::BackupIsReadOnly { .. }));
        assert!(err.needs_user_action());
        assert!(matches!(
            versave.save_next(None),
            Err(VersaveError::BackupIsReadOnly { .. })
        ));

        assert!(versave.session().is_dirty());
        assert_eq!(
            fs::read(dir.path().join("backup/scene_v1.blend1")).unwrap(),
            b"slot1"
        );
        assert_eq!(
            fs::read(dir.path().join("backup/scene_v1.blend11")).unwrap(),
            b"slot11"
        );
        assert!(!dir.path().join("backup/backup").exists());
    }
}
