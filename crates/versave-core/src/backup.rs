//! Numbered backup rotation.
//!
//! The host leaves numbered backups next to the working file when it saves
//! over it (`scene_v2.blend1`, `scene_v2.blend2`, ...). After each save they
//! are moved into a `backup/` folder beside the file so the project folder
//! only shows real versions. Rotation is best effort: every slot is moved
//! independently and a failing slot never stops the others.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::{BackupConfig, MAX_BACKUP_SLOTS};
use crate::error::{Result, VersaveError};
use crate::host::FileSystem;

/// One of the numbered backup positions, `1..=32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BackupSlot(u32);

impl BackupSlot {
    #[must_use]
    pub const fn new(slot: u32) -> Option<Self> {
        if slot >= 1 && slot <= MAX_BACKUP_SLOTS {
            Some(Self(slot))
        } else {
            None
        }
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Slots `1..=count`, capped at the maximum.
    pub fn range(count: u32) -> impl DoubleEndedIterator<Item = Self> {
        (1..=count.min(MAX_BACKUP_SLOTS)).map(Self)
    }
}

impl fmt::Display for BackupSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `<stem>.<ext_base><slot>`, e.g. `scene_v2.blend3`.
pub fn backup_file_name(stem: &str, ext_base: &str, slot: u32) -> String {
    format!("{stem}.{ext_base}{slot}")
}

/// A slot that could not be moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationFailure {
    pub slot: BackupSlot,
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one rotation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationReport {
    /// Destination paths of the moved backups.
    pub moved: Vec<PathBuf>,
    pub failures: Vec<RotationFailure>,
}

impl RotationReport {
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A rotated backup in the backup folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupEntry {
    pub slot: BackupSlot,
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub modified: DateTime<Local>,
}

/// Where the backups of one working file live.
#[derive(Debug, Clone)]
struct BackupLayout {
    working_dir: PathBuf,
    backup_dir: PathBuf,
    stem: String,
    ext_base: String,
}

impl BackupLayout {
    fn file_name(&self, slot: BackupSlot) -> String {
        backup_file_name(&self.stem, &self.ext_base, slot.get())
    }
}

/// Moves numbered backups of the working file into the backup folder.
#[derive(Debug, Clone)]
pub struct BackupRotator<'a, F: FileSystem> {
    fs: &'a F,
    directory: String,
    extension_base: String,
    slots: u32,
}

impl<'a, F: FileSystem> BackupRotator<'a, F> {
    pub fn new(fs: &'a F, config: &BackupConfig) -> Self {
        Self {
            fs,
            directory: config.directory.clone(),
            extension_base: config.extension_base.clone(),
            slots: config.slots(),
        }
    }

    /// Move every existing `<stem>.<ext><slot>` into the backup folder.
    ///
    /// The folder is created on first need and same-named backups already
    /// in it are replaced. Failures are logged and reported, never returned.
    pub fn rotate(&self, working_path: &Path) -> RotationReport {
        let mut report = RotationReport::default();
        let Some(layout) = self.layout(working_path) else {
            tracing::warn!(
                "Cannot rotate backups for {}: no file name",
                working_path.display()
            );
            return report;
        };

        let mut backup_dir_ready = false;
        for slot in BackupSlot::range(self.slots) {
            let file_name = layout.file_name(slot);
            let source = layout.working_dir.join(&file_name);
            if !self.fs.exists(&source) {
                continue;
            }

            if !backup_dir_ready {
                if let Err(e) = self.fs.create_dir(&layout.backup_dir) {
                    tracing::warn!(
                        "Skipping backup {}: cannot create {}: {}",
                        source.display(),
                        layout.backup_dir.display(),
                        e
                    );
                    report.failures.push(RotationFailure {
                        slot,
                        path: source,
                        reason: e.to_string(),
                    });
                    continue;
                }
                backup_dir_ready = true;
            }

            let destination = layout.backup_dir.join(&file_name);
            match self.fs.rename(&source, &destination) {
                Ok(()) => {
                    tracing::debug!("Moved {} to {}", source.display(), destination.display());
                    report.moved.push(destination);
                }
                Err(e) => {
                    tracing::warn!("Skipping backup {}: {}", source.display(), e);
                    report.failures.push(RotationFailure {
                        slot,
                        path: source,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if report.moved_count() > 0 {
            tracing::info!(
                "Moved {} backups of {} into {}",
                report.moved_count(),
                layout.stem,
                layout.backup_dir.display()
            );
        }
        report
    }

    /// Rotated backups of the working file, newest (highest slot) first.
    pub fn list_backups(&self, working_path: &Path) -> Result<Vec<BackupEntry>> {
        let Some(layout) = self.layout(working_path) else {
            return Ok(Vec::new());
        };
        if !self.fs.exists(&layout.backup_dir) {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for slot in BackupSlot::range(self.slots).rev() {
            let file_name = layout.file_name(slot);
            let path = layout.backup_dir.join(&file_name);
            if !self.fs.exists(&path) {
                continue;
            }
            let stat = match self.fs.stat(&path) {
                Ok(stat) => stat,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(VersaveError::io("stat", path, e)),
            };
            entries.push(BackupEntry {
                slot,
                path,
                file_name,
                size: stat.size,
                modified: stat.modified,
            });
        }
        Ok(entries)
    }

    /// Location of a rotated backup, whether or not it exists.
    pub fn backup_path(&self, working_path: &Path, slot: u32) -> Result<PathBuf> {
        let slot = self.slot(slot)?;
        let layout = self
            .layout(working_path)
            .ok_or_else(|| VersaveError::BackupNotFound {
                path: working_path.to_path_buf(),
            })?;
        Ok(layout.backup_dir.join(layout.file_name(slot)))
    }

    /// Delete one rotated backup.
    pub fn delete_backup(&self, working_path: &Path, slot: u32) -> Result<PathBuf> {
        let path = self.backup_path(working_path, slot)?;
        if !self.fs.exists(&path) {
            return Err(VersaveError::BackupNotFound { path });
        }
        self.fs
            .remove(&path)
            .map_err(|e| VersaveError::io("delete", &path, e))?;
        tracing::info!("Deleted backup {}", path.display());
        Ok(path)
    }

    fn slot(&self, slot: u32) -> Result<BackupSlot> {
        BackupSlot::new(slot)
            .filter(|s| s.get() <= self.slots)
            .ok_or(VersaveError::InvalidSlot {
                slot,
                max: self.slots,
            })
    }

    fn layout(&self, working_path: &Path) -> Option<BackupLayout> {
        let stem = working_path.file_stem()?.to_str()?.to_string();
        let ext_base = if self.extension_base.is_empty() {
            working_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_string()
        } else {
            self.extension_base.trim_start_matches('.').to_string()
        };
        let working_dir = working_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let backup_dir = working_dir.join(&self.directory);
        Some(BackupLayout {
            working_dir,
            backup_dir,
            stem,
            ext_base,
        })
    }
}
