//! Switching the session to another version of the open project.

use std::path::{Path, PathBuf};

use crate::discovery::{self, VersionDiscovery, VersionSet};
use crate::error::{Result, VersaveError};
use crate::grammar::ProjectName;
use crate::guard::{BlockReason, Clearance, check_clearance};
use crate::host::{FileSystem, Session};

/// Loads a sibling version into the session, guarded against losing edits.
///
/// Never writes, renames or deletes files.
#[derive(Debug, Clone)]
pub struct VersionSwitcher<'a, F: FileSystem> {
    fs: &'a F,
    implicit_base: bool,
}

impl<'a, F: FileSystem> VersionSwitcher<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self {
            fs,
            implicit_base: false,
        }
    }

    /// Accept the unversioned `<project><ext>` as version 1.
    #[must_use]
    pub fn with_implicit_base(mut self, enable: bool) -> Self {
        self.implicit_base = enable;
        self
    }

    /// Versions of the project `current` belongs to, from its directory.
    ///
    /// Only files with the working file's extension are listed.
    pub fn siblings(&self, current: &Path) -> Result<VersionSet> {
        let project = ProjectName::from_path(current)
            .ok_or(VersaveError::Blocked(BlockReason::NoProjectContext))?;
        VersionDiscovery::new(self.fs)
            .with_implicit_base(self.implicit_base)
            .with_working_file(current)
            .list(&discovery::parent_dir(current), &project)
    }

    /// Replace the session's working state with `target`.
    ///
    /// Refuses when the session has unsaved changes or no saved file, when
    /// `target` is gone, or when it is not a version of the open project.
    pub fn open<S: Session>(&self, session: &mut S, target: &Path) -> Result<PathBuf> {
        let state = session.working_state();
        let current = match (check_clearance(&state), state.path) {
            (Clearance::Clear, Some(current)) => current,
            (Clearance::Blocked(reason), _) => {
                tracing::warn!("Not opening {}: {}", target.display(), reason);
                return Err(VersaveError::Blocked(reason));
            }
            (Clearance::Clear, None) => {
                return Err(VersaveError::Blocked(BlockReason::NoProjectContext));
            }
        };

        let versions = self.siblings(&current)?;
        let Some(entry) = versions.find(target) else {
            if !self.fs.exists(target) {
                return Err(VersaveError::StaleReference {
                    path: target.to_path_buf(),
                });
            }
            return Err(VersaveError::NotAVersion {
                path: target.to_path_buf(),
                project: versions.project.to_string(),
            });
        };
        let path = entry.path.clone();

        // Listing and loading are not atomic; check again right before loading.
        if !self.fs.exists(&path) {
            return Err(VersaveError::StaleReference { path });
        }

        session
            .load(&path)
            .map_err(|e| VersaveError::io("load", &path, e))?;
        tracing::info!("Switched to {}", path.display());
        Ok(path)
    }
}
