//! Incremental saving.
//!
//! Every incremental save writes a new sibling file with the next version
//! number. Earlier versions are never opened for writing again.

use std::path::{Path, PathBuf};

use crate::bootstrap::ProjectBootstrapper;
use crate::config::VersaveConfig;
use crate::error::{Result, VersaveError};
use crate::grammar;
use crate::host::{FileSystem, Session};

/// What a save wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// File that was written and is now open.
    pub path: PathBuf,
    /// File that was open before the save.
    pub previous: Option<PathBuf>,
    /// Whether a new project layout was created.
    pub bootstrapped: bool,
}

/// Saves the session as the next version of its project.
#[derive(Debug, Clone)]
pub struct IncrementalSaveController<'a, F: FileSystem> {
    fs: &'a F,
    bootstrapper: ProjectBootstrapper<'a, F>,
}

impl<'a, F: FileSystem> IncrementalSaveController<'a, F> {
    pub fn new(fs: &'a F, bootstrapper: ProjectBootstrapper<'a, F>) -> Self {
        Self { fs, bootstrapper }
    }

    pub fn from_config(fs: &'a F, config: &VersaveConfig) -> Self {
        Self::new(fs, ProjectBootstrapper::from_config(fs, config))
    }

    /// Sibling of `current` carrying the next version number.
    pub fn next_path(&self, current: &Path) -> Result<PathBuf> {
        let file_name = current
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| VersaveError::InvalidCandidate {
                path: current.to_path_buf(),
            })?;
        let (stem, extension) = grammar::split_file_name(file_name);
        let next = grammar::next_name(stem).with_extension(extension);
        Ok(current.with_file_name(next.file_name()))
    }

    /// Write the working state as the next version.
    ///
    /// A session without a file starts a new project at `candidate`.
    pub fn save_next<S: Session>(
        &self,
        session: &mut S,
        candidate: Option<&Path>,
    ) -> Result<SaveOutcome> {
        let Some(current) = session.current_file_path() else {
            return self.bootstrap(session, candidate);
        };

        let target = self.next_path(&current)?;
        if self.fs.exists(&target) {
            tracing::warn!("Refusing to overwrite {}", target.display());
            return Err(VersaveError::VersionExists { path: target });
        }

        session
            .save_as(&target)
            .map_err(|e| VersaveError::io("save", &target, e))?;
        tracing::info!("Saved {} after {}", target.display(), current.display());
        Ok(SaveOutcome {
            path: target,
            previous: Some(current),
            bootstrapped: false,
        })
    }

    /// Save in place, or start a new project when nothing was saved yet.
    pub fn save<S: Session>(
        &self,
        session: &mut S,
        candidate: Option<&Path>,
    ) -> Result<SaveOutcome> {
        let Some(current) = session.current_file_path() else {
            return self.bootstrap(session, candidate);
        };

        session
            .save()
            .map_err(|e| VersaveError::io("save", &current, e))?;
        Ok(SaveOutcome {
            path: current.clone(),
            previous: Some(current),
            bootstrapped: false,
        })
    }

    fn bootstrap<S: Session>(
        &self,
        session: &mut S,
        candidate: Option<&Path>,
    ) -> Result<SaveOutcome> {
        let candidate = candidate.ok_or(VersaveError::NoCandidatePath)?;

        let (_, planned) = self.bootstrapper.plan(candidate)?;
        if self.fs.exists(&planned) {
            return Err(VersaveError::VersionExists { path: planned });
        }

        let path = self.bootstrapper.initialize(candidate)?;
        session
            .save_as(&path)
            .map_err(|e| VersaveError::io("save", &path, e))?;
        tracing::info!("Started project at {}", path.display());
        Ok(SaveOutcome {
            path,
            previous: None,
            bootstrapped: true,
        })
    }
}
