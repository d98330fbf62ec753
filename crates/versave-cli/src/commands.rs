//! Command implementations.
//!
//! Every command opens the working file in a [`FileSession`], runs one
//! operation through the core and returns its result for printing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info_span};

use versave_core::{
    BackupEntry, BackupRotator, FileSession, RotationReport, SaveReport, StdFileSystem, Versave,
    VersaveConfig, VersaveError, VersionSet, VersionSwitcher,
};

/// Exit code for a command that succeeded.
pub const EXIT_OK: i32 = 0;
/// Exit code for a failed command.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when the user has to act first (unsaved changes, stale or
/// existing version).
pub const EXIT_BLOCKED: i32 = 2;

/// Map an error to the process exit code.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<VersaveError>() {
        Some(err) if err.needs_user_action() => EXIT_BLOCKED,
        _ => EXIT_FAILURE,
    }
}

/// Start a new project at `candidate`, optionally seeded with an existing file.
pub fn run_init(
    candidate: &Path,
    from: Option<&Path>,
    config: &VersaveConfig,
) -> Result<SaveReport> {
    let candidate = absolute(candidate)?;
    let _span = info_span!("init", candidate = %candidate.display()).entered();

    let mut session = new_session(config);
    if let Some(from) = from {
        let contents = fs::read(from).with_context(|| format!("read {}", from.display()))?;
        session.set_contents(contents);
    }

    let mut versave = Versave::with_std_fs(session, config.clone());
    versave
        .save_next(Some(&candidate))
        .with_context(|| format!("initialize project at {}", candidate.display()))
}

/// Save `file` in place and rotate its backups.
pub fn run_save(file: &Path, config: &VersaveConfig) -> Result<SaveReport> {
    let mut versave = open_service(file, config)?;
    versave
        .save(None)
        .with_context(|| format!("save {}", file.display()))
}

/// Save `file` as the next version.
pub fn run_next(file: &Path, config: &VersaveConfig) -> Result<SaveReport> {
    let mut versave = open_service(file, config)?;
    versave
        .save_next(None)
        .with_context(|| format!("save next version of {}", file.display()))
}

/// Versions of the project `file` belongs to, with `file` marked current.
pub fn run_list(file: &Path, config: &VersaveConfig) -> Result<VersionSet> {
    let file = absolute(file)?;
    debug!("Listing versions next to {}", file.display());
    VersionSwitcher::new(&StdFileSystem)
        .with_implicit_base(config.discovery.implicit_first_version)
        .siblings(&file)
        .with_context(|| format!("list versions of {}", file.display()))
}

/// Switch from `current` to `target`. `modified` simulates unsaved edits.
pub fn run_open(
    current: &Path,
    target: &Path,
    modified: bool,
    config: &VersaveConfig,
) -> Result<PathBuf> {
    let target = absolute(target)?;
    let mut versave = open_service(current, config)?;
    if modified {
        versave.session_mut().mark_dirty();
    }
    versave
        .open(&target)
        .with_context(|| format!("open {}", target.display()))
}

/// Move the numbered backups of `file` into the backup folder.
pub fn run_rotate(file: &Path, config: &VersaveConfig) -> Result<RotationReport> {
    let file = absolute(file)?;
    Ok(BackupRotator::new(&StdFileSystem, &config.backup).rotate(&file))
}

/// Rotated backups of `file`, newest first.
pub fn run_backups(file: &Path, config: &VersaveConfig) -> Result<Vec<BackupEntry>> {
    let file = absolute(file)?;
    BackupRotator::new(&StdFileSystem, &config.backup)
        .list_backups(&file)
        .with_context(|| format!("list backups of {}", file.display()))
}

/// Delete one rotated backup of `file`.
pub fn run_delete_backup(file: &Path, slot: u32, config: &VersaveConfig) -> Result<PathBuf> {
    let file = absolute(file)?;
    BackupRotator::new(&StdFileSystem, &config.backup)
        .delete_backup(&file, slot)
        .with_context(|| format!("delete backup {} of {}", slot, file.display()))
}

fn open_service(file: &Path, config: &VersaveConfig) -> Result<Versave<FileSession>> {
    let file = absolute(file)?;
    let session = FileSession::open(&file)
        .with_context(|| format!("open {}", file.display()))?
        .with_backup_count(config.session.backup_count);
    Ok(Versave::with_std_fs(session, config.clone()))
}

fn new_session(config: &VersaveConfig) -> FileSession {
    FileSession::new().with_backup_count(config.session.backup_count)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("resolve {}", path.display()))
}

