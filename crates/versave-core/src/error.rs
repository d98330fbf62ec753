//! Versioned-save error types.
//!
//! Every operation that can leave the user wondering what happened returns a
//! structured error with a user-facing message and an optional hint.
//! Conditions that are recovered locally (an unversioned name, a single
//! backup slot failing to move) are not represented here.

use std::path::PathBuf;
use thiserror::Error;

use crate::guard::BlockReason;

/// Versioned-save operation error.
#[derive(Debug, Error)]
pub enum VersaveError {
    /// A create/move/save/load primitive failed.
    #[error("Failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The project directory layout could not be created.
    #[error("Failed to create project layout at {root}")]
    ProjectLayout {
        root: PathBuf,
        failed: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A precondition prevents replacing the working file.
    #[error("Operation blocked: {0}")]
    Blocked(BlockReason),

    /// The selected file no longer exists.
    #[error("Version no longer exists: {path}")]
    StaleReference { path: PathBuf },

    /// The selected file exists but is not a version of the open project.
    #[error("{path} is not a version of project '{project}'")]
    NotAVersion { path: PathBuf, project: String },

    /// The next version is already on disk.
    #[error("Version already exists: {path}")]
    VersionExists { path: PathBuf },

    /// First save of a new project without a target path.
    #[error("No file path given for the first save of a new project")]
    NoCandidatePath,

    /// The first-save path has no usable file name.
    #[error("Not a valid project file path: {path}")]
    InvalidCandidate { path: PathBuf },

    /// Requested backup slot holds no file.
    #[error("Backup not found: {path}")]
    BackupNotFound { path: PathBuf },

    /// The session points at a rotated backup, which is never saved over.
    #[error("Refusing to save over backup {path}")]
    BackupIsReadOnly { path: PathBuf },

    /// Backup slot outside the supported range.
    #[error("Backup slot {slot} is out of range (1..={max})")]
    InvalidSlot { slot: u32, max: u32 },

    /// Configuration could not be read or parsed.
    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl VersaveError {
    /// Wrap an I/O error with the operation and path it concerns.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether the user has to act (save, discard or refresh) before retrying.
    pub fn needs_user_action(&self) -> bool {
        matches!(
            self,
            Self::Blocked(_)
                | Self::StaleReference { .. }
                | Self::VersionExists { .. }
                | Self::BackupIsReadOnly { .. }
        )
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {} {}", operation, path.display()),
            Self::ProjectLayout { root, failed, .. } => format!(
                "Could not create the project folder {} (failed at {})",
                root.display(),
                failed.display()
            ),
            Self::Blocked(reason) => reason.message().to_string(),
            Self::StaleReference { path } => format!(
                "'{}' no longer exists. It may have been moved or deleted.",
                file_label(path)
            ),
            Self::NotAVersion { path, project } => format!(
                "'{}' is not a saved version of '{}'.",
                file_label(path),
                project
            ),
            Self::VersionExists { path } => format!(
                "'{}' already exists and will not be overwritten.",
                file_label(path)
            ),
            Self::NoCandidatePath => "Choose where to save the new project first.".to_string(),
            Self::InvalidCandidate { path } => {
                format!("'{}' cannot be used as a project file name.", path.display())
            }
            Self::BackupNotFound { path } => {
                format!("Backup '{}' could not be found.", file_label(path))
            }
            Self::BackupIsReadOnly { path } => format!(
                "'{}' is a backup and cannot be saved over.",
                file_label(path)
            ),
            Self::InvalidSlot { slot, max } => {
                format!("Backup number {slot} is not valid (expected 1 to {max}).")
            }
            Self::Config { path, message } => {
                format!("The settings file {} is invalid: {}", path.display(), message)
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if matches!(*operation, "load" | "read" | "stat" | "list") {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check disk space and that you can write to this location.".into())
                }
            }
            Self::ProjectLayout { .. } => {
                Some("Pick a folder you can write to, or remove the partial project folder.".into())
            }
            Self::Blocked(BlockReason::UnsavedChanges) => {
                Some("Save or discard your changes, then switch again.".into())
            }
            Self::Blocked(BlockReason::NoProjectContext) => {
                Some("Save the project once before switching versions.".into())
            }
            Self::StaleReference { .. } => Some("Refresh the version list.".into()),
            Self::NotAVersion { .. } => None,
            Self::VersionExists { .. } => {
                Some("Open the latest version before saving the next one.".into())
            }
            Self::NoCandidatePath => None,
            Self::InvalidCandidate { .. } => {
                Some("Pick a file name such as 'scene.blend'.".into())
            }
            Self::BackupIsReadOnly { .. } => {
                Some("Start a new project from the restored backup instead.".into())
            }
            Self::BackupNotFound { .. } | Self::InvalidSlot { .. } => {
                Some("Refresh the backup list.".into())
            }
            Self::Config { .. } => Some("Fix or delete the settings file.".into()),
        }
    }
}

fn file_label(path: &std::path::Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
}

/// Result type alias for versioned-save operations.
pub type Result<T> = std::result::Result<T, VersaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VersaveError::StaleReference {
            path: PathBuf::from("/work/scene_v3.blend"),
        };
        assert_eq!(err.to_string(), "Version no longer exists: /work/scene_v3.blend");
        assert!(err.user_message().contains("scene_v3.blend"));
    }

    #[test]
    fn test_needs_user_action() {
        assert!(VersaveError::Blocked(BlockReason::UnsavedChanges).needs_user_action());
        assert!(!VersaveError::NoCandidatePath.needs_user_action());
    }

    #[test]
    fn test_blocked_suggestions_differ() {
        let dirty = VersaveError::Blocked(BlockReason::UnsavedChanges).suggestion();
        let none = VersaveError::Blocked(BlockReason::NoProjectContext).suggestion();
        assert_ne!(dirty, none);
    }
}
