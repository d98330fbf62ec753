//! Versioned saves for single-file projects.
//!
//! Instead of overwriting one file, every incremental save writes a new
//! sibling with the next version number, so the project folder keeps the
//! full history:
//!
//! ```text
//! scene/
//! ├── backup/
//! │   └── scene_v2.blend1
//! ├── render/
//! ├── tex/
//! ├── scene_v1.blend
//! ├── scene_v2.blend
//! └── scene_v3.blend
//! ```
//!
//! # Features
//!
//! - **Filename grammar** for `<project>_v<N>` names and the next version
//! - **Version discovery** of the siblings of the open file
//! - **Project bootstrap** for the first save of a new project
//! - **Guarded switching** that never discards unsaved changes
//! - **Backup rotation** that moves host backups out of the project folder
//!
//! # Example
//!
//! ```ignore
//! use versave_core::{FileSession, Versave, VersaveConfig};
//!
//! let session = FileSession::open(Path::new("scene/scene_v1.blend"))?;
//! let mut versave = Versave::with_std_fs(session, VersaveConfig::default());
//!
//! let report = versave.save_next(None)?;
//! assert!(report.outcome.path.ends_with("scene_v2.blend"));
//! ```
//!
//! # Architecture
//!
//! - `grammar` - Filename parsing and formatting
//! - `discovery` - Listing versions in a directory
//! - `bootstrap` - Project folder creation
//! - `guard` - Unsaved-changes precondition
//! - `switcher` - Loading another version
//! - `save` - Incremental and in-place saves
//! - `backup` - Numbered backup rotation
//! - `host` - Session and file system interfaces
//! - `service` - The [`Versave`] facade
//! - `error.rs` - Error types with user-friendly messages

pub mod backup;
pub mod bootstrap;
pub mod config;
pub mod discovery;
mod error;
pub mod grammar;
pub mod guard;
pub mod host;
pub mod save;
pub mod service;
pub mod switcher;

pub use backup::{BackupEntry, BackupRotator, BackupSlot, RotationFailure, RotationReport};
pub use bootstrap::ProjectBootstrapper;
pub use config::{MAX_BACKUP_SLOTS, VersaveConfig};
pub use discovery::{VersionDiscovery, VersionEntry, VersionSet};
pub use error::{Result, VersaveError};
pub use grammar::{ProjectName, VersionNumber, VersionedFilename};
pub use guard::{BlockReason, Clearance, WorkingFileState, check_clearance};
pub use host::{DirtyTracker, FileSession, FileStat, FileSystem, Session, StdFileSystem};
pub use save::{IncrementalSaveController, SaveOutcome};
pub use service::{SaveReport, Versave};
pub use switcher::VersionSwitcher;
