//! First save of a brand-new project.
//!
//! A new project gets its own folder named after the project, a few empty
//! working folders for downstream tools, and a first file with an explicit
//! version suffix:
//!
//! ```text
//! <parent>/
//! └── scene/
//!     ├── render/
//!     ├── tex/
//!     └── scene_v1.blend
//! ```

use std::path::{Path, PathBuf};

use crate::config::VersaveConfig;
use crate::error::{Result, VersaveError};
use crate::grammar::{self, ProjectName, VersionNumber, VersionedFilename};
use crate::host::FileSystem;

/// Derives the first-version path and creates the project layout.
#[derive(Debug, Clone)]
pub struct ProjectBootstrapper<'a, F: FileSystem> {
    fs: &'a F,
    default_extension: String,
    subdirectories: Vec<String>,
}

impl<'a, F: FileSystem> ProjectBootstrapper<'a, F> {
    pub fn new(fs: &'a F, default_extension: &str, subdirectories: Vec<String>) -> Self {
        Self {
            fs,
            default_extension: grammar::normalize_extension(default_extension),
            subdirectories,
        }
    }

    pub fn from_config(fs: &'a F, config: &VersaveConfig) -> Self {
        Self::new(
            fs,
            &config.default_extension,
            config.project.subdirectories.clone(),
        )
    }

    /// The path the first save should be written to, without touching disk.
    pub fn plan(&self, candidate: &Path) -> Result<(PathBuf, PathBuf)> {
        let file_name = candidate
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| VersaveError::InvalidCandidate {
                path: candidate.to_path_buf(),
            })?;

        let (stem, extension) = grammar::split_file_name(file_name);
        let extension = if extension.is_empty() {
            self.default_extension.as_str()
        } else {
            extension
        };

        // A user-supplied suffix is honored as is. One that does not parse
        // (`_v0`) still names the project and starts at version 1.
        let (project, version) = grammar::parse(stem)
            .unwrap_or_else(|| (ProjectName::from_stem(stem), VersionNumber::FIRST));

        let parent = candidate.parent().unwrap_or_else(|| Path::new(""));
        let root = parent.join(project.as_str());
        let final_path = root.join(
            VersionedFilename::new(project, version)
                .with_extension(extension)
                .file_name(),
        );
        Ok((root, final_path))
    }

    /// Create `<parent>/<project>/` and its subfolders, returning the path of
    /// the first version file.
    ///
    /// Existing folders are fine. The first folder that cannot be created
    /// aborts the whole operation; folders created before it stay on disk.
    pub fn initialize(&self, candidate: &Path) -> Result<PathBuf> {
        let (root, final_path) = self.plan(candidate)?;

        let layout = std::iter::once(root.clone())
            .chain(self.subdirectories.iter().map(|sub| root.join(sub)));
        for dir in layout {
            self.fs
                .create_dir(&dir)
                .map_err(|source| VersaveError::ProjectLayout {
                    root: root.clone(),
                    failed: dir.clone(),
                    source,
                })?;
        }

        tracing::info!(
            "Created project layout {} for {}",
            root.display(),
            final_path.display()
        );
        Ok(final_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StdFileSystem;
    use std::fs;
    use tempfile::tempdir;

    fn bootstrapper(fs: &StdFileSystem) -> ProjectBootstrapper<'_, StdFileSystem> {
        ProjectBootstrapper::from_config(fs, &VersaveConfig::default())
    }

    #[test]
    fn test_initialize_creates_layout() {
        let dir = tempdir().unwrap();
        let fs = StdFileSystem;

        let path = bootstrapper(&fs)
            .initialize(&dir.path().join("scene.blend"))
            .unwrap();

        assert_eq!(path, dir.path().join("scene").join("scene_v1.blend"));
        assert!(dir.path().join("scene").is_dir());
        assert!(dir.path().join("scene/render").is_dir());
        assert!(dir.path().join("scene/tex").is_dir());
        assert!(!path.exists());
    }

    #[test]
    fn test_user_suffix_is_honored() {
        let dir = tempdir().unwrap();
        let fs = StdFileSystem;

        let path = bootstrapper(&fs)
            .initialize(&dir.path().join("scene_v4.blend"))
            .unwrap();

        assert_eq!(path, dir.path().join("scene").join("scene_v4.blend"));
    }

    #[test]
    fn test_zero_suffix_starts_at_version_one() {
        let fs = StdFileSystem;
        let (root, path) = bootstrapper(&fs)
            .plan(Path::new("work/scene_v0.blend"))
            .unwrap();
        assert_eq!(root, Path::new("work/scene"));
        assert_eq!(path, Path::new("work/scene/scene_v1.blend"));
    }

    #[test]
    fn test_missing_extension_uses_default() {
        let fs = StdFileSystem;
        let (root, path) = bootstrapper(&fs).plan(Path::new("work/untitled")).unwrap();
        assert_eq!(root, Path::new("work/untitled"));
        assert_eq!(path, Path::new("work/untitled/untitled_v1.blend"));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let dir = tempdir().unwrap();
        let fs = StdFileSystem;
        let candidate = dir.path().join("scene.blend");

        let first = bootstrapper(&fs).initialize(&candidate).unwrap();
        let second = bootstrapper(&fs).initialize(&candidate).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_blocked_layout_is_one_error() {
        let dir = tempdir().unwrap();
        let fs = StdFileSystem;
        // A file where the project folder should go.
        fs::write(dir.path().join("scene"), b"in the way").unwrap();

        let err = bootstrapper(&fs)
            .initialize(&dir.path().join("scene.blend"))
            .unwrap_err();

        match err {
            VersaveError::ProjectLayout { root, failed, .. } => {
                assert_eq!(root, dir.path().join("scene"));
                assert_eq!(failed, root);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blocked_subfolder_is_reported() {
        let dir = tempdir().unwrap();
        let fs = StdFileSystem;
        fs::create_dir(dir.path().join("scene")).unwrap();
        fs::write(dir.path().join("scene/render"), b"in the way").unwrap();

        let err = bootstrapper(&fs)
            .initialize(&dir.path().join("scene.blend"))
            .unwrap_err();

        match err {
            VersaveError::ProjectLayout { root, failed, .. } => {
                assert_eq!(root, dir.path().join("scene"));
                assert_eq!(failed, root.join("render"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dir.path().join("scene/tex").exists());
    }

    #[test]
    fn test_invalid_candidate() {
        let fs = StdFileSystem;
        let err = bootstrapper(&fs).plan(Path::new("/")).unwrap_err();
        assert!(matches!(err, VersaveError::InvalidCandidate { .. }));
    }
}
