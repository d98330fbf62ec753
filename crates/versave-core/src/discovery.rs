//! Version discovery in a project directory.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{Result, VersaveError};
use crate::grammar::{self, ProjectName, VersionNumber, VersionedFilename};
use crate::host::FileSystem;

/// One version of a project found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    pub path: PathBuf,
    /// Name on disk. Differs from `name` for the implicit first version.
    pub file_name: String,
    pub name: VersionedFilename,
    pub size: u64,
    pub modified: DateTime<Local>,
    /// Whether this is the file open in the session.
    pub is_current: bool,
    /// An unversioned `<project><ext>` standing in for version 1.
    pub implicit: bool,
}

impl VersionEntry {
    #[inline]
    pub fn version(&self) -> VersionNumber {
        self.name.version()
    }
}

/// Versions of one project in one directory, ascending by number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSet {
    pub project: ProjectName,
    pub directory: PathBuf,
    entries: Vec<VersionEntry>,
}

impl VersionSet {
    pub fn empty(project: ProjectName, directory: PathBuf) -> Self {
        Self {
            project,
            directory,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[VersionEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VersionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&VersionEntry> {
        self.entries.last()
    }

    pub fn versions(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.version().get()).collect()
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.file_name.as_str()).collect()
    }

    /// Find the entry for `path`, compared lexically by directory and file name.
    pub fn find(&self, path: &Path) -> Option<&VersionEntry> {
        if !in_directory(path, &self.directory) {
            return None;
        }
        let file_name = path.file_name()?.to_str()?;
        self.entries.iter().find(|e| e.file_name == file_name)
    }
}

impl<'a> IntoIterator for &'a VersionSet {
    type Item = &'a VersionEntry;
    type IntoIter = std::slice::Iter<'a, VersionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Scans a directory for `<project>_v<N>` files.
#[derive(Debug, Clone)]
pub struct VersionDiscovery<'a, F: FileSystem> {
    fs: &'a F,
    extension: Option<String>,
    implicit_base: bool,
    current: Option<PathBuf>,
}

impl<'a, F: FileSystem> VersionDiscovery<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self {
            fs,
            extension: None,
            implicit_base: false,
            current: None,
        }
    }

    /// Only keep files with this extension (`.blend` or `blend`).
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = Some(grammar::normalize_extension(extension));
        self
    }

    /// Report `<project><ext>` as version 1 when no explicit `_v1` exists.
    #[must_use]
    pub fn with_implicit_base(mut self, enable: bool) -> Self {
        self.implicit_base = enable;
        self
    }

    /// Mark the entry matching this path as current.
    #[must_use]
    pub fn with_current(mut self, current: Option<PathBuf>) -> Self {
        self.current = current;
        self
    }

    /// Mark `current` and list only files sharing its extension.
    #[must_use]
    pub fn with_working_file(self, current: &Path) -> Self {
        let discovery = self.with_current(Some(current.to_path_buf()));
        match current.extension().and_then(|e| e.to_str()) {
            Some(extension) => discovery.with_extension(extension),
            None => discovery,
        }
    }

    /// List the versions of `project` directly inside `directory`.
    ///
    /// A directory that does not exist has no versions.
    pub fn list(&self, directory: &Path, project: &ProjectName) -> Result<VersionSet> {
        if !self.fs.exists(directory) {
            tracing::debug!("{} does not exist, no versions", directory.display());
            return Ok(VersionSet::empty(project.clone(), directory.to_path_buf()));
        }

        let mut candidates: Vec<(String, PathBuf)> = self
            .fs
            .list_entries(directory)
            .map_err(|e| VersaveError::io("list", directory, e))?
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_string();
                Some((name, path))
            })
            .filter(|(name, _)| self.extension_matches(name))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut by_version: BTreeMap<VersionNumber, VersionEntry> = BTreeMap::new();
        let mut implicit_candidate = None;

        for (file_name, path) in candidates {
            let (stem, extension) = grammar::split_file_name(&file_name);
            let Some((found, version)) = grammar::parse(stem) else {
                if self.implicit_base && stem == project.as_str() && implicit_candidate.is_none()
                {
                    implicit_candidate = Some((file_name, path));
                }
                continue;
            };
            if &found != project {
                continue;
            }
            if let Some(existing) = by_version.get(&version) {
                tracing::debug!(
                    "Ignoring {} (version {} already provided by {})",
                    file_name,
                    version,
                    existing.file_name
                );
                continue;
            }
            let name = VersionedFilename::new(found, version).with_extension(extension);
            if let Some(entry) = self.entry(path, file_name, name, false)? {
                by_version.insert(version, entry);
            }
        }

        if let Some((file_name, path)) = implicit_candidate
            && !by_version.contains_key(&VersionNumber::FIRST)
        {
            let (_, extension) = grammar::split_file_name(&file_name);
            let name = VersionedFilename::new(project.clone(), VersionNumber::FIRST)
                .with_extension(extension);
            if let Some(entry) = self.entry(path, file_name, name, true)? {
                by_version.insert(VersionNumber::FIRST, entry);
            }
        }

        let entries: Vec<VersionEntry> = by_version.into_values().collect();
        tracing::debug!(
            "Found {} versions of '{}' in {}",
            entries.len(),
            project,
            directory.display()
        );

        Ok(VersionSet {
            project: project.clone(),
            directory: directory.to_path_buf(),
            entries,
        })
    }

    fn extension_matches(&self, file_name: &str) -> bool {
        match &self.extension {
            Some(wanted) => grammar::split_file_name(file_name).1 == wanted.as_str(),
            None => true,
        }
    }

    /// Stat a candidate. A file that vanished since listing is skipped.
    fn entry(
        &self,
        path: PathBuf,
        file_name: String,
        name: VersionedFilename,
        implicit: bool,
    ) -> Result<Option<VersionEntry>> {
        let stat = match self.fs.stat(&path) {
            Ok(stat) => stat,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("{} vanished during discovery", path.display());
                return Ok(None);
            }
            Err(e) => return Err(VersaveError::io("stat", path, e)),
        };
        let is_current = self.current.as_deref().is_some_and(|current| {
            current.file_name().and_then(|n| n.to_str()) == Some(file_name.as_str())
                && path.parent().is_some_and(|dir| in_directory(current, dir))
        });
        Ok(Some(VersionEntry {
            path,
            file_name,
            name,
            size: stat.size,
            modified: stat.modified,
            is_current,
            implicit,
        }))
    }
}

/// List the versions of `project` in `directory` with default settings.
pub fn list<F: FileSystem>(fs: &F, directory: &Path, project: &ProjectName) -> Result<VersionSet> {
    VersionDiscovery::new(fs).list(directory, project)
}

/// Directory holding `path`; `.` for a bare file name.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether `path` sits directly in `directory`. A bare file name counts as
/// being in any directory.
fn in_directory(path: &Path, directory: &Path) -> bool {
    match path.parent() {
        None => true,
        Some(parent) if parent.as_os_str().is_empty() => true,
        Some(parent) => parent == directory,
    }
}
