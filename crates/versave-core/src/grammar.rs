//! Version suffix grammar for project file names.
//!
//! A versioned stem has the shape `<project>_v<N>`. The grammar only works on
//! strings; splitting off the extension is done with [`split_file_name`],
//! which follows the same rules as [`Path::file_stem`].

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// `<base>_v<digits>` with a non-empty base. ASCII digits only.
static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)_v([0-9]+)$").expect("Invalid version suffix regex"));

/// `<prefix><digits>` with a non-empty prefix.
static TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)([0-9]+)$").expect("Invalid trailing digits regex"));

/// Base identifier shared by every version of one working file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derive the project name from a file stem, stripping any `_v<N>` suffix.
    pub fn from_stem(stem: &str) -> Self {
        match VERSION_SUFFIX.captures(stem) {
            Some(caps) => Self::new(&caps[1]),
            None => Self::new(stem),
        }
    }

    /// Derive the project name from a file path.
    ///
    /// Returns `None` when the path has no UTF-8 file stem.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map(Self::from_stem)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ProjectName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProjectName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Positive version number. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VersionNumber(u64);

impl VersionNumber {
    pub const FIRST: Self = Self(1);

    /// Returns `None` for zero.
    #[must_use]
    pub const fn new(value: u64) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The following version, or `None` on overflow.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `(project, version)` pair plus the file extension it is stored with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersionedFilename {
    project: ProjectName,
    version: VersionNumber,
    /// Includes the leading dot, or empty.
    extension: String,
}

impl VersionedFilename {
    pub fn new(project: ProjectName, version: VersionNumber) -> Self {
        Self {
            project,
            version,
            extension: String::new(),
        }
    }

    /// Attach an extension. A missing leading dot is added.
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = normalize_extension(extension);
        self
    }

    /// Parse a full file name such as `scene_v3.blend`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (stem, extension) = split_file_name(file_name);
        let (project, version) = parse(stem)?;
        Some(Self {
            project,
            version,
            extension: extension.to_string(),
        })
    }

    pub fn project(&self) -> &ProjectName {
        &self.project
    }

    pub fn version(&self) -> VersionNumber {
        self.version
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// `<project>_v<N>` without extension.
    pub fn stem(&self) -> String {
        format(&self.project, self.version)
    }

    /// `<project>_v<N><ext>`.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.stem(), self.extension)
    }
}

impl fmt::Display for VersionedFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Split the version suffix off a stem.
///
/// Returns `None` when the stem has no `_v<N>` suffix (or `N` is zero or does
/// not fit in a `u64`). Leading zeros are accepted.
pub fn parse(name: &str) -> Option<(ProjectName, VersionNumber)> {
    let caps = VERSION_SUFFIX.captures(name)?;
    let version = caps[2].parse::<u64>().ok().and_then(VersionNumber::new)?;
    Some((ProjectName::new(&caps[1]), version))
}

/// Compute the name of the version that follows `name` (a stem).
///
/// Rules, tried in order:
/// 1. `<base>_v<N>` becomes `<base>_v<N+1>`.
/// 2. `<prefix><digits>` becomes `<prefix>_v<digits+1>`.
/// 3. anything else becomes `<name>_v2`; the unsuffixed name counts as version 1.
///
/// Rule 1 must run first: `draft_v2` also ends in a digit and would
/// otherwise turn into `draft_v_v3`.
pub fn next_name(name: &str) -> VersionedFilename {
    if let Some(caps) = VERSION_SUFFIX.captures(name)
        && let Some(version) = bump(&caps[2])
    {
        return VersionedFilename::new(ProjectName::new(&caps[1]), version);
    }

    if let Some(caps) = TRAILING_DIGITS.captures(name)
        && let Some(version) = bump(&caps[2])
    {
        return VersionedFilename::new(ProjectName::new(&caps[1]), version);
    }

    VersionedFilename::new(ProjectName::new(name), VersionNumber(2))
}

/// Render `<project>_v<version>`.
pub fn format(project: &ProjectName, version: VersionNumber) -> String {
    format!("{}_v{}", project, version)
}

/// Split a file name into stem and extension (with dot).
///
/// A leading dot is part of the stem, so `.hidden` has no extension.
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => (&file_name[..idx], &file_name[idx..]),
        _ => (file_name, ""),
    }
}

pub(crate) fn normalize_extension(extension: &str) -> String {
    if extension.is_empty() || extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}

fn bump(digits: &str) -> Option<VersionNumber> {
    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_add(1))
        .map(VersionNumber)
}
