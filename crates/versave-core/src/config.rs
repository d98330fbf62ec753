//! Configuration for versioned saves.
//!
//! Stored as TOML. Every key is optional; missing keys take the defaults
//! below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VersaveError};

/// Hard cap on numbered backup slots.
pub const MAX_BACKUP_SLOTS: u32 = 32;

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersaveConfig {
    /// Extension appended to a first-save path that has none.
    pub default_extension: String,
    pub project: ProjectLayoutConfig,
    pub discovery: DiscoveryConfig,
    pub backup: BackupConfig,
    pub session: SessionConfig,
}

impl Default for VersaveConfig {
    fn default() -> Self {
        Self {
            default_extension: ".blend".to_string(),
            project: ProjectLayoutConfig::default(),
            discovery: DiscoveryConfig::default(),
            backup: BackupConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Directory layout created for a new project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLayoutConfig {
    /// Empty folders created under the project root.
    pub subdirectories: Vec<String>,
}

impl Default for ProjectLayoutConfig {
    fn default() -> Self {
        Self {
            subdirectories: vec!["render".to_string(), "tex".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// List an unversioned `<project><ext>` as version 1 when no `_v1` exists.
    pub implicit_first_version: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            implicit_first_version: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Subdirectory of the working directory that receives backups.
    pub directory: String,
    /// Backup extension without slot number. Empty: the working file's
    /// extension (`blend` for `scene.blend`).
    pub extension_base: String,
    /// Number of slots scanned. Capped at [`MAX_BACKUP_SLOTS`].
    pub max_slots: u32,
    /// Rotate after every successful save.
    pub rotate_on_save: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory: "backup".to_string(),
            extension_base: String::new(),
            max_slots: MAX_BACKUP_SLOTS,
            rotate_on_save: true,
        }
    }
}

impl BackupConfig {
    /// Effective slot count.
    pub fn slots(&self) -> u32 {
        self.max_slots.min(MAX_BACKUP_SLOTS)
    }
}

/// Settings for the file-backed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Numbered backups kept when a save overwrites an existing file.
    pub backup_count: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { backup_count: 1 }
    }
}

impl VersaveConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read and parse a settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| VersaveError::io("read", path, e))?;
        let config = Self::from_toml_str(&content).map_err(|e| VersaveError::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        if config.backup.max_slots > MAX_BACKUP_SLOTS {
            tracing::warn!(
                "backup.max_slots = {} exceeds the limit, using {}",
                config.backup.max_slots,
                MAX_BACKUP_SLOTS
            );
        }
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = VersaveConfig::default();
        assert_eq!(config.default_extension, ".blend");
        assert_eq!(config.project.subdirectories, vec!["render", "tex"]);
        assert!(config.discovery.implicit_first_version);
        assert_eq!(config.backup.directory, "backup");
        assert_eq!(config.backup.slots(), 32);
        assert_eq!(config.session.backup_count, 1);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = VersaveConfig::from_toml_str(
            r#"
            [backup]
            directory = "old"
            "#,
        )
        .unwrap();
        assert_eq!(config.backup.directory, "old");
        assert!(config.backup.rotate_on_save);
        assert_eq!(config.default_extension, ".blend");
    }

    #[test]
    fn test_slots_are_capped() {
        let config = VersaveConfig::from_toml_str("[backup]\nmax_slots = 99\n").unwrap();
        assert_eq!(config.backup.slots(), MAX_BACKUP_SLOTS);
    }

    #[test]
    fn test_round_trip() {
        let config = VersaveConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(VersaveConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("versave.toml");
        fs::write(&path, "backup = 3").unwrap();

        let result = VersaveConfig::load(&path);
        assert!(matches!(result, Err(VersaveError::Config { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = VersaveConfig::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(VersaveError::Io { .. })));
    }
}
