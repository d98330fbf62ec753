//! Locating and loading the settings file.
//!
//! Without `--config`, settings come from the platform config folder:
//! - macOS: ~/Library/Application Support/org.versave.versave/
//! - Windows: %APPDATA%/versave/versave/config/
//! - Linux: ~/.config/versave/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use versave_core::{VersaveConfig, VersaveError};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "versave";
const APP_NAME: &str = "versave";
const CONFIG_FILENAME: &str = "versave.toml";

/// Default settings file location, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Load settings from `explicit`, or from the default location.
///
/// An explicit file must exist and parse. The default file is optional, and
/// a broken one is reported and replaced by defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<VersaveConfig> {
    if let Some(path) = explicit {
        return VersaveConfig::load(path)
            .with_context(|| format!("load settings from {}", path.display()));
    }

    let Some(path) = default_config_path() else {
        tracing::debug!("No platform config folder, using default settings");
        return Ok(VersaveConfig::default());
    };
    Ok(load_optional(&path))
}

fn load_optional(path: &Path) -> VersaveConfig {
    if !path.is_file() {
        tracing::debug!("No settings file at {}, using defaults", path.display());
        return VersaveConfig::default();
    }
    match VersaveConfig::load(path) {
        Ok(config) => {
            tracing::info!("Loaded settings from {}", path.display());
            config
        }
        Err(VersaveError::Config { message, .. }) => {
            tracing::warn!(
                "Failed to parse {}: {}, using defaults",
                path.display(),
                message
            );
            VersaveConfig::default()
        }
        Err(e) => {
            tracing::warn!("{}, using defaults", e);
            VersaveConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_path_file_name() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(CONFIG_FILENAME));
        }
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "default_extension = \".ma\"\n[backup]\nmax_slots = 4\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.default_extension, ".ma");
        assert_eq!(config.backup.slots(), 4);
        assert!(config.discovery.implicit_first_version);
    }

    #[test]
    fn test_broken_explicit_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "backup = [").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.downcast_ref::<VersaveError>().is_some());
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_broken_default_config_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "backup = [").unwrap();

        assert_eq!(load_optional(&path), VersaveConfig::default());
        assert_eq!(
            load_optional(&dir.path().join("absent.toml")),
            VersaveConfig::default()
        );
    }
}
