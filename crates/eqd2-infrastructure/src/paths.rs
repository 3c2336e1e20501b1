//! Unified path management for persisted EQD2 data.
//!
//! All persisted state lives under a single per-user config directory so
//! behavior is consistent across Linux, macOS, and Windows.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path resolution for the application.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/eqd2/                    # Config directory (platform-dependent)
/// └── calculation_history.json       # Persisted calculation history
/// ```
pub struct Eqd2Paths;

impl Eqd2Paths {
    /// Returns the application configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: e.g. `~/.config/eqd2/` on Linux
    /// - `Err(PathError::HomeDirNotFound)`: could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("eqd2"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the default path of the persisted calculation history.
    pub fn history_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("calculation_history.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_file_lives_under_config_dir() {
        // Skip on environments with no resolvable home directory.
        let Ok(config) = Eqd2Paths::config_dir() else {
            return;
        };
        let history = Eqd2Paths::history_file().unwrap();

        assert!(history.starts_with(&config));
        assert_eq!(
            history.file_name().unwrap().to_string_lossy(),
            "calculation_history.json"
        );
        assert!(config.ends_with("eqd2"));
    }
}
