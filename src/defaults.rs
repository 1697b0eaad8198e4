//! Default values for repo-manager configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Returns the default directory searched for repo descriptors.
///
/// Uses the platform-appropriate config directory:
/// - Linux: `~/.config/repo-manager` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/repo-manager`
/// - Windows: `{FOLDERID_RoamingAppData}\repo-manager`
///
/// Falls back to `~/.config/repo-manager` (tilde unexpanded, see
/// [`expand_tilde`]) if the platform directory cannot be determined.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("repo-manager")
}

/// Replace a leading `~` component with the home directory.
///
/// Paths not starting with `~`, and every path when the home directory is
/// unknown, are returned as they are. `~user` forms are not supported.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
