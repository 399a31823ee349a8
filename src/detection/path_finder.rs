//! PATH-based executable lookup and home directory expansion.

use std::path::{Path, PathBuf};

/// System fallback paths to check if executable not found in PATH.
const FALLBACK_PATHS: &[&str] = &["/usr/bin", "/bin", "/usr/sbin"];

/// Find an external tool by name.
///
/// Tries the system PATH via the `which` crate first, then the standard
/// system directories, which a GUI-launched process may not have on PATH.
pub(crate) fn find_executable(name: &str) -> Option<PathBuf> {
    if let Ok(path) = which::which(name) {
        return Some(path);
    }

    FALLBACK_PATHS
        .iter()
        .map(|dir| Path::new(dir).join(name))
        .find(|path| path.exists())
}

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a leading `~` component, or with no resolvable home
/// directory, are returned unchanged.
pub(crate) fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
