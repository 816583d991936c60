//! Locating and creating the `.tally/` project directory.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Name of the project metadata directory.
pub const TALLY_DIR_NAME: &str = ".tally";

/// Environment variable that pins the project directory.
pub const TALLY_DIR_ENV: &str = "TALLY_DIR";

/// Finds the project directory for `start`.
///
/// `TALLY_DIR` wins when it names an existing directory; otherwise the
/// nearest `.tally/` in `start` or one of its ancestors is returned.
pub fn find_tally_dir(start: &Path) -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(TALLY_DIR_ENV).map(PathBuf::from) {
        if dir.is_dir() {
            return Some(dir);
        }
    }
    search_upwards(start)
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .map(|dir| dir.join(TALLY_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Like [`find_tally_dir`], failing with [`ConfigError::TallyDirNotFound`].
pub fn find_tally_dir_or_error(start: &Path) -> Result<PathBuf, ConfigError> {
    find_tally_dir(start).ok_or(ConfigError::TallyDirNotFound)
}

/// Creates `<path>/.tally` (or `path` itself if already named `.tally`).
pub fn ensure_tally_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let dir = if path.ends_with(TALLY_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(TALLY_DIR_NAME)
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
