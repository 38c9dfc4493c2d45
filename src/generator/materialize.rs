use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::SOURCE_DIRS;
use crate::error::{ScaffoldError, ScaffoldResult};

/// Create `path` and any missing parents
///
/// # Errors
///
/// Returns [`ScaffoldError::Write`] with the directory path.
pub fn ensure_dir(path: &Path) -> ScaffoldResult<()> {
    fs::create_dir_all(path).map_err(|source| ScaffoldError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `content` to `path`, replacing whatever is there, and log it
///
/// Regeneration is destructive: hand edits to a previously generated file are
/// lost. The parent directory is created if missing.
///
/// # Errors
///
/// Returns [`ScaffoldError::Write`] with the offending path. Nothing else is
/// affected; the caller decides whether to continue.
pub fn write_and_log(path: &Path, content: &str) -> ScaffoldResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    fs::write(path, content).map_err(|source| ScaffoldError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Created: {}", path.display());
    Ok(())
}

/// Create the expected `src/` skeleton under `src_dir`
///
/// Returns the directories in creation order. Existing directories are left
/// as they are.
///
/// # Errors
///
/// Returns [`ScaffoldError::Write`] for the first directory that cannot be
/// created.
pub fn create_layout(src_dir: &Path) -> ScaffoldResult<Vec<PathBuf>> {
    SOURCE_DIRS
        .iter()
        .map(|name| {
            let dir = src_dir.join(name);
            ensure_dir(&dir)?;
            Ok(dir)
        })
        .collect()
}
