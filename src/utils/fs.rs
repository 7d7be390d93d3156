// src/utils/fs.rs
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{StagehandResult, StagehandError};

/// Collect every regular file under `root`, descending into subdirectories.
///
/// Directories themselves are never emitted. Entries are visited depth-first
/// with each directory's children sorted by name, so the result is stable for
/// a fixed filesystem state. Any unreadable directory or unstattable entry
/// aborts the whole collection.
pub fn collect_files(root: &Path) -> StagehandResult<Vec<PathBuf>> {
    debug!("Collecting files under {}", root.display());

    let mut files = Vec::new();
    collect_into(root, &mut files)?;

    debug!("Collected {} files under {}", files.len(), root.display());
    Ok(files)
}

fn collect_into(dir: &Path, files: &mut Vec<PathBuf>) -> StagehandResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| StagehandError::DirectoryRead {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StagehandError::DirectoryRead {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        paths.push(entry.path());
    }
    paths.sort();

    for path in paths {
        let metadata = std::fs::symlink_metadata(&path).map_err(|e| StagehandError::Stat {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if metadata.is_dir() {
            collect_into(&path, files)?;
        } else if metadata.is_file() {
            files.push(path);
        }
        // Sockets, fifos and symlinks are neither files nor directories here;
        // they are skipped rather than followed.
    }

    Ok(())
}
