//! Single-slot backups next to the original file.
//!
//! `icon.svg` is backed up to `icon.svg.backup`. The first backup wins: later
//! calls never overwrite it, so a revert always returns to the state before
//! the first destructive edit.

use std::fs;
use std::path::{Path, PathBuf};

use super::IconError;

/// Backup path for an icon file.
pub fn backup_path(path: &Path) -> PathBuf {
    path.with_extension("svg.backup")
}

/// Copy `path` to its backup slot unless a backup already exists.
pub fn backup(path: &Path) -> Result<PathBuf, IconError> {
    let target = backup_path(path);
    if target.exists() {
        crate::debug!("edit"; "backup already present: {}", target.display());
        return Ok(target);
    }
    fs::copy(path, &target).map_err(IconError::io(path))?;
    crate::debug!("edit"; "backed up {}", path.display());
    Ok(target)
}

/// Restore `path` from its backup. The backup is kept.
///
/// The backup is copied next to the icon first and renamed over it, so
/// readers never see a half-written file.
pub fn revert(path: &Path) -> Result<(), IconError> {
    let source = backup_path(path);
    if !source.is_file() {
        return Err(IconError::NoBackup(path.to_path_buf()));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.revert"));
    fs::copy(&source, &tmp).map_err(IconError::io(&tmp))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        IconError::Io(path.to_path_buf(), e)
    })
}
