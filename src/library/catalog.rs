//! Listings of icon trees, flags and infographics.
//!
//! Only one directory level is read: a folder is a direct subdirectory, and
//! its icons are the `.svg` files directly inside it. Missing tree roots list
//! as empty.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{IconError, ROOT_FOLDER};

/// A folder and the stems of the icons in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub name: String,
    pub icons: Vec<String>,
}

/// Entries of `dir` accepted by `keep`, or nothing if `dir` does not exist.
fn entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>, IconError> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(IconError::Io(dir.to_path_buf(), err)),
    };
    let mut paths = Vec::new();
    for entry in read {
        let path = entry.map_err(IconError::io(dir))?.path();
        if keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sorted stems of the SVG files directly in `dir`.
pub fn icon_stems(dir: &Path) -> Result<Vec<String>, IconError> {
    Ok(entries(dir, |p| has_extension(p, "svg"))?
        .iter()
        .map(|p| file_stem(p))
        .collect())
}

/// Folders of a tree that contain icons, plus `Root` for top-level icons.
///
/// Ordered by icon count (descending), then by name.
pub fn folders(tree: &Path) -> Result<Vec<Folder>, IconError> {
    let mut folders = Vec::new();
    for dir in entries(tree, Path::is_dir)? {
        let icons = icon_stems(&dir)?;
        if !icons.is_empty() {
            folders.push(Folder {
                name: file_name(&dir),
                icons,
            });
        }
    }

    let root_icons = icon_stems(tree)?;
    if !root_icons.is_empty() {
        folders.push(Folder {
            name: ROOT_FOLDER.to_string(),
            icons: root_icons,
        });
    }

    folders.sort_by(|a, b| {
        b.icons
            .len()
            .cmp(&a.icons.len())
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(folders)
}

/// Icons of one folder of a tree.
pub fn folder_icons(tree: &Path, folder: &str) -> Result<Vec<String>, IconError> {
    if folder == ROOT_FOLDER {
        return icon_stems(tree);
    }
    let dir = tree.join(super::validate_segment(folder)?);
    if !dir.is_dir() {
        return Err(IconError::FolderNotFound(folder.to_string()));
    }
    icon_stems(&dir)
}

/// Sorted flag file names, extension included.
pub fn flags(dir: &Path) -> Result<Vec<String>, IconError> {
    Ok(entries(dir, |p| has_extension(p, "svg"))?
        .iter()
        .map(|p| file_name(p))
        .collect())
}

/// Sorted PNG file names of the infographics gallery.
pub fn infographics(dir: &Path) -> Result<Vec<String>, IconError> {
    Ok(entries(dir, |p| has_extension(p, "png"))?
        .iter()
        .map(|p| file_name(p))
        .collect())
}
