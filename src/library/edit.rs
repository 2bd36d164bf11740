//! Edits and reads of single icon files.
//!
//! Every mutating operation runs under the file's edit lock and follows
//! the same cycle: open, mutate the tree, save.

use std::fs;
use std::path::{Path, PathBuf};

use super::{IconError, IconLocation, Library, backup};
use crate::svg::{self, IconDocument, RecolorTarget};

/// Recolor one file in place. `Ok(None)` means the group is missing.
///
/// With `dry_run` the document is edited in memory only.
pub fn recolor_file(
    path: &Path,
    target: &RecolorTarget,
    color: &str,
    dry_run: bool,
) -> Result<Option<usize>, IconError> {
    let mut doc = IconDocument::open(path)?;
    let Some(updated) = svg::recolor(&mut doc, target, color) else {
        return Ok(None);
    };
    if !dry_run {
        doc.save(path)?;
    }
    Ok(Some(updated))
}

impl Library {
    /// Path of an existing icon file.
    pub fn existing_file(&self, location: &IconLocation, name: &str) -> Result<PathBuf, IconError> {
        let path = location.file(self.config(), name)?;
        if path.is_file() {
            Ok(path)
        } else {
            Err(IconError::FileNotFound(path))
        }
    }

    /// Recolor a leaf group, or the whole document for `entire_flag`.
    ///
    /// Returns how many elements changed.
    pub fn update_color(
        &self,
        location: &IconLocation,
        name: &str,
        group_id: &str,
        color: &str,
    ) -> Result<usize, IconError> {
        let path = self.existing_file(location, name)?;
        let _guard = self.locks().lock(&path);

        let target = RecolorTarget::from_group_id(group_id);
        let updated = recolor_file(&path, &target, color, false)?
            .ok_or_else(|| IconError::GroupNotFound(group_id.to_string()))?;

        crate::debug!("edit"; "{}: {} element(s) set to {} in {:?}", path.display(), updated, color, target);
        Ok(updated)
    }

    /// Back the file up once, then route every shape through the greyscale filter.
    pub fn greyscale(&self, location: &IconLocation, name: &str) -> Result<usize, IconError> {
        let path = self.existing_file(location, name)?;
        let _guard = self.locks().lock(&path);

        backup::backup(&path)?;
        let mut doc = IconDocument::open(&path)?;
        let shapes = svg::apply_greyscale(&mut doc);
        doc.save(&path)?;

        crate::debug!("greyscale"; "{}: {} shape(s)", path.display(), shapes);
        Ok(shapes)
    }

    /// Restore the file from its backup.
    pub fn revert(&self, location: &IconLocation, name: &str) -> Result<(), IconError> {
        let path = self.existing_file(location, name)?;
        let _guard = self.locks().lock(&path);
        backup::revert(&path)?;
        crate::debug!("edit"; "reverted {}", path.display());
        Ok(())
    }

    /// Whether the file defines the greyscale filter.
    pub fn is_greyscale(&self, location: &IconLocation, name: &str) -> Result<bool, IconError> {
        let path = self.existing_file(location, name)?;
        let doc = IconDocument::open(&path)?;
        Ok(svg::is_greyscale(&doc))
    }

    /// Leaf groups of an icon. A missing file has no groups.
    pub fn groups(&self, location: &IconLocation, name: &str) -> Result<Vec<String>, IconError> {
        let path = match self.existing_file(location, name) {
            Ok(path) => path,
            Err(IconError::FileNotFound(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        let doc = IconDocument::open(&path)?;
        Ok(svg::list_leaf_groups(&doc))
    }

    /// Raw bytes of an icon.
    pub fn read_svg(&self, location: &IconLocation, name: &str) -> Result<Vec<u8>, IconError> {
        let path = self.existing_file(location, name)?;
        fs::read(&path).map_err(IconError::io(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LibraryConfig;
    use crate::library::{IconKind, Mode, ROOT_FOLDER};
    use tempfile::TempDir;

    const ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10">
<style>.st0{fill:#ff0000}</style>
<g id="Layer_2"><g id="Grey"><path fill="#000000"/><rect style="fill:#111"/></g><g id="Accent"><circle/></g></g>
</svg>"##;

    fn setup() -> (TempDir, Library) {
        let dir = TempDir::new().unwrap();
        let mut config = LibraryConfig::default();
        config.anchor(dir.path());

        let light = config.icons.join("light");
        fs::create_dir_all(&light).unwrap();
        fs::write(light.join("cat.svg"), ICON).unwrap();
        fs::create_dir_all(&config.colorful).unwrap();
        fs::write(config.colorful.join("globe.svg"), ICON).unwrap();

        (dir, Library::new(config))
    }

    fn icon_at(kind: IconKind) -> IconLocation {
        IconLocation::new(kind, ROOT_FOLDER, Mode::Light).unwrap()
    }

    #[test]
    fn test_update_color_group() {
        let (_dir, library) = setup();
        let loc = icon_at(IconKind::Icon);

        assert_eq!(library.update_color(&loc, "cat", "Grey", "#282828").unwrap(), 2);

        let doc = IconDocument::open(&library.existing_file(&loc, "cat").unwrap()).unwrap();
        let grey = doc.root().find(&|e| e.id() == Some("Grey")).unwrap();
        let fills: Vec<_> = grey.child_elements().map(|e| e.attr("fill").or(e.attr("style"))).collect();
        assert_eq!(fills, vec![Some("#282828"), Some("fill:#282828")]);
        assert!(doc.root().child_elements().all(|e| !e.is("style")));
        assert_eq!(svg::list_leaf_groups(&doc), vec!["Grey", "Accent"]);
    }

    #[test]
    fn test_update_color_errors() {
        let (_dir, library) = setup();
        let loc = icon_at(IconKind::Icon);
        let path = library.existing_file(&loc, "cat.svg").unwrap();
        let before = fs::read(&path).unwrap();

        assert!(matches!(
            library.update_color(&loc, "cat", "Nope", "#fff"),
            Err(IconError::GroupNotFound(_))
        ));
        assert_eq!(fs::read(&path).unwrap(), before);

        assert!(matches!(
            library.update_color(&loc, "dog", "Grey", "#fff"),
            Err(IconError::FileNotFound(_))
        ));
        let dark = IconLocation::new(IconKind::Icon, ROOT_FOLDER, Mode::Dark).unwrap();
        assert!(matches!(
            library.update_color(&dark, "cat", "Grey", "#fff"),
            Err(IconError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_greyscale_then_revert() {
        let (_dir, library) = setup();
        let loc = icon_at(IconKind::Colorful);
        let path = library.existing_file(&loc, "globe").unwrap();
        let original = fs::read(&path).unwrap();

        assert!(!library.is_greyscale(&loc, "globe").unwrap());
        assert_eq!(library.greyscale(&loc, "globe").unwrap(), 3);
        assert!(library.is_greyscale(&loc, "globe").unwrap());

        // A second conversion must not clobber the original backup.
        library.greyscale(&loc, "globe").unwrap();
        library.revert(&loc, "globe").unwrap();
        assert_eq!(fs::read(&path).unwrap(), original);
        assert!(!library.is_greyscale(&loc, "globe").unwrap());
    }

    #[test]
    fn test_revert_without_backup() {
        let (_dir, library) = setup();
        let loc = icon_at(IconKind::Colorful);
        assert!(matches!(
            library.revert(&loc, "globe"),
            Err(IconError::NoBackup(_))
        ));
    }

    #[test]
    fn test_groups_missing_file_is_empty() {
        let (_dir, library) = setup();
        let loc = icon_at(IconKind::Icon);
        assert!(library.groups(&loc, "dog").unwrap().is_empty());
        assert_eq!(library.groups(&loc, "cat").unwrap(), vec!["Grey", "Accent"]);
    }

    #[test]
    fn test_recolor_file_dry_run() {
        let (_dir, library) = setup();
        let path = library
            .existing_file(&icon_at(IconKind::Icon), "cat")
            .unwrap();
        let before = fs::read(&path).unwrap();

        let updated = recolor_file(&path, &RecolorTarget::Group("Accent".into()), "#abc", true)
            .unwrap();
        assert_eq!(updated, Some(1));
        assert_eq!(fs::read(&path).unwrap(), before);
    }
}
