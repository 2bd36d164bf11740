//! `[library]` section configuration.
//!
//! Every directory is relative to `root`, which itself defaults to the
//! directory holding `icons.toml` (or the working directory when there is
//! no config file).
//!
//! # Example
//!
//! ```toml
//! [library]
//! root = "."
//! icons = "exported_svgs"                  # light/ and dark/ inside
//! colorful = "colorful_icons"
//! single_color = "colorful_icons/SingleColor"  # light/ and dark/ inside
//! flags = "flags"
//! bcore = "bcore_files"
//! infographics = "infographics"
//! infographics_master = "infographics_master.pptx"
//! feedback = "feedback_submissions"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk layout of the icon library.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub root: PathBuf,
    pub icons: PathBuf,
    pub colorful: PathBuf,
    pub single_color: PathBuf,
    pub flags: PathBuf,
    pub bcore: PathBuf,
    pub infographics: PathBuf,
    /// File name of the master deck inside `infographics`.
    pub infographics_master: String,
    pub feedback: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            icons: "exported_svgs".into(),
            colorful: "colorful_icons".into(),
            single_color: "colorful_icons/SingleColor".into(),
            flags: "flags".into(),
            bcore: "bcore_files".into(),
            infographics: "infographics".into(),
            infographics_master: "infographics_master.pptx".into(),
            feedback: "feedback_submissions".into(),
        }
    }
}

impl LibraryConfig {
    /// Anchor `root` at `base` and every sub-root at `root`.
    ///
    /// Absolute paths are kept as they are.
    pub fn anchor(&mut self, base: &Path) {
        self.root = base.join(&self.root);
        let root = self.root.clone();
        for dir in [
            &mut self.icons,
            &mut self.colorful,
            &mut self.single_color,
            &mut self.flags,
            &mut self.bcore,
            &mut self.infographics,
            &mut self.feedback,
        ] {
            *dir = root.join(&*dir);
        }
    }

    /// Path of the master PowerPoint deck.
    pub fn infographics_master_path(&self) -> PathBuf {
        self.infographics.join(&self.infographics_master)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_library_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.library.icons, PathBuf::from("exported_svgs"));
        assert_eq!(
            config.library.single_color,
            PathBuf::from("colorful_icons/SingleColor")
        );
        assert_eq!(config.library.infographics_master, "infographics_master.pptx");
    }

    #[test]
    fn test_library_anchor() {
        let mut library = LibraryConfig {
            root: "assets".into(),
            flags: "/srv/flags".into(),
            ..Default::default()
        };
        library.anchor(Path::new("/site"));

        assert_eq!(library.root, PathBuf::from("/site/assets"));
        assert_eq!(library.icons, PathBuf::from("/site/assets/exported_svgs"));
        assert_eq!(library.flags, PathBuf::from("/srv/flags"));
        assert_eq!(
            library.infographics_master_path(),
            PathBuf::from("/site/assets/infographics/infographics_master.pptx")
        );
    }
}
