//! Icon identity and the directory it lives in.
//!
//! | kind            | directory                           | mode    |
//! |-----------------|-------------------------------------|---------|
//! | `icon`          | `icons/<mode>[/folder]`             | used    |
//! | `colorful-icon` | `colorful[/folder]`                 | ignored |
//! | `single-color`  | `single_color/<mode>`               | used    |
//! | `flag`          | `flags`                             | ignored |
//! | `bcore-logo`    | `bcore[/folder]`                    | ignored |
//!
//! The folder `Root` means the top of the tree. Single-color icons and
//! flags are flat, so their folder is ignored. Resolution never touches the
//! filesystem: a missing directory shows up when the file is opened.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use super::IconError;
use crate::config::LibraryConfig;

/// Folder name addressing the top of a tree.
pub const ROOT_FOLDER: &str = "Root";

/// Light/dark theme selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Light,
    Dark,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Light, Mode::Dark];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse an optional query value; absent means light.
    pub fn from_query(value: Option<&str>) -> Result<Self, IconError> {
        value.map_or(Ok(Self::Light), str::parse)
    }
}

impl FromStr for Mode {
    type Err = IconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(IconError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical icon type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
    Icon,
    Colorful,
    SingleColor,
    Flag,
    BcoreLogo,
}

impl IconKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Icon => "icon",
            Self::Colorful => "colorful-icon",
            Self::SingleColor => "single-color",
            Self::Flag => "flag",
            Self::BcoreLogo => "bcore-logo",
        }
    }

    /// Whether the tree has named subfolders.
    pub const fn has_folders(self) -> bool {
        !matches!(self, Self::SingleColor | Self::Flag)
    }
}

impl FromStr for IconKind {
    type Err = IconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "icon" | "icons" => Ok(Self::Icon),
            "colorful-icon" => Ok(Self::Colorful),
            "single-color" => Ok(Self::SingleColor),
            "flag" => Ok(Self::Flag),
            "bcore-logo" => Ok(Self::BcoreLogo),
            other => Err(IconError::InvalidType(other.to_string())),
        }
    }
}

impl fmt::Display for IconKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject anything that could leave the directory it is joined onto.
pub fn validate_segment(segment: &str) -> Result<&str, IconError> {
    let bad = segment.is_empty()
        || segment.contains(['/', '\\', '\0'])
        || segment == "."
        || segment.contains("..");
    if bad {
        Err(IconError::InvalidName(segment.to_string()))
    } else {
        Ok(segment)
    }
}

/// Validate an icon name and give it the `.svg` extension.
///
/// `cat` and `cat.svg` both become `cat.svg`.
pub fn normalize_icon_name(name: &str) -> Result<String, IconError> {
    let name = validate_segment(name)?;
    if name.ends_with(".svg") {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}.svg"))
    }
}

/// Icon stem, without a trailing `.svg`.
pub fn icon_stem(name: &str) -> &str {
    name.strip_suffix(".svg").unwrap_or(name)
}

/// Where an icon lives: type, folder and theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconLocation {
    pub kind: IconKind,
    pub folder: String,
    pub mode: Mode,
}

impl IconLocation {
    /// Build a location, validating the folder for kinds that have folders.
    pub fn new(kind: IconKind, folder: &str, mode: Mode) -> Result<Self, IconError> {
        if kind.has_folders() && folder != ROOT_FOLDER {
            validate_segment(folder)?;
        }
        Ok(Self {
            kind,
            folder: folder.to_string(),
            mode,
        })
    }

    /// Parse request fields into a location.
    pub fn parse(kind: &str, folder: &str, mode: Option<&str>) -> Result<Self, IconError> {
        Self::new(kind.parse()?, folder, Mode::from_query(mode)?)
    }

    /// Directory this location maps to.
    pub fn dir(&self, library: &LibraryConfig) -> PathBuf {
        resolve(library, self.kind, &self.folder, self.mode)
    }

    /// Path of `name` (with or without `.svg`) in this location.
    pub fn file(&self, library: &LibraryConfig, name: &str) -> Result<PathBuf, IconError> {
        Ok(self.dir(library).join(normalize_icon_name(name)?))
    }
}

/// Directory for `(kind, folder, mode)`. See the module table.
pub fn resolve(library: &LibraryConfig, kind: IconKind, folder: &str, mode: Mode) -> PathBuf {
    let base = match kind {
        IconKind::Icon => library.icons.join(mode.as_str()),
        IconKind::Colorful => library.colorful.clone(),
        IconKind::SingleColor => return library.single_color.join(mode.as_str()),
        IconKind::Flag => return library.flags.clone(),
        IconKind::BcoreLogo => library.bcore.clone(),
    };
    if folder == ROOT_FOLDER {
        base
    } else {
        base.join(folder)
    }
}
