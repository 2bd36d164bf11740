//! Request routing.
//!
//! Maps a method and decoded path segments to a [`Route`]. Routing is pure:
//! nothing here touches the filesystem.

use std::path::PathBuf;

use tiny_http::Method;

use crate::config::LibraryConfig;
use crate::library::{IconKind, Mode, ROOT_FOLDER, resolve};

/// Directory trees exposed as static files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mount {
    Icons(Mode),
    SingleColor(Mode),
    Colorful,
    Flags,
    Bcore,
    Infographics,
}

impl Mount {
    fn from_prefix(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "static-icons-light" => Self::Icons(Mode::Light),
            "static-icons-dark" => Self::Icons(Mode::Dark),
            "single-color-files-light" => Self::SingleColor(Mode::Light),
            "single-color-files-dark" => Self::SingleColor(Mode::Dark),
            "colorful-icons" => Self::Colorful,
            "flags" => Self::Flags,
            "bcore-files" => Self::Bcore,
            "infographics" => Self::Infographics,
            _ => return None,
        })
    }

    /// Directory served under this mount.
    pub fn dir(self, library: &LibraryConfig) -> PathBuf {
        match self {
            Self::Icons(mode) => resolve(library, IconKind::Icon, ROOT_FOLDER, mode),
            Self::SingleColor(mode) => resolve(library, IconKind::SingleColor, ROOT_FOLDER, mode),
            Self::Colorful => library.colorful.clone(),
            Self::Flags => library.flags.clone(),
            Self::Bcore => library.bcore.clone(),
            Self::Infographics => library.infographics.clone(),
        }
    }
}

/// An icon addressed by path segments: `/{type}/{folder}/{icon}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconPath {
    pub kind: String,
    pub folder: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    Preflight,

    // Listings
    Icons,
    FolderIcons(String),
    ColorfulIcons,
    SingleColor,
    Flags,
    Infographics,

    // Single icons
    Groups(IconPath),
    Svg(IconPath),
    CheckGreyscale { folder: String, icon: String },

    // Edits and exports, parameters in the JSON body
    UpdateColor,
    Greyscale,
    Revert,
    ExportPng,
    DownloadSvg,
    ExportZip,

    // Feedback
    SubmitFeedback,
    ListFeedback,
    FeedbackStatus(u64),
    FeedbackRespond(u64),

    InfographicDownload(String),
    Static { mount: Mount, path: Vec<String> },
    NotFound,
}

impl Route {
    pub fn parse(method: &Method, segments: &[&str]) -> Self {
        match method {
            Method::Options => Self::Preflight,
            Method::Get | Method::Head => Self::get(segments),
            Method::Post => Self::post(segments),
            Method::Put => Self::put(segments),
            _ => Self::NotFound,
        }
    }

    fn get(segments: &[&str]) -> Self {
        let icon_path = |kind: &str, folder: &str, icon: &str| IconPath {
            kind: kind.to_string(),
            folder: folder.to_string(),
            icon: icon.to_string(),
        };

        match segments {
            [] => Self::Health,
            ["icons"] => Self::Icons,
            ["icons", folder] => Self::FolderIcons(folder.to_string()),
            ["colorful-icons"] => Self::ColorfulIcons,
            ["single-color"] => Self::SingleColor,
            ["flags"] => Self::Flags,
            ["infographics"] => Self::Infographics,
            ["feedback"] => Self::ListFeedback,
            ["groups", kind, folder, icon] => Self::Groups(icon_path(kind, folder, icon)),
            ["svg", kind, folder, icon] => Self::Svg(icon_path(kind, folder, icon)),
            ["check-greyscale", folder, icon] => Self::CheckGreyscale {
                folder: folder.to_string(),
                icon: icon.to_string(),
            },
            ["infographics", name, "download"] => Self::InfographicDownload(name.to_string()),
            [prefix, rest @ ..] => match Mount::from_prefix(prefix) {
                Some(mount) if !rest.is_empty() => Self::Static {
                    mount,
                    path: rest.iter().map(|s| s.to_string()).collect(),
                },
                _ => Self::NotFound,
            },
        }
    }

    fn post(segments: &[&str]) -> Self {
        match segments {
            ["update_color"] => Self::UpdateColor,
            ["greyscale"] => Self::Greyscale,
            ["revert"] => Self::Revert,
            ["export-png"] => Self::ExportPng,
            ["download-svg"] => Self::DownloadSvg,
            ["export-zip"] => Self::ExportZip,
            ["feedback"] => Self::SubmitFeedback,
            ["feedback", id, "respond"] => id.parse().map_or(Self::NotFound, Self::FeedbackRespond),
            _ => Self::NotFound,
        }
    }

    fn put(segments: &[&str]) -> Self {
        match segments {
            ["feedback", id, "status"] => id.parse().map_or(Self::NotFound, Self::FeedbackStatus),
            _ => Self::NotFound,
        }
    }
}
