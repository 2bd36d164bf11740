//! Downloads: single PNG/SVG files and ZIP bundles.
//!
//! ZIP export is best-effort: items that are missing or fail to convert are
//! logged and left out, and the archive is built from whatever remains.

pub mod archive;

use std::collections::HashSet;

use rayon::prelude::*;
use serde::Deserialize;

use crate::library::{IconError, IconLocation, Library, ROOT_FOLDER, icon_stem};
use crate::log;
use crate::svg::render_png;
use crate::utils::date::DateTimeUtc;
use crate::utils::mime::types;

/// A file handed to the client as an attachment.
#[derive(Debug)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Svg,
    Png,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

fn to_png(svg: &[u8]) -> Result<Vec<u8>, IconError> {
    render_png(svg).map_err(|e| IconError::Render(e.to_string()))
}

/// Rasterize one icon.
pub fn png(library: &Library, location: &IconLocation, name: &str) -> Result<Download, IconError> {
    let svg = library.read_svg(location, name)?;
    Ok(Download {
        file_name: format!("{}.png", icon_stem(name)),
        content_type: types::PNG,
        bytes: to_png(&svg)?,
    })
}

/// One icon as stored.
pub fn svg(library: &Library, location: &IconLocation, name: &str) -> Result<Download, IconError> {
    Ok(Download {
        file_name: format!("{}.svg", icon_stem(name)),
        content_type: types::SVG,
        bytes: library.read_svg(location, name)?,
    })
}

/// Name of a ZIP export made at `now`.
pub fn zip_file_name(location: &IconLocation, format: ExportFormat, now: DateTimeUtc) -> String {
    let folder = if location.folder == ROOT_FOLDER {
        "icons"
    } else {
        location.folder.as_str()
    };
    format!(
        "{}_{}_{}_{}.zip",
        folder,
        location.kind,
        format.extension(),
        now.to_compact()
    )
}

/// Bundle `items` (icon stems) of one location into a ZIP archive.
pub fn zip(
    library: &Library,
    location: &IconLocation,
    items: &[String],
    format: ExportFormat,
    now: DateTimeUtc,
) -> Result<Download, IconError> {
    // `cat` and `cat.svg` name the same entry; the first one wins.
    let mut seen = HashSet::new();
    let stems: Vec<&str> = items
        .iter()
        .map(|item| icon_stem(item.as_str()))
        .filter(|stem| seen.insert(*stem))
        .collect();

    let entries: Vec<(String, Vec<u8>)> = stems
        .par_iter()
        .filter_map(|&stem| {
            let bytes = library.read_svg(location, stem).and_then(|svg| match format {
                ExportFormat::Svg => Ok(svg),
                ExportFormat::Png => to_png(&svg),
            });
            match bytes {
                Ok(bytes) => Some((format!("{stem}.{}", format.extension()), bytes)),
                Err(IconError::FileNotFound(_)) => None,
                Err(err) => {
                    log!("export"; "skipping {}: {}", stem, err.message());
                    None
                }
            }
        })
        .collect();

    let bytes = archive::write_zip(entries.iter().map(|(n, b)| (n.as_str(), b.as_slice())))
        .map_err(|e| IconError::Archive(e.to_string()))?;

    crate::debug!("export"; "zipped {}/{} item(s)", entries.len(), items.len());
    Ok(Download {
        file_name: zip_file_name(location, format, now),
        content_type: types::ZIP,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LibraryConfig;
    use crate::library::{IconKind, Mode};
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;
    use zip::ZipArchive;

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><rect width="4" height="4" fill="#282828"/></svg>"##;

    fn setup() -> (TempDir, Library) {
        let dir = TempDir::new().unwrap();
        let mut config = LibraryConfig::default();
        config.anchor(dir.path());
        let people = config.colorful.join("People");
        fs::create_dir_all(&people).unwrap();
        fs::write(people.join("a.svg"), SQUARE).unwrap();
        fs::write(people.join("b.svg"), SQUARE).unwrap();
        fs::write(people.join("broken.svg"), "not svg").unwrap();
        (dir, Library::new(config))
    }

    fn people() -> IconLocation {
        IconLocation::new(IconKind::Colorful, "People", Mode::Light).unwrap()
    }

    #[test]
    fn test_zip_file_name() {
        let now = DateTimeUtc::new(2024, 6, 15, 14, 30, 45);
        let root = IconLocation::new(IconKind::Icon, ROOT_FOLDER, Mode::Dark).unwrap();
        assert_eq!(
            zip_file_name(&root, ExportFormat::Png, now),
            "icons_icon_png_20240615_143045.zip"
        );
        assert_eq!(
            zip_file_name(&people(), ExportFormat::Svg, now),
            "People_colorful-icon_svg_20240615_143045.zip"
        );
    }

    #[test]
    fn test_zip_skips_missing_and_broken() {
        let (_dir, library) = setup();
        let items = ["a", "missing", "broken", "b.svg"].map(String::from);
        let download = zip(
            &library,
            &people(),
            &items,
            ExportFormat::Png,
            DateTimeUtc::now(),
        )
        .unwrap();

        assert_eq!(download.content_type, types::ZIP);
        let archive = ZipArchive::new(Cursor::new(download.bytes)).unwrap();
        let mut names: Vec<_> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_zip_duplicate_names_keep_first() {
        let (_dir, library) = setup();
        let items = ["a", "a.svg", "b", "a"].map(String::from);
        let download = zip(&library, &people(), &items, ExportFormat::Svg, DateTimeUtc::now()).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(download.bytes)).unwrap();
        let names: Vec<_> = archive.file_names().map(String::from).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a.svg".to_string()));
        assert!(names.contains(&"b.svg".to_string()));

        let mut entry = archive.by_name("a.svg").unwrap();
        let mut content = String::new();
        std::io::Read::read_to_string(&mut entry, &mut content).unwrap();
        assert!(content.contains("<svg"));
    }

    #[test]
    fn test_zip_svg_keeps_broken_files() {
        let (_dir, library) = setup();
        let items = ["broken".to_string()];
        let download = zip(&library, &people(), &items, ExportFormat::Svg, DateTimeUtc::now()).unwrap();
        let archive = ZipArchive::new(Cursor::new(download.bytes)).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_png_export() {
        let (_dir, library) = setup();
        let download = png(&library, &people(), "a.svg").unwrap();
        assert_eq!(download.file_name, "a.png");
        assert!(download.bytes.starts_with(b"\x89PNG"));

        assert!(matches!(
            png(&library, &people(), "broken"),
            Err(IconError::Render(_))
        ));
        assert!(matches!(
            svg(&library, &people(), "nope"),
            Err(IconError::FileNotFound(_))
        ));
    }
}
