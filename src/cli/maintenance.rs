//! Batch maintenance of the icon library: `defaults`, `verify`, `groupify`
//! and `groups`.
//!
//! These walk whole trees, so they run outside the server and do not take
//! the per-file edit locks.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jwalk::WalkDir;
use rayon::prelude::*;

use crate::config::LibraryConfig;
use crate::library::edit::recolor_file;
use crate::library::{IconError, IconKind, Mode, ROOT_FOLDER, resolve};
use crate::logger::ProgressLine;
use crate::svg::color::strip_root_styles;
use crate::svg::{Element, IconDocument, RecolorTarget, apply_fill, is_shape, list_leaf_groups};
use crate::{debug, log};

/// Id of the group `groupify` creates.
const MAIN_GROUP: &str = "main";

/// Target fill per mode.
#[derive(Debug, Clone)]
pub struct ModeColors {
    pub light: String,
    pub dark: String,
}

impl ModeColors {
    pub fn get(&self, mode: Mode) -> &str {
        match mode {
            Mode::Light => &self.light,
            Mode::Dark => &self.dark,
        }
    }
}

/// The two kinds of mode-split trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tree {
    /// Regular icons: only one named group is recolored.
    Icons,
    /// Single-color icons: every shape is recolored.
    SingleColor,
}

impl Tree {
    fn dir(self, library: &LibraryConfig, mode: Mode) -> PathBuf {
        let kind = match self {
            Self::Icons => IconKind::Icon,
            Self::SingleColor => IconKind::SingleColor,
        };
        resolve(library, kind, ROOT_FOLDER, mode)
    }
}

/// All `.svg` files below `dir`, sorted. Missing directories yield nothing.
fn collect_svgs(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        log!("warning"; "directory not found: {}", dir.display());
        return Vec::new();
    }
    WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("svg")))
        .collect()
}

/// Every SVG of both trees for one mode.
fn mode_jobs(library: &LibraryConfig, mode: Mode) -> Vec<(Mode, Tree, PathBuf)> {
    [Tree::Icons, Tree::SingleColor]
        .into_iter()
        .flat_map(|tree| {
            collect_svgs(&tree.dir(library, mode))
                .into_iter()
                .map(move |path| (mode, tree, path))
        })
        .collect()
}

/// Fill every shape below `root`. Returns how many changed.
fn recolor_shapes(root: &mut Element, color: &str) -> usize {
    let mut updated = 0;
    root.walk_mut(&mut |el| {
        if is_shape(el) && apply_fill(el, color) {
            updated += 1;
        }
    });
    updated
}

fn reset_file(
    path: &Path,
    tree: Tree,
    group: &str,
    color: &str,
    dry: bool,
) -> Result<Option<usize>, IconError> {
    match tree {
        Tree::Icons => recolor_file(path, &RecolorTarget::Group(group.to_string()), color, dry),
        Tree::SingleColor => {
            let mut doc = IconDocument::open(path)?;
            let updated = recolor_shapes(doc.root_mut(), color);
            strip_root_styles(&mut doc);
            if !dry {
                doc.save(path)?;
            }
            Ok(Some(updated))
        }
    }
}

/// Outcome of a `defaults` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DefaultsSummary {
    pub files: usize,
    /// Files where at least one element changed.
    pub updated: usize,
    /// Icons without the target group.
    pub missing_group: usize,
    pub failed: usize,
}

/// Reset the `group` fill of regular icons and every single-color shape to
/// the default color of their mode.
pub fn set_defaults(
    library: &LibraryConfig,
    colors: &ModeColors,
    group: &str,
    dry: bool,
) -> DefaultsSummary {
    let light = mode_jobs(library, Mode::Light);
    let dark = mode_jobs(library, Mode::Dark);
    let progress = ProgressLine::new("defaults", &[("light", light.len()), ("dark", dark.len())]);

    let results: Vec<_> = light
        .into_par_iter()
        .chain(dark)
        .map(|(mode, tree, path)| {
            let result = reset_file(&path, tree, group, colors.get(mode), dry);
            progress.inc(mode.as_str());
            (path, result)
        })
        .collect();
    progress.finish();

    let mut summary = DefaultsSummary {
        files: results.len(),
        ..Default::default()
    };
    for (path, result) in results {
        match result {
            Ok(Some(0)) => {}
            Ok(Some(n)) => {
                summary.updated += 1;
                debug!("defaults"; "{}: {} element(s)", path.display(), n);
            }
            Ok(None) => {
                summary.missing_group += 1;
                debug!("defaults"; "no {} group in {}", group, path.display());
            }
            Err(err) => {
                summary.failed += 1;
                log!("error"; "{}: {}", path.display(), err.message());
            }
        }
    }
    summary
}

/// Fill colors of the shapes below `root`, from `fill` or the style's `fill:`.
fn shape_fills(root: &Element) -> BTreeSet<String> {
    let mut fills = BTreeSet::new();
    root.walk(&mut |el| {
        if !is_shape(el) {
            return;
        }
        let from_style = el.attr("style").and_then(|style| {
            style.split(';').find_map(|decl| {
                let (key, value) = decl.split_once(':')?;
                (key.trim() == "fill").then(|| value.trim())
            })
        });
        if let Some(fill) = from_style.or_else(|| el.attr("fill"))
            && fill != "none"
        {
            fills.insert(fill.to_string());
        }
    });
    fills
}

/// Fill colors found in one mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModeReport {
    pub files: usize,
    /// Colors inside the checked group of regular icons.
    pub group_colors: BTreeSet<String>,
    /// Colors of single-color shapes.
    pub single_colors: BTreeSet<String>,
    pub missing_group: usize,
}

impl ModeReport {
    /// Whether every color seen is `expected`, ignoring case.
    pub fn matches(&self, expected: &str) -> bool {
        self.group_colors
            .iter()
            .chain(&self.single_colors)
            .all(|c| c.eq_ignore_ascii_case(expected))
    }
}

/// Collect the colors used per mode without changing anything.
pub fn verify(library: &LibraryConfig, group: &str) -> Vec<(Mode, ModeReport)> {
    Mode::ALL
        .into_iter()
        .map(|mode| {
            let mut report = ModeReport::default();
            for (_, tree, path) in mode_jobs(library, mode) {
                let doc = match IconDocument::open(&path) {
                    Ok(doc) => doc,
                    Err(err) => {
                        log!("error"; "{}: {}", path.display(), IconError::from(err).message());
                        continue;
                    }
                };
                report.files += 1;
                match tree {
                    Tree::SingleColor => report.single_colors.extend(shape_fills(doc.root())),
                    Tree::Icons => {
                        match doc.root().find(&|e| e.is("g") && e.id() == Some(group)) {
                            Some(g) => report.group_colors.extend(shape_fills(g)),
                            None => report.missing_group += 1,
                        }
                    }
                }
            }
            (mode, report)
        })
        .collect()
}

/// Move every shape of a document into a new `<g id="main">` at the end of
/// the root. `false` when the group already exists or there are no shapes.
pub fn groupify_document(doc: &mut IconDocument) -> bool {
    let has_main = doc
        .root()
        .find(&|e| e.is("g") && e.id() == Some(MAIN_GROUP))
        .is_some();
    if has_main {
        return false;
    }

    let mut shapes = Vec::new();
    doc.root_mut()
        .walk_mut(&mut |el| shapes.extend(el.drain_elements(is_shape)));
    if shapes.is_empty() {
        return false;
    }

    let group = doc
        .root_mut()
        .push_element(Element::new("g").with_attr("id", MAIN_GROUP));
    for shape in shapes {
        group.push_element(shape);
    }
    true
}

/// Groupify every SVG directly inside `dir`. Returns (grouped, skipped).
pub fn groupify(dir: &Path, dry: bool) -> Result<(usize, usize)> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e.eq_ignore_ascii_case("svg")))
        .collect();
    files.sort();

    let (mut grouped, mut skipped) = (0, 0);
    for path in files {
        let mut doc = match IconDocument::open(&path) {
            Ok(doc) => doc,
            Err(err) => {
                log!("error"; "{}: {}", path.display(), IconError::from(err).message());
                continue;
            }
        };
        if !groupify_document(&mut doc) {
            skipped += 1;
            continue;
        }
        if !dry {
            doc.save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        debug!("groupify"; "grouped {}", path.display());
        grouped += 1;
    }
    Ok((grouped, skipped))
}

/// Leaf groups of one file.
pub fn file_groups(file: &Path) -> Result<Vec<String>> {
    let doc =
        IconDocument::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    Ok(list_leaf_groups(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg"><style>.a{fill:red}</style><g id="Grey"><path fill="#000000"/><rect style="stroke:none;fill:#111111"/></g><g id="Accent"><circle fill="#ff0000"/></g></svg>"##;
    const SINGLE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg"><path fill="#123456"/><g><circle/></g></svg>"##;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn library() -> (TempDir, LibraryConfig) {
        let dir = TempDir::new().unwrap();
        let mut library = LibraryConfig::default();
        library.anchor(dir.path());
        write(&library.icons.join("light/Arrows/up.svg"), ICON);
        write(&library.icons.join("dark/up.svg"), ICON);
        write(&library.icons.join("dark/plain.svg"), SINGLE);
        write(&library.single_color.join("light/dot.svg"), SINGLE);
        (dir, library)
    }

    fn colors() -> ModeColors {
        ModeColors {
            light: "#282828".into(),
            dark: "#D3D3D3".into(),
        }
    }

    #[test]
    fn test_defaults_then_verify() {
        let (_dir, library) = library();

        let before = verify(&library, "Grey");
        assert!(!before[0].1.matches("#282828"));

        let summary = set_defaults(&library, &colors(), "Grey", false);
        assert_eq!(
            summary,
            DefaultsSummary {
                files: 4,
                updated: 3,
                missing_group: 1,
                failed: 0,
            }
        );

        let after = verify(&library, "Grey");
        let (mode, light) = &after[0];
        assert_eq!(*mode, Mode::Light);
        assert!(light.matches("#282828"), "{light:?}");
        assert_eq!(light.single_colors.len(), 1);
        let (_, dark) = &after[1];
        assert!(dark.matches("#d3d3d3"));
        assert_eq!(dark.missing_group, 1);

        // The accent group and the root style are handled as the color engine does.
        let up = fs::read_to_string(library.icons.join("light/Arrows/up.svg")).unwrap();
        assert!(up.contains("#ff0000"));
        assert!(!up.contains("<style"));
        assert!(up.contains("stroke:none;fill:#282828"));
    }

    #[test]
    fn test_defaults_dry_run_writes_nothing() {
        let (_dir, library) = library();
        let path = library.single_color.join("light/dot.svg");
        let summary = set_defaults(&library, &colors(), "Grey", true);
        assert_eq!(summary.updated, 3);
        assert_eq!(fs::read_to_string(path).unwrap(), SINGLE);
    }

    #[test]
    fn test_groupify_document() {
        let mut doc = IconDocument::parse(SINGLE).unwrap();
        assert!(groupify_document(&mut doc));
        let main = doc.root().find(&|e| e.id() == Some(MAIN_GROUP)).unwrap();
        assert_eq!(main.child_elements().count(), 2);
        assert!(doc.root().child_elements().all(|e| !is_shape(e)));

        // Second pass finds the group and leaves the document alone.
        assert!(!groupify_document(&mut doc));

        let mut empty = IconDocument::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();
        assert!(!groupify_document(&mut empty));
    }

    #[test]
    fn test_groupify_dir() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("a.svg"), SINGLE);
        write(&dir.path().join("b.svg"), ICON);
        write(&dir.path().join("notes.txt"), "x");

        assert_eq!(groupify(dir.path(), false).unwrap(), (2, 0));
        assert_eq!(groupify(dir.path(), false).unwrap(), (0, 2));
        let groups = file_groups(&dir.path().join("a.svg")).unwrap();
        assert_eq!(groups, vec![MAIN_GROUP]);
    }
}
