//! Fill recoloring.
//!
//! A color is expressed on an element through whatever the element already
//! uses:
//!
//! 1. an existing `fill` attribute is overwritten (even `none`)
//! 2. an existing `style` gets its `fill:#hex` declaration replaced, or
//!    `;fill:<color>` appended when it has no `fill:` at all
//! 3. an element with neither gets a new `fill` attribute
//!
//! Rules 1 and 2 both fire when both attributes are present. The color
//! string is written verbatim.

use regex::{NoExpand, Regex};
use std::sync::LazyLock;

use super::{Element, IconDocument, find_group, is_shape};

/// Group marker that selects the whole document instead of one group.
pub const ENTIRE_DOCUMENT: &str = "entire_flag";

static STYLE_FILL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"fill[ \t\r\n]*:[ \t\r\n]*#[0-9a-fA-F]{3,6}").unwrap());

/// Which part of a document a recolor applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecolorTarget {
    /// Every element, the root included.
    Document,
    /// Shapes inside the first `<g>` with this id.
    Group(String),
}

impl RecolorTarget {
    /// Interpret a requested group id, honoring the whole-document marker.
    pub fn from_group_id(group_id: &str) -> Self {
        if group_id == ENTIRE_DOCUMENT {
            Self::Document
        } else {
            Self::Group(group_id.to_string())
        }
    }
}

/// Express `color` as the fill of `element`. Returns whether anything changed.
pub fn apply_fill(element: &mut Element, color: &str) -> bool {
    let had_fill = element.has_attr("fill");
    let had_style = element.has_attr("style");
    let mut changed = false;

    if had_fill {
        changed |= element.attr("fill") != Some(color);
        element.set_attr("fill", color);
    }

    let restyled = element.attr("style").and_then(|style| {
        let updated = replace_style_fill(style, color);
        (updated != style).then_some(updated)
    });
    if let Some(style) = restyled {
        element.set_attr("style", &style);
        changed = true;
    }

    if !had_fill && !had_style {
        element.set_attr("fill", color);
        changed = true;
    }

    changed
}

/// Replace the hex `fill:` declaration of a style string, or append one.
fn replace_style_fill(style: &str, color: &str) -> String {
    let replacement = format!("fill:{color}");
    let mut updated = STYLE_FILL
        .replace_all(style, NoExpand(&replacement))
        .into_owned();
    if !updated.contains("fill:") {
        updated.push(';');
        updated.push_str(&replacement);
    }
    updated
}

/// Recolor a document, then drop top-level `<style>` blocks.
///
/// Returns the number of elements whose attributes changed, or `None` when
/// the target group does not exist (the document is left untouched).
pub fn recolor(doc: &mut IconDocument, target: &RecolorTarget, color: &str) -> Option<usize> {
    let mut updated = 0;

    match target {
        RecolorTarget::Document => {
            doc.root_mut().walk_mut(&mut |el| {
                if apply_fill(el, color) {
                    updated += 1;
                }
            });
        }
        RecolorTarget::Group(id) => {
            let group = find_group(doc.root_mut(), id)?;
            group.walk_mut(&mut |el| {
                if is_shape(el) && apply_fill(el, color) {
                    updated += 1;
                }
            });
        }
    }

    strip_root_styles(doc);
    Some(updated)
}

/// Remove `<style>` children of the root; nested ones stay.
pub fn strip_root_styles(doc: &mut IconDocument) -> usize {
    doc.root_mut().drain_elements(|el| el.is("style")).len()
}
