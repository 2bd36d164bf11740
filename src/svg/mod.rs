//! SVG document model and the rule engines that edit it.
//!
//! # Modules
//!
//! - [`dom`]: owned element tree on top of `quick-xml`
//! - [`color`]: fill recoloring of shapes, groups and whole documents
//! - [`greyscale`]: greyscale filter insertion and detection
//! - [`group`]: leaf color group discovery
//! - [`render`]: PNG rasterization via resvg
//!
//! # Flow
//!
//! ```text
//! file ──► IconDocument::open ──► group::find_group ──► color / greyscale ──► save
//! ```

pub mod color;
pub mod dom;
pub mod greyscale;
pub mod group;
pub mod render;

pub use color::{RecolorTarget, apply_fill, recolor};
pub use dom::{DocumentError, Element, IconDocument, ParseError};
pub use greyscale::{apply_greyscale, is_greyscale};
pub use group::{find_group, list_leaf_groups};
pub use render::render_png;

/// Tags that carry paint and are touched by group-scoped edits.
pub const SHAPE_TAGS: &[&str] = &[
    "path", "rect", "circle", "ellipse", "polygon", "polyline", "line",
];

/// Check whether an element is a paintable shape.
#[inline]
pub fn is_shape(element: &Element) -> bool {
    SHAPE_TAGS.contains(&element.local_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_shape() {
        assert!(is_shape(&Element::new("path")));
        assert!(is_shape(&Element::new("svg:polyline")));
        assert!(!is_shape(&Element::new("g")));
        assert!(!is_shape(&Element::new("text")));
    }
}
