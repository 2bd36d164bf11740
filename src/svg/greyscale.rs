//! Greyscale conversion through a shared SVG filter.
//!
//! There is no inverse transform: undoing a conversion restores the backup
//! taken before it (see `library::backup`).

use super::{Element, IconDocument, is_shape};

/// Id of the filter definition placed in `<defs>`.
pub const GREYSCALE_FILTER_ID: &str = "greyscale";

/// Luminance-preserving matrix: every channel becomes 0.299R + 0.587G + 0.114B.
const GREYSCALE_MATRIX: &str =
    "0.299 0.587 0.114 0 0 0.299 0.587 0.114 0 0 0.299 0.587 0.114 0 0 0 0 0 1 0";

fn filter_ref() -> String {
    format!("url(#{GREYSCALE_FILTER_ID})")
}

fn is_greyscale_filter(el: &Element) -> bool {
    el.is("filter") && el.id() == Some(GREYSCALE_FILTER_ID)
}

/// Insert the greyscale filter (once) and point every shape at it.
///
/// Returns the number of shapes referencing the filter afterwards.
pub fn apply_greyscale(doc: &mut IconDocument) -> usize {
    ensure_filter(doc.root_mut());

    let reference = filter_ref();
    let mut shapes = 0;
    doc.root_mut().walk_mut(&mut |el| {
        if !is_shape(el) {
            return;
        }
        el.set_attr("filter", &reference);

        let style = el
            .attr("style")
            .filter(|style| !style.contains("filter:"))
            .map(|style| format!("{style};filter:{reference}"));
        if let Some(style) = style {
            el.set_attr("style", &style);
        }
        shapes += 1;
    });
    shapes
}

/// Create `<defs>` when missing and the filter inside it when missing.
fn ensure_filter(root: &mut Element) {
    if root.find(&|el: &Element| el.is("defs")).is_none() {
        root.push_element(Element::new("defs"));
    }
    let Some(defs) = root.find_mut(&|el: &Element| el.is("defs")) else {
        return;
    };
    if defs.find(&is_greyscale_filter).is_some() {
        return;
    }

    let filter = defs.push_element(Element::new("filter").with_attr("id", GREYSCALE_FILTER_ID));
    filter.push_element(
        Element::new("feColorMatrix")
            .with_attr("type", "matrix")
            .with_attr("values", GREYSCALE_MATRIX),
    );
}

/// Whether the first `<defs>` defines the greyscale filter.
///
/// Only the definition is checked, not whether any shape references it.
pub fn is_greyscale(doc: &IconDocument) -> bool {
    doc.root()
        .find(&|el: &Element| el.is("defs"))
        .is_some_and(|defs| defs.find(&is_greyscale_filter).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORFUL: &str = r##"<svg xmlns="http://www.w3.org/2000/svg">
<g id="Blue"><path fill="#00ABF6"/><circle style="fill:#ff0000"/></g>
<rect style="filter:blur(1px)"/>
<text>label</text>
</svg>"##;

    fn count_filters(doc: &IconDocument) -> usize {
        let mut count = 0;
        doc.root().walk(&mut |el| {
            if is_greyscale_filter(el) {
                count += 1;
            }
        });
        count
    }

    #[test]
    fn test_greyscale_adds_defs_and_filter() {
        let mut doc = IconDocument::parse(COLORFUL).unwrap();
        assert!(!is_greyscale(&doc));

        assert_eq!(apply_greyscale(&mut doc), 3);
        assert!(is_greyscale(&doc));

        let defs = doc.root().child_elements().last().unwrap();
        assert!(defs.is("defs"));
        let filter = defs.child_elements().next().unwrap();
        let matrix = filter.child_elements().next().unwrap();
        assert!(matrix.is("feColorMatrix"));
        assert_eq!(matrix.attr("type"), Some("matrix"));
        assert_eq!(matrix.attr("values"), Some(GREYSCALE_MATRIX));
    }

    #[test]
    fn test_greyscale_references_on_shapes() {
        let mut doc = IconDocument::parse(COLORFUL).unwrap();
        apply_greyscale(&mut doc);
        let root = doc.root();

        let path = root.find(&|e| e.is("path")).unwrap();
        assert_eq!(path.attr("filter"), Some("url(#greyscale)"));
        assert!(!path.has_attr("style"));

        let circle = root.find(&|e| e.is("circle")).unwrap();
        assert_eq!(circle.attr("style"), Some("fill:#ff0000;filter:url(#greyscale)"));

        // An existing style filter is left as is.
        let rect = root.find(&|e| e.is("rect")).unwrap();
        assert_eq!(rect.attr("style"), Some("filter:blur(1px)"));
        assert_eq!(rect.attr("filter"), Some("url(#greyscale)"));

        let text = root.find(&|e| e.is("text")).unwrap();
        assert!(!text.has_attr("filter"));
    }

    #[test]
    fn test_greyscale_twice_defines_one_filter() {
        let mut doc = IconDocument::parse(COLORFUL).unwrap();
        apply_greyscale(&mut doc);
        let once = doc.clone();
        apply_greyscale(&mut doc);

        assert_eq!(count_filters(&doc), 1);
        assert_eq!(doc, once);
    }

    #[test]
    fn test_greyscale_reuses_existing_defs() {
        let mut doc = IconDocument::parse(
            r#"<svg><defs><linearGradient id="g"/></defs><path/></svg>"#,
        )
        .unwrap();
        apply_greyscale(&mut doc);
        let defs: Vec<_> = doc.root().child_elements().filter(|e| e.is("defs")).collect();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].child_elements().count(), 2);
    }

    #[test]
    fn test_is_greyscale_checks_definition_only() {
        let doc = IconDocument::parse(
            r#"<svg><defs><filter id="greyscale"/></defs><path fill="red"/></svg>"#,
        )
        .unwrap();
        assert!(is_greyscale(&doc));

        let doc = IconDocument::parse(r#"<svg><filter id="greyscale"/><path/></svg>"#).unwrap();
        assert!(!is_greyscale(&doc));
    }
}
