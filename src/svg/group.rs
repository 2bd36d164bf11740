//! Color group discovery.
//!
//! A leaf group is a `<g id=...>` with no direct child `<g>` carrying an id.
//! Container groups (layers like `Layer_2`) are hidden from users.

use super::{Element, IconDocument};

/// Ids of leaf groups in document order. Repeated ids are kept.
pub fn list_leaf_groups(doc: &IconDocument) -> Vec<String> {
    let mut groups = Vec::new();
    let mut visit = |el: &Element| {
        if !el.is("g") {
            return;
        }
        let Some(id) = el.id() else { return };
        let is_container = el
            .child_elements()
            .any(|child| child.is("g") && child.id().is_some());
        if !is_container {
            groups.push(id.to_string());
        }
    };
    // The root itself never counts as a group.
    for child in doc.root().child_elements() {
        child.walk(&mut visit);
    }
    groups
}

/// First descendant `<g>` of `root` with the given id.
pub fn find_group<'a>(root: &'a mut Element, id: &str) -> Option<&'a mut Element> {
    root.find_mut(&|el: &Element| el.is("g") && el.id() == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_groups_excluded() {
        let doc = IconDocument::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg">
<g id="Body"><path fill="#ff0000"/></g>
<g id="Layer"><g id="Body"><path/></g></g>
</svg>"##,
        )
        .unwrap();
        assert_eq!(list_leaf_groups(&doc), vec!["Body", "Body"]);
    }

    #[test]
    fn test_nested_layer_scenario() {
        let doc = IconDocument::parse(
            r##"<svg><g id="Layer"><g id="Body"><path fill="#ff0000"/></g></g></svg>"##,
        )
        .unwrap();
        assert_eq!(list_leaf_groups(&doc), vec!["Body"]);
    }

    #[test]
    fn test_only_direct_children_make_a_container() {
        // The id'd group sits below an anonymous group, so `Outer` is a leaf.
        let doc = IconDocument::parse(
            r#"<svg><g id="Outer"><g><g id="Inner"/></g></g><g><path/></g></svg>"#,
        )
        .unwrap();
        assert_eq!(list_leaf_groups(&doc), vec!["Outer", "Inner"]);
    }

    #[test]
    fn test_root_is_not_a_group() {
        let mut doc = IconDocument::parse(r#"<g id="Top"><g id="Child"/></g>"#).unwrap();
        assert!(find_group(doc.root_mut(), "Top").is_none());
        assert!(find_group(doc.root_mut(), "Child").is_some());
        assert_eq!(list_leaf_groups(&doc), vec!["Child"]);
    }

    #[test]
    fn test_find_group_ignores_non_group_ids() {
        let mut doc =
            IconDocument::parse(r#"<svg><path id="Grey"/><g id="Grey"><rect/></g></svg>"#)
                .unwrap();
        let group = find_group(doc.root_mut(), "Grey").unwrap();
        assert!(group.is("g"));
    }
}
