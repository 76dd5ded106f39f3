//! Tree search (find by tag name, find by attribute)
//!
//! Pre-order traversal in document order; all name comparisons are
//! ASCII case-insensitive.

use crate::node::NodeId;
use crate::tree::MarkupTree;

/// Trait for searching the markup tree
pub trait Queryable {
    /// Find elements by tag name across the whole forest
    fn find_by_name(&self, name: &str, recurse: bool) -> Vec<NodeId>;

    /// Find elements carrying an attribute of the given name
    fn find_by_attribute_name(&self, name: &str, recurse: bool) -> Vec<NodeId>;

    /// Find elements carrying an attribute with the given name and value
    fn find_by_attribute(&self, name: &str, value: &str, recurse: bool) -> Vec<NodeId>;

    /// Find elements by tag name within one subtree
    fn find_by_name_in(&self, scope: NodeId, name: &str, recurse: bool) -> Vec<NodeId>;

    /// Find elements with a named attribute within one subtree
    fn find_by_attribute_name_in(&self, scope: NodeId, name: &str, recurse: bool) -> Vec<NodeId>;

    /// Find elements with a name/value attribute pair within one subtree
    fn find_by_attribute_in(
        &self,
        scope: NodeId,
        name: &str,
        value: &str,
        recurse: bool,
    ) -> Vec<NodeId>;
}

/// One element-level match test. At most one hit per element: the scan
/// over its attributes stops at the first match.
fn matches(tree: &MarkupTree, id: NodeId, test: &Test<'_>) -> bool {
    let element = match tree.get(id).and_then(|n| n.as_element()) {
        Some(e) => e,
        None => return false,
    };
    match test {
        Test::Name(name) => element.name.eq_ignore_ascii_case(name),
        Test::AttributeName(name) => element
            .attributes
            .iter()
            .any(|a| a.name.eq_ignore_ascii_case(name)),
        Test::Attribute(name, value) => element.attributes.iter().any(|a| {
            a.name.eq_ignore_ascii_case(name)
                && a.value
                    .as_deref()
                    .map(|v| v.eq_ignore_ascii_case(value))
                    .unwrap_or(false)
        }),
    }
}

enum Test<'a> {
    Name(&'a str),
    AttributeName(&'a str),
    Attribute(&'a str, &'a str),
}

fn visit(tree: &MarkupTree, id: NodeId, test: &Test<'_>, recurse: bool, out: &mut Vec<NodeId>) {
    if matches(tree, id, test) {
        out.push(id);
    }
    if recurse {
        if let Some(element) = tree.get(id).and_then(|n| n.as_element()) {
            for &child in &element.children {
                visit(tree, child, test, recurse, out);
            }
        }
    }
}

fn search(tree: &MarkupTree, scope: Option<NodeId>, test: Test<'_>, recurse: bool) -> Vec<NodeId> {
    let mut out = Vec::new();
    match scope {
        Some(id) => {
            if let Some(element) = tree.get(id).and_then(|n| n.as_element()) {
                for &child in &element.children {
                    visit(tree, child, &test, recurse, &mut out);
                }
            }
        }
        None => {
            for &root in tree.roots() {
                visit(tree, root, &test, recurse, &mut out);
            }
        }
    }
    out
}

impl Queryable for MarkupTree {
    fn find_by_name(&self, name: &str, recurse: bool) -> Vec<NodeId> {
        search(self, None, Test::Name(name), recurse)
    }

    fn find_by_attribute_name(&self, name: &str, recurse: bool) -> Vec<NodeId> {
        search(self, None, Test::AttributeName(name), recurse)
    }

    fn find_by_attribute(&self, name: &str, value: &str, recurse: bool) -> Vec<NodeId> {
        search(self, None, Test::Attribute(name, value), recurse)
    }

    fn find_by_name_in(&self, scope: NodeId, name: &str, recurse: bool) -> Vec<NodeId> {
        search(self, Some(scope), Test::Name(name), recurse)
    }

    fn find_by_attribute_name_in(&self, scope: NodeId, name: &str, recurse: bool) -> Vec<NodeId> {
        search(self, Some(scope), Test::AttributeName(name), recurse)
    }

    fn find_by_attribute_in(
        &self,
        scope: NodeId,
        name: &str,
        value: &str,
        recurse: bool,
    ) -> Vec<NodeId> {
        search(self, Some(scope), Test::Attribute(name, value), recurse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (MarkupTree, NodeId, NodeId, NodeId) {
        let mut tree = MarkupTree::new();
        let outer = tree.create_element("DIV");
        let inner = tree.create_element("div");
        let span = tree.create_element("span");
        tree.get_mut(span)
            .unwrap()
            .as_element_mut()
            .unwrap()
            .set_attribute("Class", Some("Note".into()));
        tree.append_root(outer);
        tree.append_child(outer, inner).unwrap();
        tree.append_child(inner, span).unwrap();
        (tree, outer, inner, span)
    }

    #[test]
    fn test_find_by_name_case_insensitive() {
        let (tree, outer, inner, _) = sample();

        let upper = tree.find_by_name("DIV", true);
        let lower = tree.find_by_name("div", true);
        assert_eq!(upper, lower);
        assert_eq!(upper, vec![outer, inner]);
    }

    #[test]
    fn test_find_without_recursion_stays_at_top_level() {
        let (tree, outer, _, _) = sample();

        assert_eq!(tree.find_by_name("div", false), vec![outer]);
        assert!(tree.find_by_name("span", false).is_empty());
    }

    #[test]
    fn test_find_by_attribute() {
        let (tree, _, _, span) = sample();

        assert_eq!(tree.find_by_attribute_name("class", true), vec![span]);
        assert_eq!(tree.find_by_attribute("CLASS", "note", true), vec![span]);
        assert!(tree.find_by_attribute("class", "other", true).is_empty());
    }

    #[test]
    fn test_one_hit_per_element_with_duplicate_attributes() {
        let mut tree = MarkupTree::new();
        let a = tree.create_element("a");
        {
            let element = tree.get_mut(a).unwrap().as_element_mut().unwrap();
            element
                .attributes
                .push(crate::node::Attribute::new("rel", Some("x".into())));
            element
                .attributes
                .push(crate::node::Attribute::new("REL", Some("x".into())));
        }
        tree.append_root(a);

        assert_eq!(tree.find_by_attribute_name("rel", true), vec![a]);
    }

    #[test]
    fn test_scoped_search() {
        let (tree, outer, inner, span) = sample();

        assert_eq!(tree.find_by_name_in(outer, "div", true), vec![inner]);
        assert_eq!(tree.find_by_name_in(inner, "span", true), vec![span]);
        assert!(tree.find_by_name_in(span, "div", true).is_empty());
        assert_eq!(
            tree.find_by_attribute_name_in(outer, "class", true),
            vec![span]
        );
        assert_eq!(
            tree.find_by_attribute_in(outer, "class", "note", true),
            vec![span]
        );
    }
}
