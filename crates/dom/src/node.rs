//! Markup node representation

use smallvec::SmallVec;
use std::fmt;

/// Unique identifier for a node in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node ID
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A single tag attribute.
///
/// `value` is `None` for bare attributes (`disabled`), which serialize
/// as the name alone. Duplicate names are kept in document order; name
/// lookup returns the first case-insensitive match.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Render the attribute as it appears inside a tag
    pub fn markup(&self) -> String {
        match &self.value {
            Some(value) => format!("{}=\"{}\"", self.name, value),
            None => self.name.clone(),
        }
    }
}

/// Kind of markup node: a closed two-variant union
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Element node (tag with attributes and children)
    Element(ElementData),
    /// Text content
    Text(String),
}

/// Element-specific data
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Tag name, original spelling preserved; identity is ASCII
    /// case-insensitive everywhere
    pub name: String,
    /// Ordered attributes (duplicates preserved)
    pub attributes: SmallVec<[Attribute; 4]>,
    /// Child node IDs (only elements have children)
    pub children: SmallVec<[NodeId; 8]>,
    /// Closed via `<tag/>` or auto-closed while childless
    pub terminated: bool,
    /// A separate matching `</tag>` was found and consumed
    pub explicitly_terminated: bool,
}

impl ElementData {
    /// Create a new element with the given tag name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: SmallVec::new(),
            children: SmallVec::new(),
            terminated: false,
            explicitly_terminated: false,
        }
    }

    /// Get an attribute by name (case-insensitive, first match wins)
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Get an attribute value by name
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.get_attribute(name)
            .and_then(|a| a.value.as_deref())
    }

    /// Set an attribute, replacing the first existing one of the same
    /// name or appending a new one
    pub fn set_attribute(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(&name))
        {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Check whether an attribute is present
    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// Whether this element is terminated. Tree shape wins over parse
    /// flags: an element with children is never terminated.
    pub fn is_terminated(&self) -> bool {
        self.children.is_empty() && self.terminated
    }

    /// Whether a matching close tag was consumed for this element
    pub fn is_explicitly_terminated(&self) -> bool {
        self.explicitly_terminated
    }

    /// Whether descendant text is raw (script/style bodies)
    pub fn no_escaping(&self) -> bool {
        self.name.eq_ignore_ascii_case("script") || self.name.eq_ignore_ascii_case("style")
    }
}

/// A node in the markup tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Node kind and associated data
    pub kind: NodeKind,
    /// Parent node ID (None for root-level nodes)
    pub parent: Option<NodeId>,
    /// Insert CRLF after this node's open/close tags when serializing
    pub add_line_breaks: bool,
}

impl Node {
    /// Create a new node
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            parent: None,
            add_line_breaks: false,
        }
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    /// Get element data if this is an element
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    /// Get mutable element data if this is an element
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    /// Get text content if this is a text node
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    /// Get the tag name if this is an element
    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|e| e.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_markup_forms() {
        let valued = Attribute::new("href", Some("x".into()));
        assert_eq!(valued.markup(), "href=\"x\"");

        let bare = Attribute::new("disabled", None);
        assert_eq!(bare.markup(), "disabled");
    }

    #[test]
    fn attribute_lookup_is_case_insensitive_first_wins() {
        let mut el = ElementData::new("div");
        el.attributes.push(Attribute::new("Class", Some("x".into())));
        el.attributes.push(Attribute::new("class", Some("y".into())));

        let found = el.get_attribute("CLASS").unwrap();
        assert_eq!(found.name, "Class");
        assert_eq!(found.value.as_deref(), Some("x"));
    }

    #[test]
    fn terminated_yields_to_children() {
        let mut el = ElementData::new("br");
        el.terminated = true;
        assert!(el.is_terminated());

        el.children.push(NodeId::new(7));
        assert!(!el.is_terminated());
    }

    #[test]
    fn no_escaping_for_script_and_style() {
        assert!(ElementData::new("SCRIPT").no_escaping());
        assert!(ElementData::new("Style").no_escaping());
        assert!(!ElementData::new("div").no_escaping());
    }
}
