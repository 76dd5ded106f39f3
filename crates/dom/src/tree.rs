//! Markup tree structure
//!
//! An ordered forest of element/text nodes. All nodes live in one
//! arena; the forest roots are the document's top-level siblings.

use rustc_hash::FxHashMap;
use std::fmt;

use crate::error::{DomError, DomResult};
use crate::node::{ElementData, Node, NodeId, NodeKind};

/// Markup tree that owns all nodes
pub struct MarkupTree {
    /// All nodes in the tree
    nodes: FxHashMap<NodeId, Node>,
    /// Next available node ID
    next_id: u32,
    /// Ordered root-level nodes
    roots: Vec<NodeId>,
}

impl MarkupTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            next_id: 0,
            roots: Vec::new(),
        }
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// The ordered root-level nodes
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Create a new element node (not yet attached anywhere)
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;

        let element = ElementData::new(name);
        let node = Node::new(id, NodeKind::Element(element));
        self.nodes.insert(id, node);

        id
    }

    /// Create a new text node (not yet attached anywhere)
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;

        let node = Node::new(id, NodeKind::Text(content.into()));
        self.nodes.insert(id, node);

        id
    }

    /// Append a parentless node to the root-level siblings
    pub fn append_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    /// Append a child node to a parent element.
    ///
    /// Setting the child's parent link and inserting it into the
    /// parent's child list happen in this one call; the tree is never
    /// observable in between.
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) -> DomResult<()> {
        if !self.nodes.contains_key(&child_id) {
            return Err(DomError::NodeNotFound(child_id.0));
        }

        {
            let parent = self
                .get_mut(parent_id)
                .ok_or(DomError::NodeNotFound(parent_id.0))?;
            let element = parent.as_element_mut().ok_or_else(|| {
                DomError::InvalidNodeOperation("text nodes cannot have children".into())
            })?;
            element.children.push(child_id);
        }

        if let Some(child) = self.get_mut(child_id) {
            child.parent = Some(parent_id);
        }

        Ok(())
    }

    /// Detach a node from its parent.
    ///
    /// No-op for root-level nodes and for already-detached or unknown
    /// nodes, so repeated calls are safe.
    pub fn detach(&mut self, id: NodeId) {
        let parent_id = match self.get(id).and_then(|n| n.parent) {
            Some(p) => p,
            None => {
                log::trace!("detach: {} has no parent, nothing to do", id);
                return;
            }
        };

        if let Some(element) = self.get_mut(parent_id).and_then(|n| n.as_element_mut()) {
            element.children.retain(|c| *c != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    /// Get the children of an element node.
    ///
    /// Text nodes are leaves; asking for their children is a contract
    /// violation, not a parse failure.
    pub fn children(&self, id: NodeId) -> DomResult<&[NodeId]> {
        let node = self.get(id).ok_or(DomError::NodeNotFound(id.0))?;
        match &node.kind {
            NodeKind::Element(element) => Ok(&element.children),
            NodeKind::Text(_) => Err(DomError::InvalidNodeOperation(
                "text nodes have no children".into(),
            )),
        }
    }

    /// Position of a node within its parent's children (None if root)
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent_id = self.get(id)?.parent?;
        let element = self.get(parent_id)?.as_element()?;
        element.children.iter().position(|c| *c == id)
    }

    /// Next sibling, computed through the parent's child list
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent_id = self.get(id)?.parent?;
        let element = self.get(parent_id)?.as_element()?;
        let index = element.children.iter().position(|c| *c == id)?;
        element.children.get(index + 1).copied()
    }

    /// Previous sibling, computed through the parent's child list
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent_id = self.get(id)?.parent?;
        let element = self.get(parent_id)?.as_element()?;
        let index = element.children.iter().position(|c| *c == id)?;
        index.checked_sub(1).and_then(|i| element.children.get(i).copied())
    }

    /// First child of an element (None for text nodes)
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.as_element()?.children.first().copied()
    }

    /// Last child of an element (None for text nodes)
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.as_element()?.children.last().copied()
    }

    /// Get the text of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| n.as_text())
    }

    /// Replace the text of a text node (the write-back hook for
    /// callers substituting translated strings)
    pub fn set_text(&mut self, id: NodeId, content: impl Into<String>) -> DomResult<()> {
        let node = self.get_mut(id).ok_or(DomError::NodeNotFound(id.0))?;
        match &mut node.kind {
            NodeKind::Text(text) => {
                *text = content.into();
                Ok(())
            }
            NodeKind::Element(_) => Err(DomError::InvalidNodeOperation(
                "cannot set text on an element node".into(),
            )),
        }
    }

    /// Get the text content of a node and all its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.collect_text(id, &mut result);
        result
    }

    fn collect_text(&self, id: NodeId, result: &mut String) {
        if let Some(node) = self.get(id) {
            match &node.kind {
                NodeKind::Text(text) => result.push_str(text),
                NodeKind::Element(element) => {
                    for &child_id in &element.children {
                        self.collect_text(child_id, result);
                    }
                }
            }
        }
    }

    /// Whether a node's text content is raw (inside script/style)
    pub fn no_escaping(&self, id: NodeId) -> bool {
        match self.get(id) {
            Some(node) => match &node.kind {
                NodeKind::Element(element) => element.no_escaping(),
                NodeKind::Text(_) => node
                    .parent
                    .map(|p| self.no_escaping(p))
                    .unwrap_or(false),
            },
            None => false,
        }
    }

    /// Get the number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize the whole forest back to markup text
    pub fn markup(&self) -> String {
        let mut output = String::new();
        for &root in &self.roots {
            self.write_node(root, &mut output);
        }
        output
    }

    /// Serialize a single subtree back to markup text
    pub fn node_markup(&self, id: NodeId) -> String {
        let mut output = String::new();
        self.write_node(id, &mut output);
        output
    }

    fn write_node(&self, id: NodeId, output: &mut String) {
        let node = match self.get(id) {
            Some(n) => n,
            None => return,
        };

        match &node.kind {
            // Text is emitted verbatim; guard substitution was undone
            // during tree construction and no entity pass exists.
            NodeKind::Text(text) => output.push_str(text),
            NodeKind::Element(element) => {
                output.push('<');
                output.push_str(&element.name);
                for attr in &element.attributes {
                    output.push(' ');
                    output.push_str(&attr.markup());
                }

                if !element.children.is_empty() {
                    output.push('>');
                    if node.add_line_breaks {
                        output.push_str("\r\n");
                    }
                    for &child_id in &element.children {
                        self.write_node(child_id, output);
                    }
                    output.push_str("</");
                    output.push_str(&element.name);
                    output.push('>');
                } else if element.explicitly_terminated {
                    output.push_str("></");
                    output.push_str(&element.name);
                    output.push('>');
                } else if element.terminated {
                    output.push_str("/>");
                } else {
                    output.push('>');
                }

                if node.add_line_breaks {
                    output.push_str("\r\n");
                }
            }
        }
    }

    /// Pretty print the tree for debugging
    pub fn pretty_print(&self) -> String {
        let mut output = String::new();
        for &root in &self.roots {
            self.print_node(root, 0, &mut output);
        }
        output
    }

    fn print_node(&self, id: NodeId, depth: usize, output: &mut String) {
        let indent = "  ".repeat(depth);

        if let Some(node) = self.get(id) {
            match &node.kind {
                NodeKind::Element(element) => {
                    let attrs: Vec<String> =
                        element.attributes.iter().map(|a| a.markup()).collect();
                    let attrs_str = if attrs.is_empty() {
                        String::new()
                    } else {
                        format!(" {}", attrs.join(" "))
                    };
                    output.push_str(&format!("{}<{}{}>\n", indent, element.name, attrs_str));
                    for &child_id in &element.children {
                        self.print_node(child_id, depth + 1, output);
                    }
                }
                NodeKind::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        output.push_str(&format!("{}#text: {:?}\n", indent, trimmed));
                    }
                }
            }
        }
    }
}

impl Default for MarkupTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MarkupTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty_print())
    }
}
