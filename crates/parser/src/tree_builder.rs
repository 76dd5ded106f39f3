//! Tree builder
//!
//! Consumes the token stream and produces an ordered forest of
//! element/text nodes, repairing malformed nesting as it goes. A flat
//! list of top-level nodes doubles as the set of auto-close
//! candidates: a `</tag>` pairs with the most recently opened,
//! still-childless element of the same name, and everything opened
//! after it becomes its children.

use tagmend_dom::{Attribute, MarkupTree, NodeId};

use crate::guard::unguard;
use crate::tokenizer::Token;

/// Builds a markup tree from a token stream
pub struct TreeBuilder {
    tree: MarkupTree,
    /// Top-level siblings accumulated so far; unclosed elements among
    /// them are the auto-close candidates
    pending: Vec<NodeId>,
    tokens: Vec<Token>,
    pos: usize,
    preserve_whitespace: bool,
    add_line_breaks: bool,
}

impl TreeBuilder {
    /// Create a new tree builder
    pub fn new(preserve_whitespace: bool, add_line_breaks: bool) -> Self {
        Self {
            tree: MarkupTree::new(),
            pending: Vec::new(),
            tokens: Vec::new(),
            pos: 0,
            preserve_whitespace,
            add_line_breaks,
        }
    }

    /// Build an ordered forest from tokens. Never fails: malformed
    /// token sequences degrade to a best-effort tree.
    pub fn build(mut self, tokens: Vec<Token>) -> MarkupTree {
        self.tokens = tokens;

        while let Some(token) = self.next() {
            match token {
                Token::OpenBracket => self.handle_open_tag(),
                Token::OpenCloseBracket => self.handle_close_tag(),
                Token::Literal(text) => self.handle_text(text),
                // Stray brackets and equals have no tree effect
                Token::CloseBracket | Token::SelfCloseBracket | Token::Equals => {}
            }
        }

        // Elements still open at EOF stay open; the flat list becomes
        // the forest roots
        for id in self.pending.drain(..) {
            self.tree.append_root(id);
        }
        self.tree
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// An OpenBracket was consumed: read the tag name and attributes
    /// through the closing bracket
    fn handle_open_tag(&mut self) {
        let name = match self.next() {
            Some(Token::Literal(name)) => name,
            Some(_) => {
                self.pos -= 1;
                return;
            }
            None => return,
        };

        let id = self.tree.create_element(name);
        if let Some(node) = self.tree.get_mut(id) {
            node.add_line_breaks = self.add_line_breaks;
        }

        loop {
            match self.next() {
                Some(Token::Literal(attr_name)) => {
                    let value = if self.peek() == Some(&Token::Equals) {
                        self.pos += 1;
                        match self.next() {
                            Some(Token::Literal(value)) => Some(value),
                            Some(_) => {
                                // Equals with no value literal: bare
                                // attribute, reprocess the bracket
                                self.pos -= 1;
                                None
                            }
                            None => None,
                        }
                    } else {
                        None
                    };
                    if let Some(element) = self.tree.get_mut(id).and_then(|n| n.as_element_mut())
                    {
                        element.attributes.push(Attribute::new(attr_name, value));
                    }
                }
                Some(Token::CloseBracket) | None => break,
                Some(Token::SelfCloseBracket) => {
                    if let Some(element) = self.tree.get_mut(id).and_then(|n| n.as_element_mut())
                    {
                        element.terminated = true;
                    }
                    break;
                }
                // A new tag began before this one closed: hand the
                // token back to the main loop
                Some(Token::OpenBracket) | Some(Token::OpenCloseBracket) => {
                    self.pos -= 1;
                    break;
                }
                Some(Token::Equals) => {}
            }
        }

        self.pending.push(id);
    }

    /// An OpenCloseBracket (`</`) was consumed: pair it with the
    /// nearest still-open element of the same name
    fn handle_close_tag(&mut self) {
        let name = match self.next() {
            Some(Token::Literal(name)) => name,
            Some(_) => {
                self.pos -= 1;
                return;
            }
            None => return,
        };
        if self.peek() == Some(&Token::CloseBracket) {
            self.pos += 1;
        }

        let matched = self.pending.iter().rposition(|&id| {
            self.tree
                .get(id)
                .and_then(|n| n.as_element())
                .map(|e| {
                    e.name.eq_ignore_ascii_case(&name)
                        && e.children.is_empty()
                        && !e.terminated
                })
                .unwrap_or(false)
        });

        let position = match matched {
            Some(p) => p,
            None => {
                log::debug!("discarding unmatched close tag </{}>", name);
                return;
            }
        };

        // Everything opened after the matched element is re-parented
        // under it, in original order
        let id = self.pending[position];
        let reparented: Vec<NodeId> = self.pending.drain(position + 1..).collect();
        let adopted_any = !reparented.is_empty();
        for child in reparented {
            // Infallible here: the matched node is a parentless element
            let _ = self.tree.append_child(id, child);
        }

        if let Some(element) = self.tree.get_mut(id).and_then(|n| n.as_element_mut()) {
            element.explicitly_terminated = true;
            if !adopted_any {
                element.terminated = true;
            }
        }
    }

    /// Wrap a literal text token as a text node
    fn handle_text(&mut self, text: String) {
        let mut text = text;
        if !self.preserve_whitespace {
            text.retain(|c| !matches!(c, '\r' | '\n' | '\t'));
            if text.trim().is_empty() {
                return;
            }
        }

        let text = unguard(&text);
        if text.is_empty() {
            return;
        }

        let id = self.tree.create_text(text);
        self.pending.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;
    use tagmend_dom::Queryable;

    fn parse(input: &str) -> MarkupTree {
        TreeBuilder::new(true, false).build(Tokenizer::tokenize(input))
    }

    fn parse_stripped(input: &str) -> MarkupTree {
        TreeBuilder::new(false, false).build(Tokenizer::tokenize(input))
    }

    #[test]
    fn test_simple_nesting() {
        let tree = parse("<div><p>hi</p></div>");

        let divs = tree.find_by_name("div", true);
        assert_eq!(divs.len(), 1);
        let ps = tree.find_by_name("p", true);
        assert_eq!(ps.len(), 1);
        assert_eq!(tree.get(ps[0]).unwrap().parent, Some(divs[0]));
        assert_eq!(tree.text_content(divs[0]), "hi");
    }

    #[test]
    fn test_self_closing_fidelity() {
        let tree = parse("<br/>");

        let brs = tree.find_by_name("br", true);
        assert_eq!(brs.len(), 1);
        let element = tree.get(brs[0]).unwrap().as_element().unwrap();
        assert!(element.children.is_empty());
        assert!(element.is_terminated());
        assert!(!element.is_explicitly_terminated());
        assert_eq!(tree.markup(), "<br/>");
    }

    #[test]
    fn test_explicit_close_marks_element() {
        let tree = parse("<p></p>");

        let p = tree.find_by_name("p", true)[0];
        let element = tree.get(p).unwrap().as_element().unwrap();
        assert!(element.is_explicitly_terminated());
        assert!(element.is_terminated());
        assert_eq!(tree.markup(), "<p></p>");
    }

    #[test]
    fn test_attributes_ordered_and_bare() {
        let tree = parse("<input type=\"text\" Disabled value=5>");

        let input = tree.find_by_name("input", true)[0];
        let element = tree.get(input).unwrap().as_element().unwrap();
        assert_eq!(element.attributes.len(), 3);
        assert_eq!(element.attribute_value("TYPE"), Some("text"));
        assert_eq!(element.get_attribute("disabled").unwrap().value, None);
        assert_eq!(element.attribute_value("value"), Some("5"));
    }

    #[test]
    fn test_duplicate_attributes_preserved_first_found() {
        let tree = parse("<a rel=\"x\" REL=\"y\">t</a>");

        let a = tree.find_by_name("a", true)[0];
        let element = tree.get(a).unwrap().as_element().unwrap();
        assert_eq!(element.attributes.len(), 2);
        assert_eq!(element.attribute_value("rel"), Some("x"));
    }

    #[test]
    fn test_auto_close_reparents_in_order() {
        let tree = parse("<div>a<b>c</b>d</div>");

        let div = tree.find_by_name("div", true)[0];
        let children = tree.children(div).unwrap().to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(tree.text(children[0]), Some("a"));
        assert_eq!(
            tree.get(children[1]).unwrap().tag_name(),
            Some("b")
        );
        assert_eq!(tree.text(children[2]), Some("d"));
        assert_eq!(tree.text_content(div), "acd");
    }

    #[test]
    fn test_missing_closes_stay_open_as_siblings() {
        // No </p> ever arrives, so nothing is auto-closed: both
        // elements and both texts remain top-level siblings
        let tree = parse("<p>a<p>b");

        assert_eq!(tree.roots().len(), 4);
        let ps = tree.find_by_name("p", false);
        assert_eq!(ps.len(), 2);
        for p in &ps {
            let element = tree.get(*p).unwrap().as_element().unwrap();
            assert!(!element.is_terminated());
            assert!(!element.is_explicitly_terminated());
            assert!(element.children.is_empty());
        }
        assert_eq!(tree.markup(), "<p>a<p>b");
    }

    #[test]
    fn test_close_pairs_with_nearest_childless_match() {
        // The second <p> is the nearest open childless match, so it
        // adopts "b"; the first <p> then adopts everything after it
        let tree = parse("<p>a<p>b</p>c</p>");

        assert_eq!(tree.roots().len(), 1);
        let outer = tree.roots()[0];
        let children = tree.children(outer).unwrap().to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(tree.text(children[0]), Some("a"));
        assert_eq!(tree.text_content(children[1]), "b");
        assert_eq!(tree.text(children[2]), Some("c"));
    }

    #[test]
    fn test_stray_close_tag_discarded() {
        let tree = parse("a</b>c");

        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.text_content(tree.roots()[0]), "a");
        assert_eq!(tree.text_content(tree.roots()[1]), "c");
        assert!(tree.find_by_name("b", true).is_empty());
    }

    #[test]
    fn test_close_tag_is_case_insensitive() {
        let tree = parse("<DIV>x</div>");

        let div = tree.find_by_name("div", true)[0];
        let element = tree.get(div).unwrap().as_element().unwrap();
        assert_eq!(element.name, "DIV");
        assert!(element.is_explicitly_terminated());
        assert_eq!(tree.text_content(div), "x");
    }

    #[test]
    fn test_close_skips_elements_with_children() {
        // The inner <i> already has children by the time the second
        // </i> arrives, so that close is discarded rather than
        // re-closing it
        let tree = parse("<i>a</i></i>");

        assert_eq!(tree.roots().len(), 1);
        let i = tree.roots()[0];
        assert_eq!(tree.text_content(i), "a");
    }

    #[test]
    fn test_declaration_becomes_leaf_element() {
        let tree = parse("<!DOCTYPE html><p>x</p>");

        assert_eq!(tree.roots().len(), 2);
        let decl = tree.get(tree.roots()[0]).unwrap().as_element().unwrap();
        assert_eq!(decl.name, "!DOCTYPE html");
        assert!(decl.attributes.is_empty());
    }

    #[test]
    fn test_whitespace_text_stripped_when_requested() {
        let tree = parse_stripped("<div>\n  \n</div>");
        let div = tree.find_by_name("div", true)[0];
        assert!(tree.children(div).unwrap().is_empty());

        let kept = parse("<div>\n  \n</div>");
        let div = kept.find_by_name("div", true)[0];
        let children = kept.children(div).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(kept.text(children[0]), Some("\n  \n"));
    }

    #[test]
    fn test_whitespace_stripping_keeps_real_text() {
        let tree = parse_stripped("<p>\n  hello\n</p>");
        let p = tree.find_by_name("p", true)[0];
        assert_eq!(tree.text_content(p), "  hello");
    }

    #[test]
    fn test_unclosed_at_eof_stays_open() {
        let tree = parse("<div><span>text");

        let div = tree.find_by_name("div", false);
        assert_eq!(div.len(), 1);
        let element = tree.get(div[0]).unwrap().as_element().unwrap();
        assert!(!element.is_explicitly_terminated());
        // div never got a close tag, so span and text are siblings of
        // it, not children
        assert_eq!(tree.roots().len(), 3);
    }

    #[test]
    fn test_never_panics_on_malformed_soup() {
        for input in [
            "",
            "<",
            "</",
            "<>",
            "</>",
            "<a",
            "<a b",
            "<a b=",
            "<a b='",
            "</a></a>",
            "<<<>>>",
            "=<a=b>=",
            "text only",
        ] {
            let _ = parse(input);
        }
    }

    #[test]
    fn test_line_break_flag_propagates() {
        let tree = TreeBuilder::new(true, true).build(Tokenizer::tokenize("<br/>"));
        assert_eq!(tree.markup(), "<br/>\r\n");
    }
}
