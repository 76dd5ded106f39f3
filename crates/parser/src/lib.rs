//! Tagmend Parser
//!
//! Fault-tolerant markup tokenizer and tree construction. Raw text
//! flows through script/style guarding, comment stripping, a
//! five-state tokenizer and a repairing tree builder; malformed input
//! degrades to a best-effort tree and never produces an error.

mod guard;
mod comments;
mod tokenizer;
mod tree_builder;

pub use guard::{guard, unguard};
pub use comments::strip_comments;
pub use tokenizer::{Token, Tokenizer};
pub use tree_builder::TreeBuilder;

use tagmend_dom::MarkupTree;

/// Markup parser facade wiring the whole pipeline together.
///
/// `preserve_whitespace` keeps whitespace-only text runs as text
/// nodes; when off, CR/LF/TAB are stripped from text and blank runs
/// are dropped. `add_line_breaks` makes serialization emit CRLF after
/// open and close tags.
#[derive(Debug, Clone)]
pub struct MarkupParser {
    preserve_whitespace: bool,
    add_line_breaks: bool,
}

impl MarkupParser {
    /// Create a parser that preserves whitespace and adds no line
    /// breaks
    pub fn new() -> Self {
        Self {
            preserve_whitespace: true,
            add_line_breaks: false,
        }
    }

    /// Keep or drop whitespace-only text runs
    pub fn preserve_whitespace(mut self, on: bool) -> Self {
        self.preserve_whitespace = on;
        self
    }

    /// Emit CRLF after tags when serializing the resulting tree
    pub fn add_line_breaks(mut self, on: bool) -> Self {
        self.add_line_breaks = on;
        self
    }

    /// Parse markup text into an ordered forest. Infallible by
    /// contract: malformed markup yields a best-effort tree.
    pub fn parse(&self, input: &str) -> MarkupTree {
        let guarded = guard(&guard(input, "script"), "style");
        let stripped = strip_comments(&guarded);
        let tokens = Tokenizer::tokenize(&stripped);
        TreeBuilder::new(self.preserve_whitespace, self.add_line_breaks).build(tokens)
    }
}

impl Default for MarkupParser {
    fn default() -> Self {
        Self::new()
    }
}
