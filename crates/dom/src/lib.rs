//! Tagmend DOM - document model for repaired markup
//!
//! Provides the arena-based node tree that the parser builds and that
//! callers mutate (text replacement, node removal) before serializing
//! back to markup.

mod node;
mod tree;
mod error;
mod query;

pub use node::{Attribute, ElementData, Node, NodeId, NodeKind};
pub use tree::MarkupTree;
pub use error::{DomError, DomResult};
pub use query::Queryable;
