//! Linearize a markup tree into one translatable unit.
//!
//! The walk decides which nodes become placeholders:
//! - text is translatable content
//! - bold, italic, strike and quote containers wrap their children in a paired
//!   placeholder
//! - references wrap their label; the target never reaches the translator
//! - code, preformatted text and emoji become self-closing placeholders
//! - groups are transparent
//!
//! Whitespace before the first content of the message is kept aside as a
//! verbatim prefix instead of being sent for translation.

use super::accumulator::{MessageAccumulator, Placeholder};
use super::ast::{MarkupTree, NodeId, NodeKind};
use crate::utils::{contains_actual_text, is_white};

/// The translatable form of one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageUnit {
    /// Placeholder-annotated string sent for translation
    pub source: String,
    /// Whitespace that preceded the first content of the message
    pub prefix: String,
    pub mapping: Vec<Placeholder>,
}

struct Walker<'t> {
    tree: &'t MarkupTree,
    acc: MessageAccumulator,
    prefix: String,
}

impl Walker<'_> {
    fn walk(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::Text(text) => self.text(text),
            NodeKind::Container { children, .. } => {
                if !children.is_empty() {
                    self.acc.push(id, true);
                    self.walk_all(children);
                    self.acc.pop();
                }
            }
            NodeKind::Reference { label, .. } => {
                self.acc.push(id, true);
                if let Some(label) = label {
                    self.walk_all(label);
                }
                self.acc.pop();
            }
            NodeKind::Opaque { .. } => {
                self.acc.push(id, false);
                self.acc.pop();
            }
            NodeKind::Group(children) => self.walk_all(children),
        }
    }

    fn walk_all(&mut self, children: &[NodeId]) {
        for &child in children {
            self.walk(child);
        }
    }

    fn text(&mut self, text: &str) {
        if !self.acc.is_empty() {
            self.acc.add_text(text);
            return;
        }
        let content = text.trim_start_matches(is_white);
        self.prefix.push_str(&text[..text.len() - content.len()]);
        self.acc.add_text(content);
    }
}

/// Walk `tree` and build its translatable unit.
///
/// Returns `None` when the message holds nothing worth translating: no
/// non-whitespace text at all, or only punctuation and symbols.
pub fn segment(tree: &MarkupTree) -> Option<MessageUnit> {
    let mut walker = Walker {
        tree,
        acc: MessageAccumulator::new(),
        prefix: String::new(),
    };
    walker.walk(tree.root());

    if walker.acc.text_length() == 0 {
        return None;
    }
    let source = walker.acc.minimal_string();
    if !contains_actual_text(&source) {
        return None;
    }
    Some(MessageUnit {
        source,
        prefix: walker.prefix,
        mapping: walker.acc.into_mapping(),
    })
}
