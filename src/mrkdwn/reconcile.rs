//! Map a translated placeholder string back onto its source tree.
//!
//! # Example
//!
//! ```ignore
//! Source:      "This is a *test* of parsing."
//! Extracted:   "This is a <c0>test</c0> of parsing."
//! Translated:  "Ceci est un <c0>essai</c0> de l'analyse."
//! Localized:   "Ceci est un *essai* de l'analyse."
//! ```
//!
//! The translated string decides order and nesting. Each placeholder becomes a
//! component that refers to the source node it stands for; the serializer then
//! writes that node's markup around the translated content. Problems with
//! placeholders never fail the reconciliation:
//! - a placeholder the source does not have is dropped together with its content
//! - a source placeholder the translation does not use is simply absent
//! - content given to a code or emoji placeholder is ignored
//! - placeholders nested deeper than the parser's nesting limit stay literal text
//!
//! Each of these is logged and returned as a warning.

use tracing::warn;

use super::accumulator::Placeholder;
use super::ast::{MarkupTree, NodeId};
use super::parser::MAX_NESTING;
use super::placeholder::{Fragment, parse_placeholders};

/// A node of a localized message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalNode {
    Text(String),
    /// Stands for the source node `origin`, with translated children
    Component { origin: NodeId, children: Vec<LocalNode> },
}

/// A localized message: translated content arranged around references to the
/// nodes of the (unchanged) source tree
#[derive(Debug, Clone)]
pub struct LocalizedTree<'s> {
    source: &'s MarkupTree,
    children: Vec<LocalNode>,
}

impl<'s> LocalizedTree<'s> {
    pub fn new(source: &'s MarkupTree, children: Vec<LocalNode>) -> Self {
        LocalizedTree { source, children }
    }

    pub fn source(&self) -> &'s MarkupTree {
        self.source
    }

    pub fn children(&self) -> &[LocalNode] {
        &self.children
    }

    /// Insert verbatim text before all other content
    pub fn prepend_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.children.insert(0, LocalNode::Text(text.to_string()));
        }
    }
}

impl std::fmt::Display for LocalizedTree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", super::serializer::serialize_localized(self))
    }
}

/// Result of reconciling one translated string
#[derive(Debug, Clone)]
pub struct Reconciliation<'s> {
    pub tree: LocalizedTree<'s>,
    /// Placeholder problems found in the translation
    pub warnings: Vec<String>,
}

struct Reconciler<'m> {
    mapping: &'m [Placeholder],
    used: Vec<bool>,
    warnings: Vec<String>,
}

impl Reconciler<'_> {
    fn build(&mut self, text: &str, depth: usize) -> Vec<LocalNode> {
        if depth > MAX_NESTING {
            self.warnings.push(format!(
                "Placeholders nested deeper than {} levels are kept as text",
                MAX_NESTING
            ));
            return vec![LocalNode::Text(text.to_string())];
        }

        let mut nodes = Vec::new();
        for fragment in parse_placeholders(text) {
            match fragment {
                Fragment::Text(run) => nodes.push(LocalNode::Text(run.to_string())),
                Fragment::Placeholder(token) => {
                    let Some(placeholder) = self.mapping.get(token.index) else {
                        self.warnings.push(format!(
                            "Dropping placeholder <c{}> which does not exist in the source",
                            token.index
                        ));
                        continue;
                    };
                    self.used[token.index] = true;

                    let children = if placeholder.breaking {
                        self.build(token.inner, depth + 1)
                    } else {
                        if !token.inner.is_empty() {
                            self.warnings.push(format!(
                                "Ignoring translated content of placeholder <c{}> which stands for verbatim markup",
                                token.index
                            ));
                        }
                        Vec::new()
                    };
                    nodes.push(LocalNode::Component {
                        origin: placeholder.origin,
                        children,
                    });
                }
            }
        }
        nodes
    }
}

/// Rebuild a localized tree from a translated placeholder string.
///
/// # Arguments
/// * `translated` - The translated string containing `<cN>` placeholders
/// * `source` - The tree the placeholders were extracted from
/// * `mapping` - The placeholder mapping recorded during extraction
pub fn reconcile<'s>(translated: &str, source: &'s MarkupTree, mapping: &[Placeholder]) -> Reconciliation<'s> {
    let mut reconciler = Reconciler {
        mapping,
        used: vec![false; mapping.len()],
        warnings: Vec::new(),
    };
    let children = reconciler.build(translated, 0);

    for placeholder in mapping {
        if !reconciler.used[placeholder.index] {
            reconciler.warnings.push(format!(
                "Placeholder <c{}> is missing from the translation",
                placeholder.index
            ));
        }
    }
    for warning in &reconciler.warnings {
        warn!("{}", warning);
    }

    Reconciliation {
        tree: LocalizedTree::new(source, children),
        warnings: reconciler.warnings,
    }
}
