//! Placeholder accumulator
//!
//! Collects the translatable content of one message while its tree is walked.
//! Every markup node that the translator must not see is replaced by a numbered
//! placeholder component:
//!
//! ```ignore
//! let mut acc = MessageAccumulator::new();
//! acc.add_text("This is a ");
//! acc.push(bold, true);
//! acc.add_text("test");
//! acc.pop();
//! acc.add_text(" of parsing.");
//! assert_eq!(acc.minimal_string(), "This is a <c0>test</c0> of parsing.");
//! ```
//!
//! A component that receives no content is written self-closing (`<c1/>`).

use tracing::warn;

use super::ast::NodeId;
use crate::utils::is_white;

/// One placeholder of the mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Number used in `<cN>` tags
    pub index: usize,
    /// Node of the source tree the placeholder stands for
    pub origin: NodeId,
    /// Breaking scopes (containers, references) wrap translatable content;
    /// non-breaking ones (code, emoji) never do
    pub breaking: bool,
    /// Whether the placeholder was written as `<cN/>`
    pub self_closing: bool,
}

#[derive(Debug, Clone)]
enum Piece {
    Text(String),
    Component(Component),
}

#[derive(Debug, Clone)]
struct Component {
    index: usize,
    pieces: Vec<Piece>,
}

#[derive(Debug, Clone, Default)]
pub struct MessageAccumulator {
    pieces: Vec<Piece>,
    open: Vec<Component>,
    mapping: Vec<Placeholder>,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a placeholder scope for `origin` and assign it the next index
    pub fn push(&mut self, origin: NodeId, breaking: bool) -> usize {
        let index = self.mapping.len();
        self.mapping.push(Placeholder {
            index,
            origin,
            breaking,
            self_closing: true,
        });
        self.open.push(Component {
            index,
            pieces: Vec::new(),
        });
        index
    }

    /// Append text to the innermost open scope
    pub fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let pieces = self.current_pieces();
        if let Some(Piece::Text(last)) = pieces.last_mut() {
            last.push_str(text);
        } else {
            pieces.push(Piece::Text(text.to_string()));
        }
    }

    /// Close the innermost scope and return the node it was opened for.
    ///
    /// Returns `None` if no scope is open.
    pub fn pop(&mut self) -> Option<NodeId> {
        let Some(component) = self.open.pop() else {
            warn!("Unbalanced placeholder scope: pop without an open scope");
            return None;
        };
        let placeholder = &mut self.mapping[component.index];
        placeholder.self_closing = component.pieces.is_empty();
        let origin = placeholder.origin;
        self.current_pieces().push(Piece::Component(component));
        Some(origin)
    }

    /// Number of open scopes
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// True when neither text nor placeholders have been added
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty() && self.open.is_empty()
    }

    /// Count of non-whitespace characters accumulated so far
    pub fn text_length(&self) -> usize {
        fn count(pieces: &[Piece]) -> usize {
            pieces
                .iter()
                .map(|piece| match piece {
                    Piece::Text(text) => text.chars().filter(|&c| !is_white(c)).count(),
                    Piece::Component(component) => count(&component.pieces),
                })
                .sum()
        }
        count(&self.pieces) + self.open.iter().map(|component| count(&component.pieces)).sum::<usize>()
    }

    /// The placeholder-annotated string. Scopes still open are rendered as if
    /// they had been closed.
    pub fn minimal_string(&self) -> String {
        let mut out = String::new();
        render(&self.pieces, &mut out);
        // open scopes nest inside each other, innermost last
        let mut tail = String::new();
        for component in self.open.iter().rev() {
            let mut inner = String::new();
            render(&component.pieces, &mut inner);
            inner.push_str(&tail);
            tail = wrap(component.index, &inner);
        }
        out.push_str(&tail);
        out
    }

    pub fn mapping(&self) -> &[Placeholder] {
        &self.mapping
    }

    pub fn into_mapping(self) -> Vec<Placeholder> {
        self.mapping
    }

    fn current_pieces(&mut self) -> &mut Vec<Piece> {
        match self.open.last_mut() {
            Some(component) => &mut component.pieces,
            None => &mut self.pieces,
        }
    }
}

fn wrap(index: usize, inner: &str) -> String {
    if inner.is_empty() {
        format!("<c{}/>", index)
    } else {
        format!("<c{}>{}</c{}>", index, inner, index)
    }
}

fn render(pieces: &[Piece], out: &mut String) {
    for piece in pieces {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Component(component) => {
                let mut inner = String::new();
                render(&component.pieces, &mut inner);
                out.push_str(&wrap(component.index, &inner));
            }
        }
    }
}
