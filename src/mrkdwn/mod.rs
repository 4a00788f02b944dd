/// Slack mrkdwn segmentation and reconstruction
///
/// This module turns mrkdwn strings into translatable units and rebuilds
/// localized mrkdwn from their translations, without ever letting the translator
/// touch link targets, mentions, code or emoji.
///
/// # Overview
///
/// 1. **Parser** - Builds an arena tree of text, formatting containers, references and opaque spans
/// 2. **Segmenter** - Walks the tree and feeds the placeholder accumulator
/// 3. **Accumulator** - Produces the `<cN>...</cN>` string and the placeholder mapping
/// 4. **Reconciler** - Maps a translated placeholder string back onto the source tree
/// 5. **Serializer** - Writes source or localized trees back out as mrkdwn
/// 6. **Message modules** - Reads and writes the JavaScript files holding the messages
/// 7. **JSON message files** - Reads JSON5 message files and writes them back as JSON
///
/// # Example
///
/// ```ignore
/// use loctool::mrkdwn::{Parser, segment, reconcile};
///
/// let tree = Parser::new("This is a *test* of parsing.").parse()?;
/// let unit = segment(&tree).unwrap();
/// assert_eq!(unit.source, "This is a <c0>test</c0> of parsing.");
///
/// let result = reconcile("Ceci est un <c0>essai</c0> de l'analyse.", &tree, &unit.mapping);
/// assert_eq!(result.tree.to_string(), "Ceci est un *essai* de l'analyse.");
/// ```
pub mod accumulator;
pub mod ast;
pub mod error;
pub mod file;
pub mod json_file;
pub mod parser;
pub mod placeholder;
pub mod reconcile;
pub mod segmenter;
pub mod serializer;


pub use accumulator::{MessageAccumulator, Placeholder};
pub use ast::{ContainerTag, MarkupTree, NodeId, NodeKind, OpaqueTag, ReferenceTarget};
pub use error::{MarkupError, MarkupResult};
pub use file::{MessageEntry, MrkdwnFile, MrkdwnFileType, SegmentedMessage};
pub use json_file::{JsonMessage, MrkdwnJsonFile, MrkdwnJsonFileType};
pub use parser::Parser;
pub use placeholder::{Fragment, PlaceholderToken, parse_placeholders};
pub use reconcile::{LocalNode, LocalizedTree, Reconciliation, reconcile};
pub use segmenter::{MessageUnit, segment};
pub use serializer::{serialize, serialize_localized};
