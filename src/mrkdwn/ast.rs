//! Markup tree
//!
//! Nodes live in an arena owned by [`MarkupTree`] and refer to each other through
//! [`NodeId`] handles. A tree is built once by the parser and never mutated
//! afterwards; localized output is built as a separate tree that refers back to
//! these nodes (see [`crate::mrkdwn::reconcile::LocalizedTree`]).

/// Handle of a node inside a [`MarkupTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Formatting containers whose children are translatable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerTag {
    Bold,
    Italic,
    Strike,
    Quote,
}

/// Spans whose source is copied verbatim and never translated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueTag {
    Code,
    PreText,
    Emoji,
}

/// What a `<...>` reference points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceTarget {
    Url(String),
    Channel(String),
    User(String),
    Command { name: String, arguments: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Text(String),
    Container {
        tag: ContainerTag,
        children: Vec<NodeId>,
    },
    /// `label` is `None` when the reference was written without `|label`
    Reference {
        target: ReferenceTarget,
        label: Option<Vec<NodeId>>,
    },
    Opaque {
        tag: OpaqueTag,
        raw: String,
    },
    /// Transparent grouping; used for the root
    Group(Vec<NodeId>),
}

impl NodeKind {
    /// Child handles in source order. Opaque and text nodes have none.
    pub fn children(&self) -> &[NodeId] {
        match self {
            NodeKind::Container { children, .. } | NodeKind::Group(children) => children,
            NodeKind::Reference { label: Some(label), .. } => label,
            NodeKind::Reference { label: None, .. } | NodeKind::Text(_) | NodeKind::Opaque { .. } => &[],
        }
    }
}

/// Arena of markup nodes with a designated root group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupTree {
    nodes: Vec<NodeKind>,
    root: NodeId,
}

impl Default for MarkupTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupTree {
    /// An empty tree whose root is an empty group
    pub fn new() -> Self {
        MarkupTree {
            nodes: vec![NodeKind::Group(Vec::new())],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.kind(id).children()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    /// Add a detached node and return its handle
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(kind);
        NodeId(self.nodes.len() - 1)
    }

    /// Replace the root's children
    pub fn set_root_children(&mut self, children: Vec<NodeId>) {
        self.nodes[self.root.0] = NodeKind::Group(children);
    }
}

impl std::fmt::Display for MarkupTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::mrkdwn::serializer::serialize(self))
    }
}
