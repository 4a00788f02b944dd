use super::ast::{ContainerTag, MarkupTree, NodeId, NodeKind, ReferenceTarget};
use super::reconcile::{LocalNode, LocalizedTree};

fn container_delimiters(tag: ContainerTag) -> (&'static str, &'static str) {
    match tag {
        ContainerTag::Bold => ("*", "*"),
        ContainerTag::Italic => ("_", "_"),
        ContainerTag::Strike => ("~", "~"),
        ContainerTag::Quote => (">", "\n"),
    }
}

fn write_target(target: &ReferenceTarget, out: &mut String) {
    match target {
        ReferenceTarget::Url(url) => out.push_str(url),
        ReferenceTarget::Channel(id) => {
            out.push('#');
            out.push_str(id);
        }
        ReferenceTarget::User(id) => {
            out.push('@');
            out.push_str(id);
        }
        ReferenceTarget::Command { name, arguments } => {
            out.push('!');
            out.push_str(name);
            for argument in arguments {
                out.push('^');
                out.push_str(argument);
            }
        }
    }
}

fn write_reference(target: &ReferenceTarget, label: &str, out: &mut String) {
    out.push('<');
    write_target(target, out);
    if !label.is_empty() {
        out.push('|');
        out.push_str(label);
    }
    out.push('>');
}

fn write_node(tree: &MarkupTree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        NodeKind::Text(text) => out.push_str(text),
        NodeKind::Container { tag, children } => {
            let (open, close) = container_delimiters(*tag);
            out.push_str(open);
            for &child in children {
                write_node(tree, child, out);
            }
            out.push_str(close);
        }
        NodeKind::Reference { target, label } => {
            let mut text = String::new();
            for &child in label.iter().flatten() {
                write_node(tree, child, &mut text);
            }
            write_reference(target, &text, out);
        }
        NodeKind::Opaque { raw, .. } => out.push_str(raw),
        NodeKind::Group(children) => {
            for &child in children {
                write_node(tree, child, out);
            }
        }
    }
}

fn write_local(source: &MarkupTree, node: &LocalNode, out: &mut String) {
    let (origin, children) = match node {
        LocalNode::Text(text) => {
            out.push_str(text);
            return;
        }
        LocalNode::Component { origin, children } => (*origin, children),
    };

    match source.kind(origin) {
        NodeKind::Container { tag, .. } => {
            let (open, close) = container_delimiters(*tag);
            out.push_str(open);
            for child in children {
                write_local(source, child, out);
            }
            out.push_str(close);
        }
        NodeKind::Reference { target, .. } => {
            let mut label = String::new();
            for child in children {
                write_local(source, child, &mut label);
            }
            write_reference(target, &label, out);
        }
        NodeKind::Opaque { raw, .. } => out.push_str(raw),
        NodeKind::Text(_) | NodeKind::Group(_) => {
            for child in children {
                write_local(source, child, out);
            }
        }
    }
}

/// Write a source tree back out as mrkdwn
pub fn serialize(tree: &MarkupTree) -> String {
    let mut out = String::new();
    write_node(tree, tree.root(), &mut out);
    out
}

/// Write a localized tree out as mrkdwn, taking the markup of each component
/// from the source node it refers to
pub fn serialize_localized(tree: &LocalizedTree<'_>) -> String {
    let mut out = String::new();
    for node in tree.children() {
        write_local(tree.source(), node, &mut out);
    }
    out
}
