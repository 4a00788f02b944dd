//! Tokenizer for placeholder tags in translated strings
//!
//! The wire format is `<cN>...</cN>` for paired placeholders and `<cN/>` for
//! self-closing ones. Tags that cannot be matched up (an opening tag without a
//! closing one, a stray closing tag) are left in the text as written.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)c(\d+)(/?)>").expect("valid placeholder tag pattern"));

/// A placeholder found at the top level of a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderToken<'a> {
    pub index: usize,
    pub self_closing: bool,
    /// Text between the opening and closing tag, still containing any nested tags
    pub inner: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment<'a> {
    Text(&'a str),
    Placeholder(PlaceholderToken<'a>),
}

#[derive(Debug, Clone, Copy)]
enum TagKind {
    Open,
    Close,
    SelfClosing,
}

struct Tag {
    kind: TagKind,
    index: usize,
    start: usize,
    end: usize,
}

fn next_tag(text: &str, from: usize) -> Option<Tag> {
    let mut pos = from;
    while let Some(caps) = TAG.captures_at(text, pos) {
        let whole = caps.get(0)?;
        let closing = !caps[1].is_empty();
        let self_closing = !caps[3].is_empty();
        // `</c1/>` and indices that overflow are not tags
        match (caps[2].parse::<usize>(), closing, self_closing) {
            (Ok(index), false, false) => {
                return Some(Tag { kind: TagKind::Open, index, start: whole.start(), end: whole.end() });
            }
            (Ok(index), true, false) => {
                return Some(Tag { kind: TagKind::Close, index, start: whole.start(), end: whole.end() });
            }
            (Ok(index), false, true) => {
                return Some(Tag { kind: TagKind::SelfClosing, index, start: whole.start(), end: whole.end() });
            }
            _ => pos = whole.end(),
        }
    }
    None
}

fn scan_tags(text: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut pos = 0;
    while let Some(tag) = next_tag(text, pos) {
        pos = tag.end;
        tags.push(tag);
    }
    tags
}

/// For every opening tag, the position of its closing tag in `tags`. A closing
/// tag pairs with the innermost open tag of the same index.
fn pair_tags(tags: &[Tag]) -> Vec<Option<usize>> {
    let mut partner = vec![None; tags.len()];
    let mut open: HashMap<usize, Vec<usize>> = HashMap::new();
    for (position, tag) in tags.iter().enumerate() {
        match tag.kind {
            TagKind::Open => open.entry(tag.index).or_default().push(position),
            TagKind::Close => {
                if let Some(opener) = open.get_mut(&tag.index).and_then(Vec::pop) {
                    partner[opener] = Some(position);
                }
            }
            TagKind::SelfClosing => {}
        }
    }
    partner
}

/// Split `text` into plain text runs and top-level placeholders.
///
/// Nested placeholders stay inside [`PlaceholderToken::inner`]; callers recurse
/// into it.
pub fn parse_placeholders(text: &str) -> Vec<Fragment<'_>> {
    let tags = scan_tags(text);
    let partner = pair_tags(&tags);
    let mut fragments = Vec::new();
    let mut text_start = 0;
    let mut position = 0;

    while let Some(tag) = tags.get(position) {
        let (inner, end, next) = match (tag.kind, partner[position]) {
            (TagKind::SelfClosing, _) => ("", tag.end, position + 1),
            (TagKind::Open, Some(close)) => (&text[tag.end..tags[close].start], tags[close].end, close + 1),
            (TagKind::Open, None) | (TagKind::Close, _) => {
                position += 1;
                continue;
            }
        };

        if text_start < tag.start {
            fragments.push(Fragment::Text(&text[text_start..tag.start]));
        }
        fragments.push(Fragment::Placeholder(PlaceholderToken {
            index: tag.index,
            self_closing: matches!(tag.kind, TagKind::SelfClosing),
            inner,
        }));
        text_start = end;
        position = next;
    }

    if text_start < text.len() {
        fragments.push(Fragment::Text(&text[text_start..]));
    }
    fragments
}
