use super::ast::{ContainerTag, MarkupTree, NodeId, NodeKind, OpaqueTag, ReferenceTarget};
use super::error::{MarkupError, MarkupResult};

/// Default limit on how deeply markup may nest
pub const MAX_NESTING: usize = 32;

/// A parser for Slack mrkdwn inline markup.
///
/// Recognizes `*bold*`, `_italic_`, `~strike~`, `> quote` lines, `` `code` ``,
/// ```` ```preformatted``` ````, `:emoji:`, and `<...>` references to URLs,
/// channels (`<#C123>`), users (`<@U123>`) and commands (`<!date^123^{date}>`),
/// each optionally with a `|label`. Anything that does not form one of these is
/// plain text; malformed markup never fails the parse.
pub struct Parser<'a> {
    input: &'a str,
    tree: MarkupTree,
    max_depth: usize,
}

type Span = Option<(NodeId, usize)>;

/// Characters that may precede an opening marker
fn opens_after(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => c.is_whitespace() || "~!#$%^&*()-+={}[];:'\",.?/\\|<>_`".contains(c),
    }
}

/// Characters that may follow a closing marker
fn closes_before(next: Option<char>) -> bool {
    match next {
        None => true,
        Some(c) => c.is_whitespace() || "~!#$%^&*)-+={}[];:'\",.?/\\|<>_`".contains(c),
    }
}

fn is_emoji_name_char(c: char) -> bool {
    !c.is_whitespace() && !":<>|`*#@!()$%".contains(c)
}

fn reference_target(target: &str) -> ReferenceTarget {
    if let Some(id) = target.strip_prefix('#') {
        ReferenceTarget::Channel(id.to_string())
    } else if let Some(id) = target.strip_prefix('@') {
        ReferenceTarget::User(id.to_string())
    } else if let Some(command) = target.strip_prefix('!') {
        let mut parts = command.split('^');
        let name = parts.next().unwrap_or_default().to_string();
        ReferenceTarget::Command {
            name,
            arguments: parts.map(str::to_string).collect(),
        }
    } else {
        ReferenceTarget::Url(target.to_string())
    }
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            input,
            tree: MarkupTree::new(),
            max_depth: MAX_NESTING,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the whole input into a tree whose root group holds the top-level nodes
    pub fn parse(mut self) -> MarkupResult<MarkupTree> {
        let input = self.input;
        let children = self.parse_inline(input, 0, 0, true)?;
        self.tree.set_root_children(children);
        Ok(self.tree)
    }

    /// Parse `text`, which starts at byte `base` of the input, into a node list
    fn parse_inline(&mut self, text: &str, base: usize, depth: usize, top_level: bool) -> MarkupResult<Vec<NodeId>> {
        if depth > self.max_depth {
            return Err(MarkupError::NestingTooDeep {
                limit: self.max_depth,
                offset: base,
            });
        }

        let mut nodes = Vec::new();
        let mut text_start = 0;
        let mut pos = 0;
        while let Some(c) = text[pos..].chars().next() {
            let prev = text[..pos].chars().next_back();
            let span = match c {
                '*' | '_' | '~' if opens_after(prev) => self.parse_emphasis(text, pos, c, base, depth)?,
                '`' if opens_after(prev) => self.parse_code(text, pos),
                '<' => self.parse_reference(text, pos, base, depth)?,
                ':' if opens_after(prev) => self.parse_emoji(text, pos),
                '>' if top_level && matches!(prev, None | Some('\n')) => self.parse_quote(text, pos, base, depth)?,
                _ => None,
            };

            match span {
                Some((node, end)) => {
                    if text_start < pos {
                        let run = text[text_start..pos].to_string();
                        nodes.push(self.tree.alloc(NodeKind::Text(run)));
                    }
                    nodes.push(node);
                    pos = end;
                    text_start = end;
                }
                None => pos += c.len_utf8(),
            }
        }

        if text_start < text.len() {
            let run = text[text_start..].to_string();
            nodes.push(self.tree.alloc(NodeKind::Text(run)));
        }
        Ok(nodes)
    }

    /// `*bold*`, `_italic_` or `~strike~` starting at `pos`
    fn parse_emphasis(&mut self, text: &str, pos: usize, marker: char, base: usize, depth: usize) -> MarkupResult<Span> {
        let content_start = pos + marker.len_utf8();
        let rest = &text[content_start..];
        let Some(first) = rest.chars().next() else {
            return Ok(None);
        };
        if first.is_whitespace() || first == marker {
            return Ok(None);
        }

        // content may not span lines or contain another copy of the marker
        let Some(close) = rest.find(|c| c == marker || c == '\n') else {
            return Ok(None);
        };
        if !rest[close..].starts_with(marker) {
            return Ok(None);
        }
        let content = &rest[..close];
        if content.chars().next_back().is_none_or(char::is_whitespace) {
            return Ok(None);
        }
        let end = content_start + close + marker.len_utf8();
        if !closes_before(text[end..].chars().next()) {
            return Ok(None);
        }

        let children = self.parse_inline(content, base + content_start, depth + 1, false)?;
        let tag = match marker {
            '*' => ContainerTag::Bold,
            '_' => ContainerTag::Italic,
            _ => ContainerTag::Strike,
        };
        let node = self.tree.alloc(NodeKind::Container { tag, children });
        Ok(Some((node, end)))
    }

    /// `` `code` `` or ```` ```preformatted``` ```` starting at `pos`
    fn parse_code(&mut self, text: &str, pos: usize) -> Span {
        let rest = &text[pos..];
        if let Some(inner) = rest.strip_prefix("```") {
            if let Some(close) = inner.find("```") {
                if inner[..close].chars().any(|c| !c.is_whitespace()) {
                    let end = pos + 3 + close + 3;
                    return Some((self.opaque(OpaqueTag::PreText, &text[pos..end]), end));
                }
            }
        }

        let inner = &rest[1..];
        let close = inner.find('`')?;
        if close == 0 {
            return None;
        }
        let end = pos + 1 + close + 1;
        Some((self.opaque(OpaqueTag::Code, &text[pos..end]), end))
    }

    /// `<target>` or `<target|label>` starting at `pos`
    fn parse_reference(&mut self, text: &str, pos: usize, base: usize, depth: usize) -> MarkupResult<Span> {
        let body_start = pos + 1;
        let rest = &text[body_start..];
        let Some(first) = rest.chars().next() else {
            return Ok(None);
        };
        if first.is_whitespace() || first == '<' || first == '>' {
            return Ok(None);
        }
        let Some(target_end) = rest.find(['|', '>', '<', '\n']) else {
            return Ok(None);
        };
        let target = &rest[..target_end];

        let (label, end) = match rest[target_end..].chars().next() {
            Some('>') => (None, body_start + target_end + 1),
            Some('|') => {
                let label_start = target_end + 1;
                let label_rest = &rest[label_start..];
                let Some(close) = label_rest.find(['<', '>']) else {
                    return Ok(None);
                };
                if close == 0 || !label_rest[close..].starts_with('>') {
                    return Ok(None);
                }
                let children = self.parse_inline(
                    &label_rest[..close],
                    base + body_start + label_start,
                    depth + 1,
                    false,
                )?;
                (Some(children), body_start + label_start + close + 1)
            }
            _ => return Ok(None),
        };

        let node = self.tree.alloc(NodeKind::Reference {
            target: reference_target(target),
            label,
        });
        Ok(Some((node, end)))
    }

    /// `:name:` or `:name::skin-tone-N:` starting at `pos`
    fn parse_emoji(&mut self, text: &str, pos: usize) -> Span {
        let rest = &text[pos + 1..];
        let name_len = rest.find(|c| !is_emoji_name_char(c)).unwrap_or(rest.len());
        if name_len == 0 || !rest[name_len..].starts_with(':') {
            return None;
        }
        let mut end = pos + 1 + name_len + 1;

        const SKIN_TONE: &str = ":skin-tone-";
        if let Some(tone) = text[end..].strip_prefix(SKIN_TONE) {
            if let Some(close) = tone.find(':') {
                if close > 0 && tone[..close].chars().all(|c| c.is_ascii_alphanumeric()) {
                    end += SKIN_TONE.len() + close + 1;
                }
            }
        }
        Some((self.opaque(OpaqueTag::Emoji, &text[pos..end]), end))
    }

    /// `>` at the start of a line; the quote owns the rest of the line and its line break
    fn parse_quote(&mut self, text: &str, pos: usize, base: usize, depth: usize) -> MarkupResult<Span> {
        let content_start = pos + 1;
        let line_end = text[content_start..].find('\n').map(|i| content_start + i);
        let content = &text[content_start..line_end.unwrap_or(text.len())];
        if content.trim().is_empty() {
            return Ok(None);
        }

        let children = self.parse_inline(content, base + content_start, depth + 1, false)?;
        let node = self.tree.alloc(NodeKind::Container {
            tag: ContainerTag::Quote,
            children,
        });
        let end = line_end.map_or(text.len(), |i| i + 1);
        Ok(Some((node, end)))
    }

    fn opaque(&mut self, tag: OpaqueTag, raw: &str) -> NodeId {
        self.tree.alloc(NodeKind::Opaque {
            tag,
            raw: raw.to_string(),
        })
    }
}
