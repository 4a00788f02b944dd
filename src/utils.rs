//! Text and file helpers shared by the file adapters.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{LoctoolError, Result};

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[a-zA-Z][a-zA-Z0-9]*;").expect("valid entity pattern"));

/// Whitespace as seen by the extraction rules: Unicode white space plus the
/// zero-width characters that commonly leak into resource files.
pub fn is_white(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}')
}

/// Collapse every run of whitespace to a single space and trim both ends.
///
/// This is the key under which a delimited-table value is stored.
pub fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if is_white(c) {
            pending_space = !result.is_empty();
        } else {
            if pending_space {
                result.push(' ');
                pending_space = false;
            }
            result.push(c);
        }
    }
    result
}

/// Returns true if the string holds something a translator could work on.
///
/// Tags (including `<cN>` placeholders) and named entities are removed first;
/// what remains must contain at least one letter, digit or ideograph.
pub fn contains_actual_text(text: &str) -> bool {
    let without_tags = TAG.replace_all(text, "");
    let stripped = ENTITY.replace_all(&without_tags, "");
    stripped.chars().any(char::is_alphanumeric)
}

/// Undo the backslash escapes allowed inside a quoted JavaScript string literal.
///
/// Only `\n`, `\t`, `\'`, `\"` and `\\` are recognized; any other backslash is
/// kept as written.
pub fn unescape_js(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\'') => result.push('\''),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            _ => {
                result.push('\\');
                continue;
            }
        }
        chars.next();
    }
    result
}

/// Write `text` to `path`, creating missing parent directories
pub(crate) fn write_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| LoctoolError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, text).map_err(|source| LoctoolError::Write {
        path: path.to_path_buf(),
        source,
    })
}
