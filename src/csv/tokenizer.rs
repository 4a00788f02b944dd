use crate::utils::is_white;

/// Splits one line of a delimited file into fields.
///
/// - `\` before the separator makes it a literal separator
/// - `"quoted"` fields may contain the separator; `""` inside is a single quote
///   and `\"` is kept as written
/// - whitespace around unquoted fields is trimmed, but never the separator
///   itself, so tab-separated lines work
/// - an unterminated quote runs to the end of the line
/// - a separator at the very end of the line does not start another field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSplitter {
    separator: char,
}

impl FieldSplitter {
    pub fn new(separator: char) -> Self {
        FieldSplitter { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    fn is_space(&self, c: char) -> bool {
        c != self.separator && is_white(c)
    }

    pub fn split(&self, line: &str) -> Vec<String> {
        let chars: Vec<char> = line.chars().collect();
        let mut fields = Vec::new();
        let mut i = 0;

        loop {
            while i < chars.len() && self.is_space(chars[i]) {
                i += 1;
            }

            let field = if chars.get(i) == Some(&'"') {
                self.quoted(&chars, &mut i)
            } else {
                self.unquoted(&chars, &mut i)
            };
            fields.push(field);

            // `i` is at a separator or at the end of the line
            if i >= chars.len() {
                break;
            }
            i += 1;
            if i >= chars.len() {
                break;
            }
        }
        fields
    }

    fn quoted(&self, chars: &[char], i: &mut usize) -> String {
        let mut field = String::new();
        *i += 1;
        while *i < chars.len() {
            let c = chars[*i];
            match (c, chars.get(*i + 1)) {
                ('"', Some('"')) => {
                    field.push('"');
                    *i += 2;
                }
                ('"', _) => {
                    *i += 1;
                    break;
                }
                ('\\', Some('"')) => {
                    field.push_str("\\\"");
                    *i += 2;
                }
                _ => {
                    field.push(c);
                    *i += 1;
                }
            }
        }

        // stray text between the closing quote and the separator
        let mut rest = String::new();
        while *i < chars.len() && chars[*i] != self.separator {
            rest.push(chars[*i]);
            *i += 1;
        }
        field.push_str(rest.trim_matches(|c| self.is_space(c)));
        field
    }

    fn unquoted(&self, chars: &[char], i: &mut usize) -> String {
        let mut field = String::new();
        // byte length up to the last character that must not be trimmed
        let mut significant = 0;
        while *i < chars.len() {
            let c = chars[*i];
            if c == self.separator {
                break;
            }
            if c == '\\' && chars.get(*i + 1) == Some(&self.separator) {
                field.push(self.separator);
                *i += 2;
                significant = field.len();
                continue;
            }
            field.push(c);
            *i += 1;
            if !self.is_space(c) {
                significant = field.len();
            }
        }
        field.truncate(significant);
        field
    }
}

/// Quote a value for output if it contains the separator, a line break, a
/// double quote, or leading or trailing whitespace. Inner quotes are doubled,
/// except `\"` which the splitter keeps as written.
pub fn quote_field(value: &str, separator: char) -> String {
    let needs_quotes = value.contains(separator)
        || value.contains(['\n', '\r', '"'])
        || value.starts_with(is_white)
        || value.ends_with(is_white);
    if !needs_quotes {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    let mut previous = None;
    for c in value.chars() {
        match (c, previous) {
            ('"', Some('\\')) => quoted.push('"'),
            ('"', _) => quoted.push_str("\"\""),
            _ => quoted.push(c),
        }
        previous = Some(c);
    }
    quoted.push('"');
    quoted
}
