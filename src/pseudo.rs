//! Pseudo-localization
//!
//! A pseudo bundle turns source text into visibly "foreign" text so that
//! untranslated or hard-coded strings stand out when testing a localized build.
//! Markup tags (including `<cN>` placeholders) pass through untouched so the
//! result can still be reconciled with its source tree.

/// Contract for pseudo-localizing a string
pub trait PseudoBundle {
    /// Pseudo-localize `source`
    fn get_string(&self, source: &str) -> String;

    /// The locale whose text this bundle expects as input. When it differs from
    /// the project's source locale, callers feed it that locale's translation.
    fn pseudo_source_locale(&self) -> &str;
}

/// Replaces ASCII letters with accented look-alikes.
#[derive(Debug, Clone)]
pub struct AccentPseudo {
    source_locale: String,
}

impl AccentPseudo {
    pub fn new(source_locale: impl Into<String>) -> Self {
        AccentPseudo {
            source_locale: source_locale.into(),
        }
    }
}

fn accent(c: char) -> char {
    match c {
        'a' => 'à',
        'c' => 'ç',
        'd' => 'ď',
        'e' => 'ë',
        'g' => 'ğ',
        'h' => 'ĥ',
        'i' => 'í',
        'j' => 'ĵ',
        'k' => 'ķ',
        'l' => 'ľ',
        'n' => 'ñ',
        'o' => 'õ',
        'r' => 'ř',
        's' => 'š',
        't' => 'ţ',
        'u' => 'ü',
        'w' => 'ŵ',
        'y' => 'ÿ',
        'z' => 'ž',
        'A' => 'À',
        'C' => 'Ç',
        'D' => 'Ď',
        'E' => 'Ë',
        'G' => 'Ĝ',
        'H' => 'Ĥ',
        'I' => 'Í',
        'J' => 'Ĵ',
        'K' => 'Ķ',
        'L' => 'Ľ',
        'N' => 'Ñ',
        'O' => 'Õ',
        'R' => 'Ř',
        'S' => 'Š',
        'T' => 'Ţ',
        'U' => 'Ü',
        'W' => 'Ŵ',
        'Y' => 'Ÿ',
        'Z' => 'Ž',
        other => other,
    }
}

impl PseudoBundle for AccentPseudo {
    fn get_string(&self, source: &str) -> String {
        let mut result = String::with_capacity(source.len() * 2);
        let mut in_tag = false;
        for c in source.chars() {
            match c {
                '<' => {
                    in_tag = true;
                    result.push(c);
                }
                '>' if in_tag => {
                    in_tag = false;
                    result.push(c);
                }
                _ if in_tag => result.push(c),
                _ => result.push(accent(c)),
            }
        }
        result
    }

    fn pseudo_source_locale(&self) -> &str {
        &self.source_locale
    }
}
