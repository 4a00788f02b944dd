//! Localized output paths
//!
//! A template such as `[dir]/[basename]_[locale].js` is expanded for a source
//! path and a target locale:
//!
//! ```ignore
//! format_path("[dir]/[basename]_[locale].js", "src/strings/messages.js", "de-DE")
//!     == "src/strings/messages_de-DE.js"
//! ```
//!
//! Supported keywords: `[dir]`, `[filename]`, `[basename]`, `[extension]`,
//! `[locale]`, `[language]`, `[script]`, `[region]`, `[localeDir]` (`de/DE`),
//! `[localeUnder]` (`de_DE`) and `[localeLower]` (`de-de`). Unknown keywords are
//! copied through unchanged.

use std::sync::LazyLock;

use glob::{MatchOptions, Pattern};
use icu_locale::Locale;
use regex::{Captures, Regex};
use relative_path::RelativePath;

use crate::error::{LoctoolError, Result};
use crate::settings::PathMapping;

static KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\w+)\]").expect("valid keyword pattern"));

/// Computes where the localized copy of a source file goes
pub trait PathResolver {
    fn localized_path(&self, source_path: &str, locale: &str) -> String;
}

/// Language, script and region of a locale identifier.
///
/// Falls back to treating the whole identifier as the language when ICU cannot
/// parse it.
fn locale_parts(locale: &str) -> (String, String, String) {
    match locale.parse::<Locale>() {
        Ok(parsed) => (
            parsed.id.language.to_string(),
            parsed.id.script.map(|s| s.to_string()).unwrap_or_default(),
            parsed.id.region.map(|r| r.to_string()).unwrap_or_default(),
        ),
        Err(_) => (locale.to_string(), String::new(), String::new()),
    }
}

/// Returns true if the locale carries a variant subtag (e.g. `de-DE-1996`).
///
/// Such locales are not written as separate files.
pub fn has_variant(locale: &str) -> bool {
    locale
        .parse::<Locale>()
        .map(|parsed| !parsed.id.variants.is_empty())
        .unwrap_or(false)
}

/// Validate a locale identifier
pub fn validate_locale(locale: &str) -> Result<()> {
    locale
        .parse::<Locale>()
        .map(|_| ())
        .map_err(|_| LoctoolError::Locale {
            locale: locale.to_string(),
        })
}

fn split_source_path(source_path: &str) -> (&str, &str, &str, &str) {
    let (dir, filename) = match source_path.rfind('/') {
        Some(pos) => (&source_path[..pos], &source_path[pos + 1..]),
        None => (".", source_path),
    };
    let (basename, extension) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos + 1..]),
        _ => (filename, ""),
    };
    (dir, filename, basename, extension)
}

/// Expand a path template for the given source path and locale
pub fn format_path(template: &str, source_path: &str, locale: &str) -> String {
    let (dir, filename, basename, extension) = split_source_path(source_path);
    let (language, script, region) = locale_parts(locale);

    let expanded = KEYWORD.replace_all(template, |caps: &Captures| match &caps[1] {
        "dir" => dir.to_string(),
        "filename" => filename.to_string(),
        "basename" => basename.to_string(),
        "extension" => extension.to_string(),
        "locale" => locale.to_string(),
        "language" => language.clone(),
        "script" => script.clone(),
        "region" => region.clone(),
        "localeDir" => locale.replace('-', "/"),
        "localeUnder" => locale.replace('-', "_"),
        "localeLower" => locale.to_lowercase(),
        _ => caps[0].to_string(),
    });

    normalize_path(&expanded)
}

/// Remove empty and `.` segments and resolve `..` where possible
fn normalize_path(path: &str) -> String {
    let normalized = RelativePath::new(path).normalize();
    match (path.starts_with('/'), normalized.as_str()) {
        (true, rest) => format!("/{}", rest.trim_start_matches("../")),
        (false, "") => String::from("."),
        (false, rest) => rest.to_string(),
    }
}

/// Resolves paths through the first mapping whose glob pattern matches the
/// source path, falling back to a default template.
#[derive(Debug, Clone)]
pub struct MappingResolver {
    mappings: Vec<(Pattern, PathMapping)>,
    default_template: String,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl MappingResolver {
    pub fn new(mappings: &[PathMapping], default_template: impl Into<String>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            let pattern = Pattern::new(&mapping.pattern).map_err(|source| LoctoolError::Pattern {
                pattern: mapping.pattern.clone(),
                source,
            })?;
            compiled.push((pattern, mapping.clone()));
        }
        Ok(MappingResolver {
            mappings: compiled,
            default_template: default_template.into(),
        })
    }

    /// The mapping that applies to `source_path`, if any
    pub fn mapping_for(&self, source_path: &str) -> Option<&PathMapping> {
        self.mappings
            .iter()
            .find(|(pattern, _)| pattern.matches_with(source_path, MATCH_OPTIONS))
            .map(|(_, mapping)| mapping)
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl PathResolver for MappingResolver {
    fn localized_path(&self, source_path: &str, locale: &str) -> String {
        match self.mapping_for(source_path) {
            Some(mapping) => {
                let output_locale = mapping
                    .locale_map
                    .get(locale)
                    .map(String::as_str)
                    .unwrap_or(locale);
                format_path(&mapping.template, source_path, output_locale)
            }
            None => format_path(&self.default_template, source_path, locale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_default_template() {
        assert_eq!(
            format_path("[dir]/[basename]_[locale].js", "src/strings/messages.js", "de-DE"),
            "src/strings/messages_de-DE.js"
        );
    }

    #[test]
    fn test_format_without_directory() {
        assert_eq!(
            format_path("[dir]/[basename]_[locale].js", "messages.js", "fr-FR"),
            "messages_fr-FR.js"
        );
    }

    #[test]
    fn test_format_locale_keywords() {
        let path = "res/strings.csv";
        assert_eq!(format_path("[dir]/[localeDir]/[filename]", path, "zh-Hans-CN"), "res/zh/Hans/CN/strings.csv");
        assert_eq!(format_path("[localeUnder].[extension]", path, "de-DE"), "de_DE.csv");
        assert_eq!(format_path("[localeLower]/[filename]", path, "de-DE"), "de-de/strings.csv");
        assert_eq!(format_path("[language]/[region]/[basename]", path, "de-DE"), "de/DE/strings");
        assert_eq!(format_path("[script]/[filename]", path, "zh-Hans-CN"), "Hans/strings.csv");
    }

    #[test]
    fn test_unknown_keyword_is_kept() {
        assert_eq!(format_path("[weird]/[filename]", "a/b.js", "de"), "[weird]/b.js");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./a//b/./c"), "a/b/c");
        assert_eq!(normalize_path("a/../b"), "b");
        assert_eq!(normalize_path("../a"), "../a");
        assert_eq!(normalize_path("/x/./y"), "/x/y");
    }

    #[test]
    fn test_has_variant() {
        assert!(has_variant("de-DE-1996"));
        assert!(!has_variant("de-DE"));
        assert!(!has_variant("zh-Hans-CN"));
    }

    #[test]
    fn test_validate_locale() {
        assert!(validate_locale("de-DE").is_ok());
        assert!(validate_locale("not a locale").is_err());
    }

    #[test]
    fn test_mapping_resolver() {
        let mut special = PathMapping::new("src/i18n/*.js", "[dir]/[localeDir]/[filename]");
        special.locale_map.insert("de-DE".to_string(), "de".to_string());
        let resolver = MappingResolver::new(
            &[special, PathMapping::new("**/*.js", "[dir]/[basename]_[locale].js")],
            "[dir]/[locale]/[filename]",
        )
        .unwrap();

        assert_eq!(resolver.localized_path("src/i18n/strings.js", "de-DE"), "src/i18n/de/strings.js");
        assert_eq!(resolver.localized_path("lib/app/strings.js", "de-DE"), "lib/app/strings_de-DE.js");
        assert_eq!(resolver.localized_path("lib/app/strings.txt", "de-DE"), "lib/app/de-DE/strings.txt");
    }

    #[test]
    fn test_mapping_patterns() {
        let resolver = MappingResolver::new(
            &[
                PathMapping::new("src/*.js", "[dir]/[locale]/[filename]"),
                PathMapping::new("**/*.csv", "[dir]/[basename]_[locale].csv"),
                PathMapping::new("[!x]*.tsv", "[locale]/[filename]"),
            ],
            "[dir]/[filename]",
        )
        .unwrap();
        assert!(resolver.mapping_for("src/a.js").is_some());
        assert!(resolver.mapping_for("src/nested/a.js").is_none());
        assert!(resolver.mapping_for("strings.csv").is_some());
        assert!(resolver.mapping_for("res/data/strings.csv").is_some());
        assert!(resolver.mapping_for("strings.csv.bak").is_none());
        assert!(resolver.mapping_for("a.tsv").is_some());
        assert!(resolver.mapping_for("x.tsv").is_none());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = MappingResolver::new(&[PathMapping::new("a/***/b", "x")], "y").unwrap_err();
        assert!(matches!(err, LoctoolError::Pattern { .. }));
    }
}
