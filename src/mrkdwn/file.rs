//! Slack mrkdwn message modules
//!
//! A message module is a JavaScript file that exports an object literal of
//! message keys to mrkdwn strings, one entry per line:
//!
//! ```ignore
//! export default messages = {
//!     // greeting shown after login
//!     "welcome": "Welcome back, *friend*!",
//!     'help': 'Ask in <#C024BE7LR|help>'
//! };
//! ```
//!
//! A `//` comment line becomes the translator comment of the next entry.
//! Localized modules are written as `export default messages = {...};` (or
//! `module.exports.messages = {...};`) with the object pretty-printed as JSON.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use super::ast::MarkupTree;
use super::parser::Parser;
use super::reconcile::reconcile;
use super::segmenter::{MessageUnit, segment};
use super::serializer::serialize;
use crate::error::{LoctoolError, Result};
use crate::localizer::LookupRequest;
use crate::path_template::{MappingResolver, PathResolver, has_variant};
use crate::project::Project;
use crate::resource::{DATATYPE_MRKDWN, ResourceString};
use crate::settings::DEFAULT_MRKDWN_TEMPLATE;
use crate::translation_set::{TranslationSet, TranslationStore};
use crate::utils::{unescape_js, write_file};

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")\s*:\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")\s*,?\s*$"#,
    )
    .expect("valid entry pattern")
});
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*//\s*(.*?)\s*$").expect("valid comment pattern"));

/// A parsed message and its translatable unit, if it has one
#[derive(Debug, Clone)]
pub struct SegmentedMessage {
    pub tree: MarkupTree,
    pub unit: Option<MessageUnit>,
}

/// One `key: value` line of a message module
#[derive(Debug, Clone)]
pub struct MessageEntry {
    pub key: String,
    /// The value with string escapes resolved
    pub value: String,
    pub comment: Option<String>,
    /// `None` when the value could not be parsed as markup
    pub message: Option<SegmentedMessage>,
}

struct OrderedMessages<'a, V>(&'a [(String, V)]);

impl<V: Serialize> Serialize for OrderedMessages<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, value)| (key, value)))
    }
}

impl MessageEntry {
    /// Parse `value` as mrkdwn and segment it. A value that cannot be parsed is
    /// kept, with a warning, and is written back unchanged.
    pub fn new(key: String, value: String, comment: Option<String>, path_name: &str) -> Self {
        let message = match Parser::new(&value).parse() {
            Ok(tree) => {
                let unit = segment(&tree);
                Some(SegmentedMessage { tree, unit })
            }
            Err(source) => {
                warn!(
                    "{}: {}",
                    path_name,
                    LoctoolError::Markup {
                        key: key.clone(),
                        source
                    }
                );
                None
            }
        };
        MessageEntry {
            key,
            value,
            comment,
            message,
        }
    }

    /// The translatable unit of this message, if it has one
    pub fn unit(&self) -> Option<&MessageUnit> {
        self.message.as_ref().and_then(|message| message.unit.as_ref())
    }

    /// The resource to extract for this message
    pub fn resource(&self, project: &Project, path_name: &str, index: usize) -> Option<ResourceString> {
        let unit = self.unit()?;
        let resource = ResourceString::new(
            project.id(),
            &self.key,
            &unit.source,
            project.source_locale(),
            DATATYPE_MRKDWN,
        )
        .with_path(path_name)
        .with_comment(self.comment.clone())
        .with_index(index)
        .with_state("new");
        Some(resource)
    }

    /// Look up the translation of this message and rebuild it as mrkdwn.
    ///
    /// Returns the text and whether a real translation was found. With
    /// `fully_translated` set, an untranslated message is returned as its source.
    pub(crate) fn localize(
        &self,
        project: &Project,
        path_name: &str,
        translations: &dyn TranslationStore,
        locale: &str,
        new_resources: &mut dyn TranslationStore,
    ) -> (String, bool) {
        let Some(message) = &self.message else {
            return (self.value.clone(), true);
        };
        let Some(unit) = &message.unit else {
            return (serialize(&message.tree), true);
        };

        let lookup = project.localizer().lookup(
            &LookupRequest {
                key: &self.key,
                source: &unit.source,
                locale,
                datatype: DATATYPE_MRKDWN,
                path_name: Some(path_name),
                comment: self.comment.as_deref(),
            },
            translations,
            new_resources,
        );
        if !lookup.translated && project.settings().mrkdwn.fully_translated {
            return (self.value.clone(), false);
        }

        let mut result = reconcile(&lookup.text, &message.tree, &unit.mapping);
        if !result.warnings.is_empty() {
            warn!(
                "{} warnings reconciling '{}' for {} in {}",
                result.warnings.len(),
                self.key,
                locale,
                path_name
            );
        }
        result.tree.prepend_text(&unit.prefix);
        (result.tree.to_string(), lookup.translated)
    }
}

/// Pretty-print `messages` as a JSON object with four-space indentation,
/// keeping their order. A repeated key keeps its first position and takes the
/// last value.
pub(crate) fn messages_to_json<V: Serialize>(messages: Vec<(String, V)>) -> Result<String> {
    let mut ordered: Vec<(String, V)> = Vec::with_capacity(messages.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (key, value) in messages {
        match positions.get(&key) {
            Some(&slot) => ordered[slot].1 = value,
            None => {
                positions.insert(key.clone(), ordered.len());
                ordered.push((key, value));
            }
        }
    }

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    OrderedMessages(&ordered).serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub struct MrkdwnFile<'p> {
    project: &'p Project,
    resolver: &'p dyn PathResolver,
    path_name: String,
    entries: Vec<MessageEntry>,
    set: TranslationSet,
    translation_status: HashMap<String, bool>,
}

impl<'p> MrkdwnFile<'p> {
    pub fn new(project: &'p Project, resolver: &'p dyn PathResolver, path_name: impl Into<String>) -> Self {
        MrkdwnFile {
            project,
            resolver,
            path_name: path_name.into(),
            entries: Vec::new(),
            set: TranslationSet::new(),
            translation_status: HashMap::new(),
        }
    }

    pub fn path_name(&self) -> &str {
        &self.path_name
    }

    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    /// Resources extracted from this file
    pub fn get_translation_set(&self) -> &TranslationSet {
        &self.set
    }

    /// Parse the text of a message module, extracting one resource per message
    /// that holds translatable text
    pub fn parse(&mut self, data: &str) {
        let mut comment: Option<String> = None;
        for line in data.lines() {
            if let Some(caps) = COMMENT.captures(line) {
                comment = Some(caps[1].to_string());
                continue;
            }
            let Some(caps) = ENTRY.captures(line) else {
                continue;
            };
            let key = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            let value = caps.get(3).or_else(|| caps.get(4)).map_or("", |m| m.as_str());
            self.add_entry(unescape_js(key), unescape_js(value), comment.take());
        }
        debug!(
            "Parsed {} messages ({} translatable) from {}",
            self.entries.len(),
            self.set.size(),
            self.path_name
        );
    }

    fn add_entry(&mut self, key: String, value: String, comment: Option<String>) {
        let entry = MessageEntry::new(key, value, comment, &self.path_name);
        if let Some(resource) = entry.resource(self.project, &self.path_name, self.set.size()) {
            self.set.add(resource);
        }
        self.entries.push(entry);
    }

    /// Read and parse the file from the project root. A missing file is not an
    /// error; it simply yields no resources.
    pub fn extract(&mut self) {
        let path = self.project.source_path(&self.path_name);
        match fs::read_to_string(&path) {
            Ok(data) => self.parse(&data),
            Err(err) => warn!("Could not read file {}: {}", path.display(), err),
        }
    }

    /// Whether every message of the last localization into `locale` was translated
    pub fn is_fully_translated(&self, locale: &str) -> bool {
        self.translation_status.get(locale).copied().unwrap_or(true)
    }

    /// Produce the localized module text for `locale`
    pub fn localize_text(
        &mut self,
        translations: &dyn TranslationStore,
        locale: &str,
        new_resources: &mut dyn TranslationStore,
    ) -> Result<String> {
        let mut fully_translated = true;
        let mut messages = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let (text, translated) = entry.localize(self.project, &self.path_name, translations, locale, new_resources);
            fully_translated &= translated;
            messages.push((entry.key.clone(), text));
        }
        self.translation_status.insert(locale.to_string(), fully_translated);

        let style = self.project.settings().mrkdwn.output_style;
        Ok(format!("{}{};\n", style.prefix(), messages_to_json(messages)?))
    }

    /// Project-relative path of the localized module for `locale`
    pub fn get_localized_path(&self, locale: &str) -> String {
        self.resolver.localized_path(&self.path_name, locale)
    }

    /// Write a localized module for every target locale. The source locale and
    /// locales with a variant subtag are skipped.
    ///
    /// # Returns
    /// The paths of the files written
    pub fn localize(
        &mut self,
        translations: &dyn TranslationStore,
        locales: &[String],
        new_resources: &mut dyn TranslationStore,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for locale in locales {
            if locale == self.project.source_locale() || has_variant(locale) {
                debug!("Skipping locale {} for {}", locale, self.path_name);
                continue;
            }

            let text = self.localize_text(translations, locale, new_resources)?;
            let path = self.project.target_path(&self.get_localized_path(locale));
            write_file(&path, &text)?;
            debug!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Recognizes message modules and creates [`MrkdwnFile`]s for them
pub struct MrkdwnFileType<'p> {
    project: &'p Project,
    resolver: MappingResolver,
}

impl<'p> MrkdwnFileType<'p> {
    pub fn new(project: &'p Project) -> Result<Self> {
        let resolver = MappingResolver::new(&project.settings().mrkdwn.mappings, DEFAULT_MRKDWN_TEMPLATE)?;
        Ok(MrkdwnFileType { project, resolver })
    }

    pub fn datatype(&self) -> &'static str {
        DATATYPE_MRKDWN
    }

    /// A `.js` file that matches one of the configured mappings
    pub fn handles(&self, path_name: &str) -> bool {
        path_name.ends_with(".js") && (self.resolver.is_empty() || self.resolver.mapping_for(path_name).is_some())
    }

    pub fn new_file(&self, path_name: impl Into<String>) -> MrkdwnFile<'_> {
        MrkdwnFile::new(self.project, &self.resolver, path_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{OutputStyle, ProjectSettings};
    use pretty_assertions::assert_eq;

    fn project() -> Project {
        Project::new(ProjectSettings {
            id: "webapp".to_string(),
            locales: vec!["fr-FR".to_string()],
            ..ProjectSettings::default()
        })
        .unwrap()
    }

    fn resolver(project: &Project) -> MappingResolver {
        MappingResolver::new(&project.settings().mrkdwn.mappings, DEFAULT_MRKDWN_TEMPLATE).unwrap()
    }

    const MODULE: &str = r#"export default messages = {
    // shown on the front page
    "intro": "This is a *test* of parsing.",
    'plain': 'The expression `E = mc^2` was Einstein\'s',
    "emoji_only": ":tada:",
    "links": "See <http://example.com|the docs>\nor ask <@U123>"
};
"#;

    #[test]
    fn test_parse_entries() {
        let project = project();
        let resolver = resolver(&project);
        let mut file = MrkdwnFile::new(&project, &resolver, "src/messages.js");
        file.parse(MODULE);

        let entries = file.entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].comment.as_deref(), Some("shown on the front page"));
        assert_eq!(entries[1].comment, None);
        assert_eq!(entries[1].value, "The expression `E = mc^2` was Einstein's");
        assert_eq!(entries[3].value, "See <http://example.com|the docs>\nor ask <@U123>");

        let set = file.get_translation_set();
        assert_eq!(set.size(), 3);
        let intro = set.get("rs_webapp_en-US_intro_mrkdwn").unwrap();
        assert_eq!(intro.source, "This is a <c0>test</c0> of parsing.");
        assert_eq!(intro.comment.as_deref(), Some("shown on the front page"));
        assert_eq!(intro.path_name.as_deref(), Some("src/messages.js"));
        assert_eq!(intro.datatype, "mrkdwn");
        assert_eq!(intro.index, 0);

        let plain = set.get("rs_webapp_en-US_plain_mrkdwn").unwrap();
        assert_eq!(plain.source, "The expression <c0/> was Einstein's");
        assert_eq!(plain.index, 1);
        assert!(set.get("rs_webapp_en-US_emoji_only_mrkdwn").is_none());
    }

    #[test]
    fn test_ignores_other_lines() {
        let project = project();
        let resolver = resolver(&project);
        let mut file = MrkdwnFile::new(&project, &resolver, "a.js");
        file.parse("const x = 1;\nfunction f() {}\n  \"k\" : \"Value\" ,\n");
        assert_eq!(file.entries().len(), 1);
        assert_eq!(file.entries()[0].key, "k");
    }

    fn translations() -> TranslationSet {
        let mut set = TranslationSet::new();
        set.add(
            ResourceString::new("webapp", "intro", "This is a <c0>test</c0> of parsing.", "en-US", DATATYPE_MRKDWN)
                .with_target("Ceci est un <c0>essai</c0> de l'analyse.", "fr-FR"),
        );
        set
    }

    #[test]
    fn test_localize_text() {
        let project = project();
        let resolver = resolver(&project);
        let mut file = MrkdwnFile::new(&project, &resolver, "src/messages.js");
        file.parse(MODULE);

        let mut new_resources = TranslationSet::new();
        let text = file.localize_text(&translations(), "fr-FR", &mut new_resources).unwrap();
        assert_eq!(
            text,
            r#"export default messages = {
    "intro": "Ceci est un *essai* de l'analyse.",
    "plain": "The expression `E = mc^2` was Einstein's",
    "emoji_only": ":tada:",
    "links": "See <http://example.com|the docs>\nor ask <@U123>"
};
"#
        );
        assert_eq!(new_resources.size(), 2);
        assert!(!file.is_fully_translated("fr-FR"));
    }

    #[test]
    fn test_fully_translated_mode() {
        let mut settings = ProjectSettings {
            id: "webapp".to_string(),
            ..ProjectSettings::default()
        };
        settings.mrkdwn.fully_translated = true;
        settings.mrkdwn.output_style = OutputStyle::CommonJs;
        let project = Project::new(settings).unwrap();
        let resolver = resolver(&project);
        let mut file = MrkdwnFile::new(&project, &resolver, "a.js");
        file.parse(
            "\"intro\": \"This is a *test* of parsing.\",\n\"other\": \"Leading  *spaces*\",\n",
        );

        let mut new_resources = TranslationSet::new();
        let text = file.localize_text(&translations(), "fr-FR", &mut new_resources).unwrap();
        assert_eq!(
            text,
            "module.exports.messages = {\n    \"intro\": \"Ceci est un *essai* de l'analyse.\",\n    \"other\": \"Leading  *spaces*\"\n};\n"
        );
    }

    #[test]
    fn test_empty_module() {
        let project = project();
        let resolver = resolver(&project);
        let mut file = MrkdwnFile::new(&project, &resolver, "a.js");
        file.parse("export default messages = {};\n");
        let mut new_resources = TranslationSet::new();
        let text = file.localize_text(&TranslationSet::new(), "fr-FR", &mut new_resources).unwrap();
        assert_eq!(text, "export default messages = {};\n");
        assert!(file.is_fully_translated("fr-FR"));
    }

    #[test]
    fn test_localized_path() {
        let project = project();
        let resolver = resolver(&project);
        let file = MrkdwnFile::new(&project, &resolver, "src/strings/messages.js");
        assert_eq!(file.get_localized_path("de-DE"), "src/strings/messages_de-DE.js");
    }

    #[test]
    fn test_file_type_handles() {
        let project = project();
        let file_type = MrkdwnFileType::new(&project).unwrap();
        assert!(file_type.handles("src/strings/messages.js"));
        assert!(!file_type.handles("src/strings/messages.ts"));
        assert_eq!(file_type.datatype(), "mrkdwn");
        assert_eq!(file_type.new_file("src/a.js").path_name(), "src/a.js");
    }

    #[test]
    fn test_extract_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::new(ProjectSettings {
            root: dir.path().to_path_buf(),
            ..ProjectSettings::default()
        })
        .unwrap();
        let resolver = resolver(&project);
        let mut file = MrkdwnFile::new(&project, &resolver, "missing.js");
        file.extract();
        assert!(file.get_translation_set().is_empty());
    }

    #[test]
    fn test_localize_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::new(ProjectSettings {
            id: "webapp".to_string(),
            root: dir.path().to_path_buf(),
            target: dir.path().join("out"),
            locales: vec!["en-US".to_string(), "fr-FR".to_string(), "de-DE-1996".to_string()],
            ..ProjectSettings::default()
        })
        .unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/messages.js"), MODULE).unwrap();

        let resolver = resolver(&project);
        let mut file = MrkdwnFile::new(&project, &resolver, "src/messages.js");
        file.extract();
        let mut new_resources = TranslationSet::new();
        let written = file
            .localize(&translations(), project.locales(), &mut new_resources)
            .unwrap();

        assert_eq!(written, vec![dir.path().join("out/src/messages_fr-FR.js")]);
        let text = std::fs::read_to_string(&written[0]).unwrap();
        assert!(text.contains("Ceci est un *essai* de l'analyse."));
    }
}
