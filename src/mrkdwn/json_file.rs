//! JSON message files whose values are Slack mrkdwn
//!
//! The file holds a single object of message keys to mrkdwn strings. It is read
//! as JSON5, so comments, trailing commas and single-quoted strings are allowed:
//!
//! ```ignore
//! {
//!     // greeting shown after login
//!     "welcome": "Welcome back, *friend*!",
//!     'help': 'Ask in <#C024BE7LR|help>',
//! }
//! ```
//!
//! Localized files are written as plain JSON with four-space indentation.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::file::{MessageEntry, messages_to_json};
use crate::error::Result;
use crate::path_template::{MappingResolver, PathResolver, has_variant};
use crate::project::Project;
use crate::resource::DATATYPE_MRKDWN;
use crate::settings::DEFAULT_MRKDWN_JSON_TEMPLATE;
use crate::translation_set::{TranslationSet, TranslationStore};
use crate::utils::write_file;

const EXTENSIONS: [&str; 2] = ["json", "jsn"];

/// Top-level object of a message file, in document order
struct OrderedObject(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for OrderedObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ObjectVisitor;

        impl<'de> Visitor<'de> for ObjectVisitor {
            type Value = OrderedObject;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object of message keys to strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<OrderedObject, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(OrderedObject(entries))
            }
        }

        deserializer.deserialize_map(ObjectVisitor)
    }
}

/// One member of the top-level object
#[derive(Debug, Clone)]
pub enum JsonMessage {
    Mrkdwn(MessageEntry),
    /// A value that is not a string, written back unchanged
    Verbatim { key: String, value: Value },
}

impl JsonMessage {
    pub fn key(&self) -> &str {
        match self {
            JsonMessage::Mrkdwn(entry) => &entry.key,
            JsonMessage::Verbatim { key, .. } => key,
        }
    }
}

pub struct MrkdwnJsonFile<'p> {
    project: &'p Project,
    resolver: &'p dyn PathResolver,
    path_name: String,
    messages: Vec<JsonMessage>,
    set: TranslationSet,
    translation_status: HashMap<String, bool>,
}

impl<'p> MrkdwnJsonFile<'p> {
    pub fn new(project: &'p Project, resolver: &'p dyn PathResolver, path_name: impl Into<String>) -> Self {
        MrkdwnJsonFile {
            project,
            resolver,
            path_name: path_name.into(),
            messages: Vec::new(),
            set: TranslationSet::new(),
            translation_status: HashMap::new(),
        }
    }

    pub fn path_name(&self) -> &str {
        &self.path_name
    }

    pub fn messages(&self) -> &[JsonMessage] {
        &self.messages
    }

    pub fn get_translation_set(&self) -> &TranslationSet {
        &self.set
    }

    /// Parse the JSON5 text of a message file. A file that cannot be parsed is
    /// logged and yields no messages.
    pub fn parse(&mut self, data: &str) {
        let object = match json5::from_str::<OrderedObject>(data) {
            Ok(object) => object,
            Err(err) => {
                error!("Failed to parse file {}: {}", self.path_name, err);
                return;
            }
        };

        for (key, value) in object.0 {
            let Value::String(text) = value else {
                warn!(
                    "{}: value of '{}' is not a string and is copied unchanged",
                    self.path_name, key
                );
                self.messages.push(JsonMessage::Verbatim { key, value });
                continue;
            };
            let entry = MessageEntry::new(key, text, None, &self.path_name);
            if let Some(resource) = entry.resource(self.project, &self.path_name, self.set.size()) {
                self.set.add(resource);
            }
            self.messages.push(JsonMessage::Mrkdwn(entry));
        }
        debug!(
            "Parsed {} messages ({} translatable) from {}",
            self.messages.len(),
            self.set.size(),
            self.path_name
        );
    }

    /// Read and parse the file from the project root. A missing file yields no
    /// resources.
    pub fn extract(&mut self) {
        let path = self.project.source_path(&self.path_name);
        match fs::read_to_string(&path) {
            Ok(data) => self.parse(&data),
            Err(err) => warn!("Could not read file {}: {}", path.display(), err),
        }
    }

    pub fn is_fully_translated(&self, locale: &str) -> bool {
        self.translation_status.get(locale).copied().unwrap_or(true)
    }

    /// Produce the localized JSON text for `locale`
    pub fn localize_text(
        &mut self,
        translations: &dyn TranslationStore,
        locale: &str,
        new_resources: &mut dyn TranslationStore,
    ) -> Result<String> {
        let mut fully_translated = true;
        let mut localized = Vec::with_capacity(self.messages.len());
        for message in &self.messages {
            let value = match message {
                JsonMessage::Mrkdwn(entry) => {
                    let (text, translated) =
                        entry.localize(self.project, &self.path_name, translations, locale, new_resources);
                    fully_translated &= translated;
                    Value::String(text)
                }
                JsonMessage::Verbatim { value, .. } => value.clone(),
            };
            localized.push((message.key().to_string(), value));
        }
        self.translation_status.insert(locale.to_string(), fully_translated);

        messages_to_json(localized)
    }

    pub fn get_localized_path(&self, locale: &str) -> String {
        self.resolver.localized_path(&self.path_name, locale)
    }

    /// Write a localized file for every target locale except the source locale
    /// and locales with a variant subtag
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

/// Recognizes JSON message files and creates [`MrkdwnJsonFile`]s for them
pub struct MrkdwnJsonFileType<'p> {
    project: &'p Project,
    resolver: MappingResolver,
}

impl<'p> MrkdwnJsonFileType<'p> {
    pub fn new(project: &'p Project) -> Result<Self> {
        let resolver = MappingResolver::new(&project.settings().mrkdwn.json_mappings, DEFAULT_MRKDWN_JSON_TEMPLATE)?;
        Ok(MrkdwnJsonFileType { project, resolver })
    }

    pub fn datatype(&self) -> &'static str {
        DATATYPE_MRKDWN
    }

    /// A `.json` or `.jsn` file that matches one of the configured mappings
    pub fn handles(&self, path_name: &str) -> bool {
        let extension = path_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        let known = extension.is_some_and(|ext| EXTENSIONS.contains(&ext.as_str()));
        known && (self.resolver.is_empty() || self.resolver.mapping_for(path_name).is_some())
    }

    pub fn new_file(&self, path_name: impl Into<String>) -> MrkdwnJsonFile<'_> {
        MrkdwnJsonFile::new(self.project, &self.resolver, path_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceString;
    use crate::settings::ProjectSettings;
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
        MappingResolver::new(&project.settings().mrkdwn.json_mappings, DEFAULT_MRKDWN_JSON_TEMPLATE).unwrap()
    }

    const MESSAGES: &str = r#"{
    // shown on the front page
    "intro": "This is a *test* of parsing.",
    'plain': 'The expression `E = mc^2` was Einstein\'s',
    "emoji_only": ":tada:",
    "links": "See <http://example.com|the docs>\nor ask <@U123>",
}
"#;

    fn translations() -> TranslationSet {
        let mut set = TranslationSet::new();
        set.add(
            ResourceString::new("webapp", "intro", "This is a <c0>test</c0> of parsing.", "en-US", DATATYPE_MRKDWN)
                .with_target("Ceci est un <c0>essai</c0> de l'analyse.", "fr-FR"),
        );
        set
    }

    #[test]
    fn test_parse_json5() {
        let project = project();
        let resolver = resolver(&project);
        let mut file = MrkdwnJsonFile::new(&project, &resolver, "res/messages.json");
        file.parse(MESSAGES);

        let keys: Vec<&str> = file.messages().iter().map(JsonMessage::key).collect();
        assert_eq!(keys, vec!["intro", "plain", "emoji_only", "links"]);

        let set = file.get_translation_set();
        assert_eq!(set.size(), 3);
        let intro = set.get("rs_webapp_en-US_intro_mrkdwn").unwrap();
        assert_eq!(intro.source, "This is a <c0>test</c0> of parsing.");
        assert_eq!(intro.comment, None);
        assert_eq!(intro.path_name.as_deref(), Some("res/messages.json"));
        assert_eq!(intro.index, 0);

        let plain = set.get("rs_webapp_en-US_plain_mrkdwn").unwrap();
        assert_eq!(plain.source, "The expression <c0/> was Einstein's");
        assert_eq!(plain.index, 1);
        assert!(set.get("rs_webapp_en-US_emoji_only_mrkdwn").is_none());
    }

    #[test]
    fn test_parse_invalid_file() {
        let project = project();
        let resolver = resolver(&project);
        let mut file = MrkdwnJsonFile::new(&project, &resolver, "a.json");
        file.parse("{ \"a\": \"unterminated }");
        assert!(file.messages().is_empty());
        assert!(file.get_translation_set().is_empty());

        file.parse("[\"not\", \"an\", \"object\"]");
        assert!(file.messages().is_empty());
    }

    #[test]
    fn test_localize_text() {
        let project = project();
        let resolver = resolver(&project);
        let mut file = MrkdwnJsonFile::new(&project, &resolver, "res/messages.json");
        file.parse(MESSAGES);

        let mut new_resources = TranslationSet::new();
        let text = file.localize_text(&translations(), "fr-FR", &mut new_resources).unwrap();
        assert_eq!(
            text,
            r#"{
    "intro": "Ceci est un *essai* de l'analyse.",
    "plain": "The expression `E = mc^2` was Einstein's",
    "emoji_only": ":tada:",
    "links": "See <http://example.com|the docs>\nor ask <@U123>"
}"#
        );
        assert_eq!(new_resources.size(), 2);
        assert!(!file.is_fully_translated("fr-FR"));
    }

    #[test]
    fn test_non_string_values_are_kept() {
        let project = project();
        let resolver = resolver(&project);
        let mut file = MrkdwnJsonFile::new(&project, &resolver, "a.json");
        file.parse("{ \"count\": 3, \"intro\": \"This is a *test* of parsing.\", \"flags\": [true] }");
        assert_eq!(file.get_translation_set().size(), 1);

        let mut new_resources = TranslationSet::new();
        let text = file.localize_text(&translations(), "fr-FR", &mut new_resources).unwrap();
        assert_eq!(
            text,
            "{\n    \"count\": 3,\n    \"intro\": \"Ceci est un *essai* de l'analyse.\",\n    \"flags\": [\n        true\n    ]\n}"
        );
        assert!(file.is_fully_translated("fr-FR"));
    }

    #[test]
    fn test_localized_path() {
        let project = project();
        let resolver = resolver(&project);
        let json = MrkdwnJsonFile::new(&project, &resolver, "res/messages.json");
        assert_eq!(json.get_localized_path("de-DE"), "res/messages_de-DE.json");
        let jsn = MrkdwnJsonFile::new(&project, &resolver, "res/messages.jsn");
        assert_eq!(jsn.get_localized_path("de-DE"), "res/messages_de-DE.jsn");
    }

    #[test]
    fn test_file_type_handles() {
        let project = project();
        let file_type = MrkdwnJsonFileType::new(&project).unwrap();
        assert!(file_type.handles("res/messages.json"));
        assert!(file_type.handles("res/messages.jsn"));
        assert!(!file_type.handles("src/messages.js"));
        assert!(!file_type.handles("data/strings.csv"));
        assert_eq!(file_type.datatype(), "mrkdwn");
        assert_eq!(file_type.new_file("a.json").path_name(), "a.json");
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
        let mut file = MrkdwnJsonFile::new(&project, &resolver, "missing.json");
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
        std::fs::create_dir_all(dir.path().join("res")).unwrap();
        std::fs::write(dir.path().join("res/messages.json"), MESSAGES).unwrap();

        let resolver = resolver(&project);
        let mut file = MrkdwnJsonFile::new(&project, &resolver, "res/messages.json");
        file.extract();
        let mut new_resources = TranslationSet::new();
        let written = file
            .localize(&translations(), project.locales(), &mut new_resources)
            .unwrap();

        assert_eq!(written, vec![dir.path().join("out/res/messages_fr-FR.json")]);
        let text = std::fs::read_to_string(&written[0]).unwrap();
        assert!(text.starts_with("{\n    \"intro\": \"Ceci est un *essai* de l'analyse.\""));
    }
}
