use serde::{Deserialize, Serialize};

/// Datatype of strings extracted from mrkdwn message modules
pub const DATATYPE_MRKDWN: &str = "mrkdwn";
/// Datatype of strings extracted from delimited tables
pub const DATATYPE_CSV: &str = "x-csv";

/// A single translatable string, either as extracted from a source file or as a
/// translation of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceString {
    pub project: String,
    pub key: String,
    pub source: String,
    pub source_locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_locale: Option<String>,
    pub datatype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub auto_key: bool,
}

impl ResourceString {
    pub fn new(
        project: impl Into<String>,
        key: impl Into<String>,
        source: impl Into<String>,
        source_locale: impl Into<String>,
        datatype: impl Into<String>,
    ) -> Self {
        ResourceString {
            project: project.into(),
            key: key.into(),
            source: source.into(),
            source_locale: source_locale.into(),
            target: None,
            target_locale: None,
            datatype: datatype.into(),
            path_name: None,
            comment: None,
            index: 0,
            state: None,
            auto_key: false,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>, locale: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self.target_locale = Some(locale.into());
        self
    }

    pub fn with_path(mut self, path_name: impl Into<String>) -> Self {
        self.path_name = Some(path_name.into());
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// The locale this resource is stored under: the target locale for a
    /// translation, the source locale otherwise.
    pub fn locale(&self) -> &str {
        self.target_locale.as_deref().unwrap_or(&self.source_locale)
    }

    /// Hash key of this resource in a translation set
    pub fn hash_key(&self) -> String {
        hash_key(&self.project, self.locale(), &self.key, &self.datatype)
    }

    /// Hash key under which a translation of this resource into `locale` is stored
    pub fn hash_key_for_translation(&self, locale: &str) -> String {
        hash_key(&self.project, locale, &self.key, &self.datatype)
    }
}

/// Build the lookup key `rs_<project>_<locale>_<key>_<datatype>`.
pub fn hash_key(project: &str, locale: &str, key: &str, datatype: &str) -> String {
    format!("rs_{}_{}_{}_{}", project, locale, key, datatype)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_key_uses_target_locale() {
        let source = ResourceString::new("webapp", "greeting", "Hello", "en-US", DATATYPE_MRKDWN);
        assert_eq!(source.hash_key(), "rs_webapp_en-US_greeting_mrkdwn");

        let translated = source.clone().with_target("Hallo", "de-DE");
        assert_eq!(translated.hash_key(), "rs_webapp_de-DE_greeting_mrkdwn");
        assert_eq!(source.hash_key_for_translation("de-DE"), translated.hash_key());
    }

    #[test]
    fn test_json_uses_camel_case() {
        let res = ResourceString::new("p", "k", "s", "en-US", DATATYPE_CSV)
            .with_path("a/b.csv")
            .with_index(3);
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["sourceLocale"], "en-US");
        assert_eq!(json["pathName"], "a/b.csv");
        assert_eq!(json["index"], 3);
        assert!(json.get("target").is_none());
    }
}
