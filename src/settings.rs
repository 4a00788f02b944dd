//! Project configuration
//!
//! Settings are read from a JSON project file. Every field has a default, so an
//! empty object `{}` is a valid configuration:
//!
//! ```json
//! {
//!     "id": "webapp",
//!     "sourceLocale": "en-US",
//!     "locales": ["de-DE", "fr-FR"],
//!     "mrkdwn": {
//!         "fullyTranslated": true,
//!         "mappings": [
//!             { "pattern": "**/messages/*.js", "template": "[dir]/[locale]/[filename]" }
//!         ]
//!     },
//!     "csv": { "columnSeparator": "\t", "key": "id" }
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LoctoolError, Result};

pub const DEFAULT_SOURCE_LOCALE: &str = "en-US";
pub const DEFAULT_PSEUDO_LOCALE: &str = "zxx-XX";
pub const DEFAULT_MRKDWN_TEMPLATE: &str = "[dir]/[basename]_[locale].js";
pub const DEFAULT_MRKDWN_JSON_TEMPLATE: &str = "[dir]/[basename]_[locale].[extension]";
pub const DEFAULT_CSV_TEMPLATE: &str = "[dir]/[basename]_[locale].[extension]";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectSettings {
    pub id: String,
    pub name: Option<String>,
    pub source_locale: String,
    pub locales: Vec<String>,
    /// Locale that is filled with pseudo-localized text
    pub pseudo_locale: String,
    /// Never pseudo-localize anything
    pub nopseudo: bool,
    /// Pseudo-localize strings that have no translation instead of emitting source text
    pub missing_pseudo: bool,
    /// Directory source paths are relative to
    pub root: PathBuf,
    /// Directory localized files are written under
    pub target: PathBuf,
    pub mrkdwn: MrkdwnSettings,
    pub csv: CsvSettings,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        ProjectSettings {
            id: String::from("loctool"),
            name: None,
            source_locale: DEFAULT_SOURCE_LOCALE.to_string(),
            locales: Vec::new(),
            pseudo_locale: DEFAULT_PSEUDO_LOCALE.to_string(),
            nopseudo: false,
            missing_pseudo: false,
            root: PathBuf::from("."),
            target: PathBuf::from("."),
            mrkdwn: MrkdwnSettings::default(),
            csv: CsvSettings::default(),
        }
    }
}

impl ProjectSettings {
    /// Load settings from a JSON project file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| LoctoolError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| LoctoolError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// How the localized message module exports its object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// `export default messages = {...};`
    #[default]
    Module,
    /// `module.exports.messages = {...};`
    CommonJs,
}

impl OutputStyle {
    pub fn prefix(self) -> &'static str {
        match self {
            OutputStyle::Module => "export default messages = ",
            OutputStyle::CommonJs => "module.exports.messages = ",
        }
    }
}

/// Maps source files matching `pattern` to localized paths built from `template`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathMapping {
    pub pattern: String,
    pub template: String,
    /// Rewrites a locale before it is substituted into the template
    #[serde(default)]
    pub locale_map: HashMap<String, String>,
}

impl PathMapping {
    pub fn new(pattern: impl Into<String>, template: impl Into<String>) -> Self {
        PathMapping {
            pattern: pattern.into(),
            template: template.into(),
            locale_map: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MrkdwnSettings {
    /// Emit the source message verbatim unless it is translated
    pub fully_translated: bool,
    pub output_style: OutputStyle,
    pub mappings: Vec<PathMapping>,
    /// Mappings for JSON message files
    pub json_mappings: Vec<PathMapping>,
}

impl Default for MrkdwnSettings {
    fn default() -> Self {
        MrkdwnSettings {
            fully_translated: false,
            output_style: OutputStyle::Module,
            mappings: vec![PathMapping::new("**/*.js", DEFAULT_MRKDWN_TEMPLATE)],
            json_mappings: vec![
                PathMapping::new("**/*.json", "[dir]/[basename]_[locale].json"),
                PathMapping::new("**/*.jsn", "[dir]/[basename]_[locale].jsn"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default)]
    pub localizable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CsvSettings {
    /// Separator written between rows, also used to split rows when no
    /// `rowSeparatorRegex` is given
    pub row_separator: Option<String>,
    pub row_separator_regex: Option<String>,
    pub column_separator: char,
    /// Whether the first line holds column names
    pub header: bool,
    /// Explicit column descriptors; without them the header row is used
    pub columns: Option<Vec<ColumnSpec>>,
    /// Column used to match records when merging; defaults to the first column
    pub key: Option<String>,
    pub mappings: Vec<PathMapping>,
}

impl Default for CsvSettings {
    fn default() -> Self {
        CsvSettings {
            row_separator: None,
            row_separator_regex: None,
            column_separator: ',',
            header: true,
            columns: None,
            key: None,
            mappings: vec![
                PathMapping::new("**/*.csv", DEFAULT_CSV_TEMPLATE),
                PathMapping::new("**/*.tsv", DEFAULT_CSV_TEMPLATE),
            ],
        }
    }
}
