//! Extraction and localization of Slack mrkdwn message files and delimited
//! record files.
//!
//! Source files are read through a file type adapter ([`mrkdwn::MrkdwnFileType`],
//! [`mrkdwn::MrkdwnJsonFileType`], [`csv::CsvFileType`]) which produces a [`TranslationSet`] of resources to
//! translate. Given translations, the same adapter writes one localized file per
//! target locale and records anything still untranslated as new resources.

pub mod csv;
pub mod error;
pub mod localizer;
pub mod mrkdwn;
pub mod path_template;
pub mod project;
pub mod pseudo;
pub mod resource;
pub mod settings;
pub mod translation_set;
pub mod utils;

pub use error::{LoctoolError, Result};
pub use localizer::{Localizer, Lookup, LookupRequest};
pub use path_template::{MappingResolver, PathResolver, format_path};
pub use project::Project;
pub use pseudo::{AccentPseudo, PseudoBundle};
pub use resource::{DATATYPE_CSV, DATATYPE_MRKDWN, ResourceString};
pub use settings::ProjectSettings;
pub use translation_set::{TranslationSet, TranslationStore};
