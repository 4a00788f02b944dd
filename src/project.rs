use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::localizer::Localizer;
use crate::path_template::validate_locale;
use crate::settings::ProjectSettings;

/// A localization project: its settings plus the translation lookup built from them
#[derive(Debug)]
pub struct Project {
    settings: ProjectSettings,
    localizer: Localizer,
}

impl Project {
    /// Create a project, validating every configured locale
    pub fn new(settings: ProjectSettings) -> Result<Self> {
        validate_locale(&settings.source_locale)?;
        for locale in &settings.locales {
            validate_locale(locale)?;
        }
        let localizer = Localizer::from_settings(&settings);
        debug!(
            "Project '{}': source locale {}, {} target locales",
            settings.id,
            settings.source_locale,
            settings.locales.len()
        );
        Ok(Project { settings, localizer })
    }

    /// Load the project from a JSON settings file. Relative `root` and `target`
    /// directories are resolved against the directory of that file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings = ProjectSettings::load_from_path(path)?;
        if let Some(base) = path.parent() {
            if settings.root.is_relative() {
                settings.root = base.join(&settings.root);
            }
            if settings.target.is_relative() {
                settings.target = base.join(&settings.target);
            }
        }
        Self::new(settings)
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn id(&self) -> &str {
        &self.settings.id
    }

    pub fn source_locale(&self) -> &str {
        &self.settings.source_locale
    }

    pub fn locales(&self) -> &[String] {
        &self.settings.locales
    }

    /// Absolute or working-directory-relative path of a project file
    pub fn source_path(&self, path_name: &str) -> PathBuf {
        self.settings.root.join(path_name)
    }

    /// Where a localized file with the given project-relative path is written
    pub fn target_path(&self, path_name: &str) -> PathBuf {
        self.settings.target.join(path_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoctoolError;

    #[test]
    fn test_invalid_locale_is_rejected() {
        let settings = ProjectSettings {
            locales: vec!["de-DE".to_string(), "not a locale".to_string()],
            ..ProjectSettings::default()
        };
        let err = Project::new(settings).unwrap_err();
        assert!(matches!(err, LoctoolError::Locale { locale } if locale == "not a locale"));
    }

    #[test]
    fn test_load_resolves_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.json");
        std::fs::write(&path, r#"{ "id": "webapp", "root": "src", "target": "out", "locales": ["fr-FR"] }"#).unwrap();

        let project = Project::load(&path).unwrap();
        assert_eq!(project.id(), "webapp");
        assert_eq!(project.source_path("a.js"), dir.path().join("src").join("a.js"));
        assert_eq!(project.target_path("a_fr-FR.js"), dir.path().join("out").join("a_fr-FR.js"));
        assert_eq!(project.locales(), &["fr-FR".to_string()]);
    }
}
