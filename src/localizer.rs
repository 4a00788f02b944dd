//! Translation lookup shared by the file adapters
//!
//! For one string and one locale the lookup goes through these sources in order:
//! 1. the pseudo locale with pseudo-localization switched off yields the source text
//! 2. a translation from the translation store
//! 3. a pseudo bundle registered for the locale
//! 4. the source text itself (pseudo-localized when `missing_pseudo` is set), in
//!    which case the string is recorded as a new resource to be translated

use std::collections::HashMap;

use tracing::trace;

use crate::pseudo::{AccentPseudo, PseudoBundle};
use crate::resource::{ResourceString, hash_key};
use crate::settings::ProjectSettings;
use crate::translation_set::TranslationStore;

/// Outcome of looking up one string for one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Text to put into the localized output
    pub text: String,
    /// Whether `text` came from an actual translation
    pub translated: bool,
}

/// Identifies the string being looked up
#[derive(Debug, Clone, Copy)]
pub struct LookupRequest<'a> {
    pub key: &'a str,
    pub source: &'a str,
    pub locale: &'a str,
    pub datatype: &'a str,
    pub path_name: Option<&'a str>,
    pub comment: Option<&'a str>,
}

pub struct Localizer {
    project: String,
    source_locale: String,
    pseudo_locale: String,
    nopseudo: bool,
    pseudos: HashMap<String, Box<dyn PseudoBundle>>,
    missing_pseudo: Option<Box<dyn PseudoBundle>>,
}

impl std::fmt::Debug for Localizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Localizer")
            .field("project", &self.project)
            .field("source_locale", &self.source_locale)
            .field("pseudo_locale", &self.pseudo_locale)
            .field("nopseudo", &self.nopseudo)
            .field("pseudo_locales", &self.pseudos.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Localizer {
    pub fn new(project: impl Into<String>, source_locale: impl Into<String>) -> Self {
        Localizer {
            project: project.into(),
            source_locale: source_locale.into(),
            pseudo_locale: crate::settings::DEFAULT_PSEUDO_LOCALE.to_string(),
            nopseudo: false,
            pseudos: HashMap::new(),
            missing_pseudo: None,
        }
    }

    /// Build a localizer from project settings. The pseudo locale always gets an
    /// accenting bundle unless pseudo-localization is disabled.
    pub fn from_settings(settings: &ProjectSettings) -> Self {
        let mut localizer = Localizer::new(&settings.id, &settings.source_locale);
        localizer.pseudo_locale = settings.pseudo_locale.clone();
        localizer.nopseudo = settings.nopseudo;
        if !settings.nopseudo {
            let bundle = AccentPseudo::new(&settings.source_locale);
            localizer.pseudos.insert(settings.pseudo_locale.clone(), Box::new(bundle));
            if settings.missing_pseudo {
                localizer.missing_pseudo = Some(Box::new(AccentPseudo::new(&settings.source_locale)));
            }
        }
        localizer
    }

    /// Register a pseudo bundle for a locale
    pub fn with_pseudo(mut self, locale: impl Into<String>, bundle: Box<dyn PseudoBundle>) -> Self {
        self.pseudos.insert(locale.into(), bundle);
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn source_locale(&self) -> &str {
        &self.source_locale
    }

    /// Look up the text for `request`, recording untranslated strings in `new_resources`
    pub fn lookup(
        &self,
        request: &LookupRequest<'_>,
        translations: &dyn TranslationStore,
        new_resources: &mut dyn TranslationStore,
    ) -> Lookup {
        if request.locale == self.pseudo_locale && self.nopseudo {
            return Lookup {
                text: request.source.to_string(),
                translated: false,
            };
        }

        let hash = hash_key(&self.project, request.locale, request.key, request.datatype);
        if let Some(target) = translations.get(&hash).and_then(|res| res.target.as_ref()) {
            trace!("Found translation for '{}' in {}", request.key, request.locale);
            return Lookup {
                text: target.clone(),
                translated: true,
            };
        }

        if let Some(bundle) = self.pseudos.get(request.locale) {
            let mut input = request.source.to_string();
            if bundle.pseudo_source_locale() != self.source_locale {
                // the bundle pseudo-localizes a translation, not the source
                let source_hash = hash_key(
                    &self.project,
                    bundle.pseudo_source_locale(),
                    request.key,
                    request.datatype,
                );
                if let Some(target) = translations.get(&source_hash).and_then(|res| res.target.as_ref()) {
                    input = target.clone();
                }
            }
            return Lookup {
                text: bundle.get_string(&input),
                translated: false,
            };
        }

        trace!("No translation for '{}' in {}", request.key, request.locale);
        let mut resource = ResourceString::new(
            &self.project,
            request.key,
            request.source,
            &self.source_locale,
            request.datatype,
        )
        .with_target(request.source, request.locale)
        .with_comment(request.comment.map(str::to_string))
        .with_state("new");
        if let Some(path) = request.path_name {
            resource = resource.with_path(path);
        }
        new_resources.add(resource);

        let text = match (&self.missing_pseudo, self.nopseudo) {
            (Some(bundle), false) => bundle.get_string(request.source),
            _ => request.source.to_string(),
        };
        Lookup {
            text,
            translated: false,
        }
    }
}
