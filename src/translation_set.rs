use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{LoctoolError, Result};
use crate::resource::ResourceString;

/// The storage contract the file adapters rely on.
///
/// Extraction adds source resources, localization looks up translations by
/// hash key (see [`crate::resource::hash_key`]).
pub trait TranslationStore {
    /// Add a resource, replacing any resource with the same hash key
    fn add(&mut self, resource: ResourceString);

    /// Look up a resource by hash key
    fn get(&self, hash_key: &str) -> Option<&ResourceString>;
}

/// An insertion-ordered set of resources keyed by their hash key.
#[derive(Debug, Clone, Default)]
pub struct TranslationSet {
    resources: Vec<ResourceString>,
    by_hash: HashMap<String, usize>,
}

impl TranslationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// First resource whose source text equals `source`
    pub fn get_by_source(&self, source: &str) -> Option<&ResourceString> {
        self.resources.iter().find(|res| res.source == source)
    }

    /// All resources in insertion order
    pub fn get_all(&self) -> &[ResourceString] {
        &self.resources
    }

    pub fn size(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Add every resource of `other` to this set
    pub fn add_set(&mut self, other: &TranslationSet) {
        for res in other.get_all() {
            self.add(res.clone());
        }
    }

    /// Load a set from a JSON array of resources
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| LoctoolError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let resources: Vec<ResourceString> =
            serde_json::from_str(&content).map_err(|source| LoctoolError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let mut set = TranslationSet::new();
        for res in resources {
            set.add(res);
        }
        debug!("Loaded {} resources from {}", set.size(), path.display());
        Ok(set)
    }

    /// Write the set as a pretty-printed JSON array of resources
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.resources)?;
        fs::write(path, json).map_err(|source| LoctoolError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote {} resources to {}", self.size(), path.display());
        Ok(())
    }
}

impl TranslationStore for TranslationSet {
    fn add(&mut self, resource: ResourceString) {
        let hash = resource.hash_key();
        match self.by_hash.get(&hash) {
            Some(&slot) => self.resources[slot] = resource,
            None => {
                self.by_hash.insert(hash, self.resources.len());
                self.resources.push(resource);
            }
        }
    }

    fn get(&self, hash_key: &str) -> Option<&ResourceString> {
        self.by_hash.get(hash_key).map(|&slot| &self.resources[slot])
    }
}
