use crate::Crystallization::standardizer::CurationDecision;
use crate::Utils::load_from_file::TablesError;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use log::info;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// characters dropped from a compound name to build its dictionary key
const KEY_STRIPPED_CHARS: [char; 8] = [' ', '(', ')', '-', ',', '/', '*', '_'];

/// normalized form of a compound name used for every dictionary lookup:
/// lowercase, without spaces, brackets, hyphens, commas, slashes, asterisks and underscores.
/// "Sodium Chloride" -> "sodiumchloride", "Bis-Tris (propane)" -> "bistrispropane"
pub fn canonical_key(name: &str) -> String {
    name.chars()
        .filter(|c| !KEY_STRIPPED_CHARS.contains(c))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Shared store mapping canonical keys to canonical display names.
/// Built for concurrent standardization: inserts are atomic insert-if-absent, and curation
/// decisions are recorded once per key, so the first decision wins for the whole batch.
#[derive(Debug, Default)]
pub struct CompoundDictionary {
    entries: DashMap<String, String>,
    /// every display name present as a value
    canonical: DashSet<String>,
    /// one cell per key; the curator runs on the cell, outside the map's shard lock
    decisions: DashMap<String, Arc<OnceLock<CurationDecision>>>,
}

impl CompoundDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// keys are taken as they are written in the map (curated dictionaries already hold canonical keys)
    pub fn from_map(map: HashMap<String, String>) -> Self {
        let dictionary = Self::new();
        for (key, value) in map {
            dictionary.canonical.insert(value.clone());
            dictionary.entries.insert(key, value);
        }
        dictionary
    }

    /// canonical display name of a compound name, looked up by its canonical key
    pub fn resolve(&self, name: &str) -> Option<String> {
        self.get(&canonical_key(name))
    }

    /// value stored under a ready-made key
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|value| value.value().clone())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// true if `name` is one of the canonical display names
    pub fn is_canonical(&self, name: &str) -> bool {
        self.canonical.contains(name)
    }

    /// Inserts `key -> value` unless the key is taken. Returns true when the entry was inserted
    pub fn insert_if_absent(&self, key: &str, value: &str) -> bool {
        let inserted = match self.entries.entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(value.to_string());
                true
            }
        };
        if inserted {
            self.canonical.insert(value.to_string());
        }
        inserted
    }

    /// Maintenance pass: makes every canonical value reachable under its own key, so a lookup
    /// never needs a second indirection. Returns the number of keys added
    pub fn restore_closure(&self) -> usize {
        let values: Vec<String> = self.canonical.iter().map(|v| v.key().clone()).collect();
        let added = values
            .iter()
            .filter(|value| self.insert_if_absent(&canonical_key(value), value))
            .count();
        info!(
            "compound dictionary closure restored: {} keys added, {} keys total",
            added,
            self.entries.len()
        );
        added
    }

    /// Returns the decision recorded for `key`, calling `decide` only if there is none yet.
    /// Concurrent callers for the same key wait for the first decision. Callers for other
    /// keys are not held up by a slow `decide`.
    pub fn decide_once<F>(&self, key: &str, decide: F) -> CurationDecision
    where
        F: FnOnce() -> CurationDecision,
    {
        let cell = Arc::clone(self.decisions.entry(key.to_string()).or_default().value());
        *cell.get_or_init(decide)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn canonical_values(&self) -> Vec<String> {
        let mut values: Vec<String> = self.canonical.iter().map(|v| v.key().clone()).collect();
        values.sort();
        values
    }

    /// snapshot of the entries, sorted by key
    pub fn to_sorted_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// writes the dictionary as pretty JSON with sorted keys
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TablesError> {
        let path = path.as_ref();
        let file = path.display().to_string();
        let json = serde_json::to_string_pretty(&self.to_sorted_map()).map_err(|e| {
            TablesError::InvalidFormat {
                file: file.clone(),
                message: e.to_string(),
            }
        })?;
        fs::write(path, json).map_err(|source| TablesError::Io { file, source })?;
        info!("compound dictionary with {} keys saved to {}", self.len(), path.display());
        Ok(())
    }
}
