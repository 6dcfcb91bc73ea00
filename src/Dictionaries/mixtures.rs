use serde_json::{Map, Value};
use std::collections::HashMap;

/// Named mixtures (commercial buffers, screens) and the fractions of their constituents.
/// Keys are canonical display names of the compound dictionary; constituents keep the
/// order they were written in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixtureDictionary {
    mixtures: HashMap<String, Vec<(String, f64)>>,
}

impl MixtureDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, constituents: Vec<(String, f64)>) {
        self.mixtures.insert(name.to_string(), constituents);
    }

    /// builds the dictionary from a JSON object `{ mixture: { constituent: fraction, ... }, ... }`.
    /// Returns the names of mixtures (or "mixture/constituent") that could not be read
    pub fn from_json_object(object: &Map<String, Value>) -> (Self, Vec<String>) {
        let mut dictionary = Self::new();
        let mut rejected = Vec::new();
        for (name, constituents) in object {
            let Some(constituents) = constituents.as_object() else {
                rejected.push(name.clone());
                continue;
            };
            let mut parsed = Vec::with_capacity(constituents.len());
            for (constituent, fraction) in constituents {
                match fraction.as_f64() {
                    Some(fraction) => parsed.push((constituent.clone(), fraction)),
                    None => rejected.push(format!("{}/{}", name, constituent)),
                }
            }
            dictionary.insert(name, parsed);
        }
        (dictionary, rejected)
    }

    pub fn get(&self, name: &str) -> Option<&[(String, f64)]> {
        self.mixtures.get(name).map(|c| c.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.mixtures.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.mixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mixtures.is_empty()
    }
}
