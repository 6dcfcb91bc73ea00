use crate::Dictionaries::compound_dictionary::{CompoundDictionary, canonical_key};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// one (compound, concentration) pair of a crystallization recipe. Concentrations are
/// kept as text: millimolar values ("100.0") or percents ("20%", "20% w/v")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundEntry {
    pub name: String,
    pub concentration: Option<String>,
}

impl CompoundEntry {
    pub fn new(name: &str, concentration: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            concentration: concentration.map(|c| c.to_string()),
        }
    }
}

/// struct for a deposited structure as fetched from the structure database.
/// Everything but `compounds` is filled by the retrieval side; `compounds` is filled by the
/// details parser and rewritten by the name standardizer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub literature_id: Option<String>,
    /// free-text crystallization details
    pub details: Option<String>,
    pub ph: Option<f64>,
    /// crystallization temperature, K
    pub temperature: Option<f64>,
    pub method: Option<String>,
    /// resolution, angstrom
    pub resolution: Option<f64>,
    pub sequences: Vec<String>,
    pub compounds: Vec<CompoundEntry>,
}

impl Record {
    pub fn new(id: &str, details: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            details: details.map(|d| d.to_string()),
            ..Default::default()
        }
    }

    /// compound list as name, concentration, name, concentration, ...
    pub fn flattened(&self) -> Vec<Option<&str>> {
        self.compounds
            .iter()
            .flat_map(|entry| [Some(entry.name.as_str()), entry.concentration.as_deref()])
            .collect()
    }

    pub fn compound_names(&self) -> impl Iterator<Item = &str> {
        self.compounds.iter().map(|entry| entry.name.as_str())
    }

    /// true if one of the compounds was curated as "unknown"
    pub fn has_unknown(&self, unknown_list: &HashSet<String>) -> bool {
        self.compound_names()
            .any(|name| unknown_list.contains(&canonical_key(name)))
    }

    /// true if one of the compounds was curated as a parsing error
    pub fn has_error(&self, error_list: &HashSet<String>) -> bool {
        self.compound_names()
            .any(|name| error_list.contains(&canonical_key(name)))
    }

    /// A record makes sense when it has compounds and every one of them is a canonical dictionary name
    pub fn is_sensible(&self, dictionary: &CompoundDictionary) -> bool {
        !self.compounds.is_empty()
            && self
                .compound_names()
                .all(|name| dictionary.is_canonical(name))
    }

    pub fn compounds_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("Compound"),
            Cell::new("Concentration"),
        ]));
        for entry in &self.compounds {
            let concentration = entry.concentration.as_deref().unwrap_or("-");
            table.add_row(Row::new(vec![
                Cell::new(&entry.name),
                Cell::new(concentration),
            ]));
        }
        table
    }

    pub fn pretty_print(&self) {
        println!("\n Record {}", self.id);
        if let Some(details) = &self.details {
            println!(" details: {}", details);
        }
        self.compounds_table().printstd();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record_with(compounds: Vec<CompoundEntry>) -> Record {
        let mut record = Record::new("1ABC", Some("0.1 M tris, 20% PEG 4000"));
        record.compounds = compounds;
        record
    }

    #[test]
    fn test_flattened_keeps_absent_concentrations() {
        let record = record_with(vec![
            CompoundEntry::new("tris", Some("100.0")),
            CompoundEntry::new("glycerol", None),
        ]);
        let flat = record.flattened();
        assert_eq!(flat.len(), 4);
        assert_eq!(flat, vec![Some("tris"), Some("100.0"), Some("glycerol"), None]);
    }

    #[test]
    fn test_unknown_and_error_flags() {
        let record = record_with(vec![CompoundEntry::new("Well Plate", None)]);
        let unknown: HashSet<String> = ["wellplate".to_string()].into_iter().collect();
        let errors: HashSet<String> = HashSet::new();
        assert!(record.has_unknown(&unknown));
        assert!(!record.has_error(&errors));
    }

    #[test]
    fn test_is_sensible() {
        let dictionary = CompoundDictionary::from_map(HashMap::from([(
            "tris".to_string(),
            "Tris".to_string(),
        )]));
        dictionary.restore_closure();
        let sensible = record_with(vec![CompoundEntry::new("Tris", Some("100.0"))]);
        let not_sensible = record_with(vec![
            CompoundEntry::new("Tris", Some("100.0")),
            CompoundEntry::new("mystery", None),
        ]);
        assert!(sensible.is_sensible(&dictionary));
        assert!(!not_sensible.is_sensible(&dictionary));
        assert!(!record_with(vec![]).is_sensible(&dictionary));
    }

    #[test]
    fn test_compounds_table() {
        let record = record_with(vec![
            CompoundEntry::new("Tris", Some("100.0")),
            CompoundEntry::new("PEG 4000", Some("20%")),
        ]);
        let table = record.compounds_table();
        assert_eq!(table.len(), 3);
        let rendered = table.to_string();
        assert!(rendered.contains("PEG 4000"));
        assert!(rendered.contains("20%"));
    }
}
