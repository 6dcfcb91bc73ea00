use crate::Crystallization::crystal_errors::CrystalError;
use crate::Crystallization::predicates::{format_value, parse_number};
use crate::Crystallization::record::{CompoundEntry, Record};
use crate::Dictionaries::compound_dictionary::{CompoundDictionary, canonical_key};
use crate::Dictionaries::tables::ParserTables;
use log::{debug, error, info};
use rayon::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// marker separating the alternatives of a dictionary value
pub const ALTERNATION_MARKER: &str = " / ";
/// a percent of a mixture is counted as ten millimolar of the mixture
const PERCENT_TO_MILLIMOLAR: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurationDecision {
    /// the name becomes a canonical dictionary name and the pair is kept
    Accept,
    /// the name is not a compound, the pair is left out
    Reject,
    /// no decision yet, the pair is left out and reported
    Defer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedKind {
    Alternative,
    MixtureConstituent,
}

/// A name produced by an expansion that is not a canonical dictionary name
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedCompound {
    pub record_id: String,
    /// the alternative or constituent that is not known
    pub compound: String,
    /// the pair whose expansion produced it
    pub context: CompoundEntry,
    pub kind: UnresolvedKind,
}

/// Decides what to do with names the dictionary does not know yet.
/// Called at most once per canonical key in a batch, without any dictionary lock held, so an
/// implementation may block on a person or an external service.
pub trait Curator: Sync {
    fn decide(&self, unresolved: &UnresolvedCompound) -> CurationDecision;
}

/// leaves every decision to the curation workflow
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferAll;

impl Curator for DeferAll {
    fn decide(&self, _unresolved: &UnresolvedCompound) -> CurationDecision {
        CurationDecision::Defer
    }
}

/// Concentration of a mixture constituent: percents become millimolar (x10) before the
/// fraction is applied, millimolar values take the fraction as they are
pub fn constituent_concentration(
    concentration: Option<&str>,
    fraction: f64,
) -> Result<Option<String>, CrystalError> {
    let Some(concentration) = concentration else {
        return Ok(None);
    };
    let (number, scale) = match concentration.split_once('%') {
        Some((number, _)) => (number, fraction * PERCENT_TO_MILLIMOLAR),
        None => (concentration, fraction),
    };
    let value = parse_number(number.trim())
        .ok_or_else(|| CrystalError::MalformedNumeric(concentration.to_string()))?;
    Ok(Some(format_value(value * scale)))
}

/// Standardizes the compound names of one record through the dictionary and mixture tables.
/// The record is only updated when the whole list was standardized. Returns the expansions
/// that were left out for curation.
pub fn standardize_record(
    record: &mut Record,
    tables: &ParserTables,
    curator: &dyn Curator,
) -> Result<Vec<UnresolvedCompound>, CrystalError> {
    let dictionary = &tables.dictionary;
    let max_depth = tables.config.max_expansion_depth;
    let mut pending: VecDeque<(CompoundEntry, usize)> =
        record.compounds.iter().cloned().map(|entry| (entry, 0)).collect();
    let mut standardized = Vec::with_capacity(pending.len());
    let mut unresolved = Vec::new();

    while let Some((entry, depth)) = pending.pop_front() {
        let Some(value) = dictionary.resolve(&entry.name) else {
            debug!("record {}: '{}' is not in the dictionary", record.id, entry.name);
            standardized.push(entry);
            continue;
        };
        let expansion: Vec<(String, Option<String>, UnresolvedKind)> =
            if value.contains(ALTERNATION_MARKER) {
                value
                    .split(ALTERNATION_MARKER)
                    .map(str::trim)
                    .filter(|alternative| !alternative.is_empty())
                    .map(|alternative| {
                        (
                            alternative.to_string(),
                            entry.concentration.clone(),
                            UnresolvedKind::Alternative,
                        )
                    })
                    .collect()
            } else if let Some(constituents) = tables.mixtures.get(&value) {
                let mut expansion = Vec::with_capacity(constituents.len());
                for (constituent, fraction) in constituents {
                    let concentration =
                        constituent_concentration(entry.concentration.as_deref(), *fraction)?;
                    expansion.push((
                        constituent.clone(),
                        concentration,
                        UnresolvedKind::MixtureConstituent,
                    ));
                }
                expansion
            } else {
                standardized.push(CompoundEntry {
                    name: value,
                    concentration: entry.concentration,
                });
                continue;
            };

        if depth >= max_depth {
            return Err(CrystalError::ExpansionCycle(entry.name));
        }
        for (name, concentration, kind) in expansion {
            if !dictionary.is_canonical(&name) {
                let event = UnresolvedCompound {
                    record_id: record.id.clone(),
                    compound: name.clone(),
                    context: entry.clone(),
                    kind,
                };
                let key = canonical_key(&name);
                match dictionary.decide_once(&key, || curator.decide(&event)) {
                    CurationDecision::Accept => {
                        dictionary.insert_if_absent(&key, &name);
                    }
                    CurationDecision::Reject | CurationDecision::Defer => {
                        unresolved.push(event);
                        continue;
                    }
                }
            }
            pending.push_back((CompoundEntry { name, concentration }, depth + 1));
        }
    }

    record.compounds = standardized;
    Ok(unresolved)
}

/// Standardizes a batch in parallel. The dictionary closure is restored first; a record
/// that fails is logged and left as it was, the rest of the batch goes on.
/// Returns the unresolved expansions of every record.
pub fn standardize_all(
    records: &mut [Record],
    tables: &ParserTables,
    curator: &dyn Curator,
) -> Vec<UnresolvedCompound> {
    tables.dictionary.restore_closure();
    info!("standardizing compound names of {} records", records.len());
    let failed = AtomicUsize::new(0);
    let unresolved: Vec<UnresolvedCompound> = records
        .par_iter_mut()
        .flat_map_iter(|record| match standardize_record(record, tables, curator) {
            Ok(unresolved) => unresolved,
            Err(e) => {
                failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    "record {} failed: {}; details: {:?}; compounds: {:?}",
                    record.id, e, record.details, record.compounds
                );
                Vec::new()
            }
        })
        .collect();
    info!(
        "standardization done: {} records, {} failed, {} unresolved names",
        records.len(),
        failed.load(Ordering::Relaxed),
        unresolved.len()
    );
    unresolved
}

/// records with a non-empty compound list made only of canonical dictionary names
pub fn sensible_records<'a>(records: &'a [Record], dictionary: &CompoundDictionary) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| record.is_sensible(dictionary))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dictionaries::mixtures::MixtureDictionary;
    use std::collections::HashMap;

    struct CountingCurator {
        decision: CurationDecision,
        calls: AtomicUsize,
    }

    impl Curator for CountingCurator {
        fn decide(&self, _unresolved: &UnresolvedCompound) -> CurationDecision {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.decision
        }
    }

    fn dictionary(pairs: &[(&str, &str)]) -> CompoundDictionary {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let dictionary = CompoundDictionary::from_map(map);
        dictionary.restore_closure();
        dictionary
    }

    fn record(compounds: &[(&str, Option<&str>)]) -> Record {
        let mut record = Record::new("1ABC", None);
        record.compounds = compounds
            .iter()
            .map(|(name, concentration)| CompoundEntry::new(name, *concentration))
            .collect();
        record
    }

    #[test]
    fn test_direct_rewrite_and_unknown_names() {
        let tables = ParserTables::empty().with_dictionary(dictionary(&[
            ("nacl", "Sodium chloride"),
            ("peg4000", "PEG 4000"),
        ]));
        let mut rec = record(&[
            ("nacl", Some("100.0")),
            ("mystery", None),
            ("PEG 4000", Some("20%")),
        ]);
        let unresolved = standardize_record(&mut rec, &tables, &DeferAll).unwrap();
        assert!(unresolved.is_empty());
        assert_eq!(
            rec.compounds,
            vec![
                CompoundEntry::new("Sodium chloride", Some("100.0")),
                CompoundEntry::new("mystery", None),
                CompoundEntry::new("PEG 4000", Some("20%")),
            ]
        );
    }

    #[test]
    fn test_alternatives_are_appended() {
        let tables = ParserTables::empty().with_dictionary(dictionary(&[
            ("salt", "Sodium chloride / Potassium chloride"),
            ("sodiumchloride", "Sodium chloride"),
            ("potassiumchloride", "Potassium chloride"),
        ]));
        let mut rec = record(&[("salt", Some("100.0")), ("tris", Some("50"))]);
        let unresolved = standardize_record(&mut rec, &tables, &DeferAll).unwrap();
        assert!(unresolved.is_empty());
        assert_eq!(
            rec.compounds,
            vec![
                CompoundEntry::new("tris", Some("50")),
                CompoundEntry::new("Sodium chloride", Some("100.0")),
                CompoundEntry::new("Potassium chloride", Some("100.0")),
            ]
        );
    }

    #[test]
    fn test_mixture_expansion_scales_concentrations() {
        let mut mixtures = MixtureDictionary::new();
        mixtures.insert("Mix", vec![("A".to_string(), 0.5), ("B".to_string(), 0.5)]);
        let tables = ParserTables::empty()
            .with_dictionary(dictionary(&[("mix", "Mix"), ("a", "A"), ("b", "B")]))
            .with_mixtures(mixtures);

        let mut percent = record(&[("mix", Some("10%"))]);
        standardize_record(&mut percent, &tables, &DeferAll).unwrap();
        assert_eq!(
            percent.compounds,
            vec![
                CompoundEntry::new("A", Some("50.0")),
                CompoundEntry::new("B", Some("50.0")),
            ]
        );

        let mut millimolar = record(&[("mix", Some("100.0"))]);
        standardize_record(&mut millimolar, &tables, &DeferAll).unwrap();
        assert_eq!(millimolar.compounds[0], CompoundEntry::new("A", Some("50.0")));

        let mut absent = record(&[("mix", None)]);
        standardize_record(&mut absent, &tables, &DeferAll).unwrap();
        assert_eq!(
            absent.compounds,
            vec![CompoundEntry::new("A", None), CompoundEntry::new("B", None)]
        );
    }

    #[test]
    fn test_constituent_concentration() {
        assert_eq!(
            constituent_concentration(Some("20% w/v"), 0.25).unwrap(),
            Some("50.0".to_string())
        );
        assert_eq!(
            constituent_concentration(Some("1,000"), 0.5).unwrap(),
            Some("500.0".to_string())
        );
        assert_eq!(constituent_concentration(None, 0.5).unwrap(), None);
        assert_eq!(
            constituent_concentration(Some("high"), 0.5),
            Err(CrystalError::MalformedNumeric("high".to_string()))
        );
    }

    #[test]
    fn test_unknown_alternative_is_reported() {
        let tables = ParserTables::empty().with_dictionary(dictionary(&[
            ("salt", "Sodium chloride / Halite"),
            ("sodiumchloride", "Sodium chloride"),
        ]));
        let mut rec = record(&[("salt", Some("100.0"))]);
        let unresolved = standardize_record(&mut rec, &tables, &DeferAll).unwrap();
        assert_eq!(rec.compounds, vec![CompoundEntry::new("Sodium chloride", Some("100.0"))]);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].compound, "Halite");
        assert_eq!(unresolved[0].kind, UnresolvedKind::Alternative);
        assert_eq!(unresolved[0].context, CompoundEntry::new("salt", Some("100.0")));
        assert_eq!(unresolved[0].record_id, "1ABC");
    }

    #[test]
    fn test_accepted_alternative_enters_dictionary() {
        let tables = ParserTables::empty().with_dictionary(dictionary(&[
            ("salt", "Sodium chloride / Halite"),
            ("sodiumchloride", "Sodium chloride"),
        ]));
        let curator = CountingCurator {
            decision: CurationDecision::Accept,
            calls: AtomicUsize::new(0),
        };
        let mut rec = record(&[("salt", Some("100.0"))]);
        let unresolved = standardize_record(&mut rec, &tables, &curator).unwrap();
        assert!(unresolved.is_empty());
        assert_eq!(rec.compounds.len(), 2);
        assert_eq!(rec.compounds[1], CompoundEntry::new("Halite", Some("100.0")));
        assert_eq!(tables.dictionary.resolve("halite"), Some("Halite".to_string()));
        assert!(tables.dictionary.is_canonical("Halite"));
    }

    #[test]
    fn test_each_name_is_curated_once_per_batch() {
        let tables = ParserTables::empty().with_dictionary(dictionary(&[
            ("salt", "Sodium chloride / Halite"),
            ("sodiumchloride", "Sodium chloride"),
        ]));
        let curator = CountingCurator {
            decision: CurationDecision::Reject,
            calls: AtomicUsize::new(0),
        };
        let mut records: Vec<Record> = (0..64)
            .map(|i| {
                let mut rec = record(&[("salt", Some("100.0"))]);
                rec.id = format!("R{}", i);
                rec
            })
            .collect();
        let unresolved = standardize_all(&mut records, &tables, &curator);
        assert_eq!(curator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(unresolved.len(), 64);
        assert!(records
            .iter()
            .all(|r| r.compounds == vec![CompoundEntry::new("Sodium chloride", Some("100.0"))]));
    }

    #[test]
    fn test_cycle_leaves_record_untouched() {
        let tables = ParserTables::empty().with_dictionary(dictionary(&[
            ("a", "A / B"),
            ("x", "A"),
            ("b", "B"),
        ]));
        let mut cyclic = record(&[("a", Some("5"))]);
        let before = cyclic.compounds.clone();
        let result = standardize_record(&mut cyclic, &tables, &DeferAll);
        assert!(matches!(result, Err(CrystalError::ExpansionCycle(_))));
        assert_eq!(cyclic.compounds, before);

        let mut records = vec![cyclic, record(&[("b", Some("5"))])];
        records[1].id = "2DEF".to_string();
        standardize_all(&mut records, &tables, &DeferAll);
        assert_eq!(records[0].compounds, before);
        assert_eq!(records[1].compounds, vec![CompoundEntry::new("B", Some("5"))]);
    }

    #[test]
    fn test_sensible_records() {
        let dictionary = dictionary(&[("tris", "Tris")]);
        let records = vec![
            record(&[("Tris", Some("50"))]),
            record(&[("Tris", Some("50")), ("mystery", None)]),
            record(&[]),
        ];
        let sensible = sensible_records(&records, &dictionary);
        assert_eq!(sensible.len(), 1);
        assert_eq!(sensible[0].compounds[0].name, "Tris");
    }
}
