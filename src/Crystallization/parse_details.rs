use crate::Crystallization::extractor::extract;
use crate::Crystallization::normalization::normalize;
use crate::Crystallization::predicates::ERROR_SENTINEL;
use crate::Crystallization::preprocess::preprocess;
use crate::Crystallization::record::{CompoundEntry, Record};
use crate::Crystallization::tokenizer::tokenize;
use crate::Dictionaries::tables::ParserTables;
use log::{debug, info, trace};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// progress is logged every this many records
const PROGRESS_STEP: usize = 10_000;

/// result of parsing one details text
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Compounds(Vec<CompoundEntry>),
    /// the record has no details text
    NoDetails,
    /// the text only documents the protein drop
    NoReservoirClause,
}

/// counts of a batch parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub parsed: usize,
    pub no_details: usize,
    pub no_reservoir_clause: usize,
    /// records left alone because their details do not contain the search string
    pub skipped: usize,
}

impl BatchSummary {
    fn of(outcome: &ParseOutcome) -> Self {
        let mut summary = Self::default();
        match outcome {
            ParseOutcome::Compounds(_) => summary.parsed = 1,
            ParseOutcome::NoDetails => summary.no_details = 1,
            ParseOutcome::NoReservoirClause => summary.no_reservoir_clause = 1,
        }
        summary
    }

    fn skipped() -> Self {
        Self {
            skipped: 1,
            ..Self::default()
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            parsed: self.parsed + other.parsed,
            no_details: self.no_details + other.no_details,
            no_reservoir_clause: self.no_reservoir_clause + other.no_reservoir_clause,
            skipped: self.skipped + other.skipped,
        }
    }
}

/// Parser of crystallization details over a fixed set of tables.
/// It never writes to the tables, so one parser can be shared by all worker threads.
pub struct DetailsParser<'a> {
    tables: &'a ParserTables,
}

impl<'a> DetailsParser<'a> {
    pub fn new(tables: &'a ParserTables) -> Self {
        Self { tables }
    }

    /// details text -> ordered (compound, concentration) pairs
    pub fn parse_details(&self, details: Option<&str>) -> ParseOutcome {
        let Some(details) = details else {
            return ParseOutcome::NoDetails;
        };
        let text = preprocess(details, self.tables);
        if text == ERROR_SENTINEL {
            return ParseOutcome::NoReservoirClause;
        }
        let tokens = tokenize(&text);
        trace!("tokens: {:?}", tokens);
        let (tokens, order) = normalize(tokens, self.tables);
        match extract(&tokens, order, &self.tables.stop_words) {
            Some(compounds) => ParseOutcome::Compounds(compounds),
            None => ParseOutcome::NoReservoirClause,
        }
    }

    /// Parses the details of `record` into its compound list. The list is cleared when
    /// there is nothing to parse.
    pub fn parse_record(&self, record: &mut Record) -> ParseOutcome {
        let outcome = self.parse_details(record.details.as_deref());
        record.compounds = match &outcome {
            ParseOutcome::Compounds(compounds) => compounds.clone(),
            ParseOutcome::NoDetails | ParseOutcome::NoReservoirClause => {
                debug!("record {}: {:?}", record.id, outcome);
                Vec::new()
            }
        };
        outcome
    }

    /// Re-parses a batch in parallel. With `search`, only the records whose details contain
    /// it (ignoring case) are parsed.
    pub fn parse_all(&self, records: &mut [Record], search: Option<&str>) -> BatchSummary {
        let search = search.map(str::to_lowercase);
        let total = records.len();
        let done = AtomicUsize::new(0);
        info!("parsing details of {} records", total);
        let summary = records
            .par_iter_mut()
            .map(|record| {
                let selected = search.as_deref().is_none_or(|needle| {
                    record
                        .details
                        .as_deref()
                        .is_some_and(|details| details.to_lowercase().contains(needle))
                });
                let summary = if selected {
                    BatchSummary::of(&self.parse_record(record))
                } else {
                    BatchSummary::skipped()
                };
                let done = done.fetch_add(1, Ordering::Relaxed) + 1;
                if done % PROGRESS_STEP == 0 {
                    info!("{} of {} records parsed", done, total);
                }
                summary
            })
            .reduce(BatchSummary::default, BatchSummary::merge);
        info!(
            "parsing done: {} parsed, {} without details, {} without reservoir clause, {} skipped",
            summary.parsed, summary.no_details, summary.no_reservoir_clause, summary.skipped
        );
        summary
    }
}
