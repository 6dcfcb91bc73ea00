/// Token classifiers shared by every stage of details parsing: numbers, percents,
/// concentrations, compound tokens, numeric ranges.
pub mod predicates;
/// Record of a deposited structure together with its extracted compound list
pub mod record;
/// error types of the details parser and name standardizer
pub mod crystal_errors;
/// marker phrases, numbered compounds and other tunables of the parser
pub mod parser_config;
/// eng
/// String-level rewrites of a raw crystallization details string before it is tokenized:
/// 1) a space is inserted after every "word,number" comma
/// 2) case-sensitive and case-insensitive replacement tables are applied
/// 3) everything after cryo/soaking instructions is dropped
/// 4) the reservoir clause is isolated when the text documents both the protein drop and the reservoir
pub mod preprocess;
/// Treebank-style splitter of preprocessed details into words, numbers and punctuation
pub mod tokenizer;
/// The ordered chain of token rewrites turning tokens into (compound, concentration) material.
/// Every pass is a pure function from a token sequence to a token sequence
/// and runs to its own fixpoint before the next one starts.
///
/// # Examples
/// ```
/// use crystal_details::Crystallization::normalization::normalize_polymers;
/// use crystal_details::Dictionaries::stop_words::StopWords;
/// let stop_words = StopWords::from_list(&["of"]);
/// let tokens = vec!["peg3350".to_string()];
/// assert_eq!(normalize_polymers(tokens, &stop_words), vec!["PEG 3350".to_string()]);
/// ```
pub mod normalization;
/// walks the normalized token stream and pairs every compound with its concentration
pub mod extractor;
/// eng
/// Maps extracted compound names through the compound dictionary. Dictionary values written as
/// "A / B" denote several compounds and are expanded into one pair per compound; values that name
/// a mixture are expanded into their constituents with concentrations scaled by the constituent fraction.
/// Names the dictionary does not know yet are reported as `UnresolvedCompound` events
pub mod standardizer;
/// whole-record and whole-batch entry points
///
///  # Examples
/// ```
/// use crystal_details::Crystallization::parse_details::{DetailsParser, ParseOutcome};
/// use crystal_details::Crystallization::record::CompoundEntry;
/// use crystal_details::Dictionaries::tables::ParserTables;
/// let tables = ParserTables::empty();
/// let parser = DetailsParser::new(&tables);
/// let outcome = parser.parse_details(Some("0.1 M sodium chloride, 20% PEG4000"));
/// assert_eq!(
///     outcome,
///     ParseOutcome::Compounds(vec![
///         CompoundEntry::new("sodium chloride", Some("100.0")),
///         CompoundEntry::new("PEG 4000", Some("20%")),
///     ])
/// );
/// ```
pub mod parse_details;
