/// Compound dictionary: canonical keys mapped to canonical display names, with the
/// closure maintenance pass and once-per-key curation decisions
pub mod compound_dictionary;
/// named mixtures and their constituent fractions
pub mod mixtures;
/// ordered literal substitutions applied to details text before tokenization
pub mod replacement;
/// English and domain stop words; "m" and "am" are never stop words
pub mod stop_words;
/// eng
/// Read-only bundle of every table the details parser needs:
/// 1) compound dictionary and mixture dictionary
/// 2) stop words
/// 3) case-sensitive and lowercase replacement tables
/// 4) curated unknown and error lists
/// 5) parser configuration
/// The bundle is loaded once from the JSON files named in the tables configuration
pub mod tables;
