use crate::Crystallization::parser_config::ParserConfig;
use crate::Crystallization::predicates::ERROR_SENTINEL;
use crate::Dictionaries::tables::ParserTables;
use log::{debug, trace};
use regex::Regex;
use std::sync::OnceLock;

static WORD_COMMA_NUMBER: OnceLock<Regex> = OnceLock::new();

fn word_comma_number() -> &'static Regex {
    WORD_COMMA_NUMBER
        .get_or_init(|| Regex::new(r"(\p{L}),(\d)").expect("valid word-comma-number pattern"))
}

/// Cleans a raw details string for the tokenizer. Returns `ERROR_SENTINEL` when the
/// text only documents the protein drop.
pub fn preprocess(details: &str, tables: &ParserTables) -> String {
    let text = space_after_word_commas(details);
    trace!("spaces after commas: {}", text);
    let text = tables.sensitive_replacements.apply(&text);
    let text = tables.lowercase_replacements.apply(&text.to_lowercase());
    trace!("replacements: {}", text);
    let text = truncate_post_crystallization(&text, &tables.config);
    match isolate_reservoir_clause(text, &tables.config) {
        Some(clause) => {
            trace!("reservoir clause: {}", clause);
            clause.to_string()
        }
        None => {
            debug!("no reservoir clause in '{}'", details);
            ERROR_SENTINEL.to_string()
        }
    }
}

/// "sodium acetate,4% peg4k" -> "sodium acetate, 4% peg4k"
pub fn space_after_word_commas(text: &str) -> String {
    word_comma_number().replace_all(text, "$1, $2").into_owned()
}

/// drops everything from the first cryoprotection/soaking marker on
pub fn truncate_post_crystallization<'a>(text: &'a str, config: &ParserConfig) -> &'a str {
    match earliest(text, &config.post_crystallization_markers) {
        Some(position) => &text[..position],
        None => text,
    }
}

/// Keeps the reservoir recipe when the text documents it. Returns None when there is no
/// reservoir marker and the text opens with the protein drop recipe.
pub fn isolate_reservoir_clause<'a>(text: &'a str, config: &ParserConfig) -> Option<&'a str> {
    match earliest(text, &config.reservoir_markers) {
        Some(position) => {
            let clause = &text[position..];
            match earliest(clause, &config.protein_markers) {
                Some(end) => Some(&clause[..end]),
                None => Some(clause),
            }
        }
        None => {
            let opens_with_protein = config
                .protein_markers
                .iter()
                .any(|marker| text.trim_start().starts_with(marker.as_str()));
            if opens_with_protein { None } else { Some(text) }
        }
    }
}

/// position of the first occurrence of any marker
fn earliest(text: &str, markers: &[String]) -> Option<usize> {
    markers
        .iter()
        .filter(|marker| !marker.is_empty())
        .filter_map(|marker| text.find(marker.as_str()))
        .min()
}
