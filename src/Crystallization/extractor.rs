use crate::Crystallization::normalization::ConcentrationOrder;
use crate::Crystallization::predicates::{
    ERROR_SENTINEL, is_compound, is_concentration, is_qualifier,
};
use crate::Crystallization::record::CompoundEntry;
use crate::Dictionaries::stop_words::StopWords;
use log::trace;

/// Pairs every compound token with the concentration written on the side given by `order`.
/// A compound with no concentration next to it is kept with `None`.
/// Returns None for the error sentinel.
pub fn extract(
    tokens: &[String],
    order: ConcentrationOrder,
    stop_words: &StopWords,
) -> Option<Vec<CompoundEntry>> {
    if tokens.first().is_some_and(|t| t == ERROR_SENTINEL) {
        return None;
    }
    let mut compounds = Vec::new();
    for (j, token) in tokens.iter().enumerate() {
        if !is_compound(token, stop_words) {
            continue;
        }
        let concentration = match order {
            ConcentrationOrder::Before => j
                .checked_sub(1)
                .map(|previous| &tokens[previous])
                .filter(|t| is_concentration(t))
                .map(|percent| with_trailing_qualifier(percent, tokens.get(j + 1))),
            ConcentrationOrder::After => tokens
                .get(j + 1)
                .filter(|t| is_concentration(t))
                .cloned(),
        };
        trace!("pair: {} {:?}", token, concentration);
        compounds.push(CompoundEntry {
            name: token.clone(),
            concentration,
        });
    }
    Some(compounds)
}

/// "20%" "PEG 4000" "w/v" pairs PEG 4000 with "20% w/v"
fn with_trailing_qualifier(concentration: &str, after_compound: Option<&String>) -> String {
    let qualified = concentration.ends_with("w/v") || concentration.ends_with("v/v");
    match after_compound.filter(|q| is_qualifier(q)) {
        Some(qualifier) if concentration.contains('%') && !qualified => {
            format!("{} {}", concentration, qualifier)
        }
        _ => concentration.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_concentrations_before() {
        let stop_words = StopWords::empty();
        let pairs = extract(
            &tokens(&["100.0", "sodium chloride", ",", "20%", "PEG 4000", "glycerol"]),
            ConcentrationOrder::Before,
            &stop_words,
        )
        .unwrap();
        assert_eq!(
            pairs,
            vec![
                CompoundEntry::new("sodium chloride", Some("100.0")),
                CompoundEntry::new("PEG 4000", Some("20%")),
                CompoundEntry::new("glycerol", None),
            ]
        );
    }

    #[test]
    fn test_concentrations_after() {
        let stop_words = StopWords::empty();
        let pairs = extract(
            &tokens(&["tris", "50", ",", "sodium chloride", "100.0"]),
            ConcentrationOrder::After,
            &stop_words,
        )
        .unwrap();
        assert_eq!(
            pairs,
            vec![
                CompoundEntry::new("tris", Some("50")),
                CompoundEntry::new("sodium chloride", Some("100.0")),
            ]
        );
    }

    #[test]
    fn test_trailing_qualifier_is_folded() {
        let stop_words = StopWords::empty();
        let pairs = extract(
            &tokens(&["20%", "PEG 4000", "w/v"]),
            ConcentrationOrder::Before,
            &stop_words,
        )
        .unwrap();
        assert_eq!(pairs, vec![CompoundEntry::new("PEG 4000", Some("20% w/v"))]);
    }

    #[test]
    fn test_sentinel_and_empty() {
        let stop_words = StopWords::empty();
        assert_eq!(
            extract(&tokens(&[ERROR_SENTINEL]), ConcentrationOrder::Before, &stop_words),
            None
        );
        assert_eq!(
            extract(&[], ConcentrationOrder::Before, &stop_words),
            Some(Vec::new())
        );
    }
}
