//! Token classifiers used by the normalization passes and by the extractor.
//!
//! The passes and the extractor must agree on what a compound token is, so all of
//! them go through the functions of this module and nothing else.
//! None of the classifiers fails: a token that does not parse simply does not match.
use crate::Dictionaries::stop_words::StopWords;

/// Marker put in place of the details text when no reservoir clause can be isolated
pub const ERROR_SENTINEL: &str = "ERROR";
/// weight/volume and volume/volume qualifiers of percent concentrations
pub const QUALIFIERS: [&str; 2] = ["w/v", "v/v"];
const PUNCTUATION: [&str; 5] = [",", ".", ":", ";", "-"];

/// true if the token, with digit-grouping commas removed, parses as a float
pub fn is_number(token: &str) -> bool {
    parse_number(token).is_some()
}

/// parses a token as a float ignoring digit-grouping commas
pub fn parse_number(token: &str) -> Option<f64> {
    token.replace(',', "").parse::<f64>().ok()
}

/// "20%", "20% w/v", "5%v/v"
pub fn is_percent(token: &str) -> bool {
    if (token.ends_with("w/v") || token.ends_with("v/v")) && token.contains('%') {
        return true;
    }
    match token.strip_suffix('%') {
        Some(body) if !body.is_empty() => body.parse::<f64>().is_ok(),
        _ => false,
    }
}

pub fn is_concentration(token: &str) -> bool {
    is_number(token) || is_percent(token)
}

pub fn is_qualifier(token: &str) -> bool {
    QUALIFIERS.contains(&token)
}

/// A token that can be (a part of) a compound name: not a concentration, not punctuation,
/// not a w/v qualifier, not the error sentinel and not a stop word
pub fn is_compound(token: &str, stop_words: &StopWords) -> bool {
    !token.is_empty()
        && !is_concentration(token)
        && !PUNCTUATION.contains(&token)
        && !is_qualifier(token)
        && token != ERROR_SENTINEL
        && !stop_words.contains(token)
}

/// Tokens produced by the PEG/MPEG pass ("PEG 4000", "MPEG 5000", "PEG MME 550", "PEG").
/// They are complete names and must never be fused with their neighbours.
pub fn is_polymer_token(token: &str) -> bool {
    token == "PEG" || token == "MPEG" || token.starts_with("PEG ") || token.starts_with("MPEG ")
}

/// Mean of a hyphen-separated numeric range: "20-25" -> 22.5.
/// Returns None when the token has no hyphen or one of the parts is not a number
pub fn average_range(token: &str) -> Option<f64> {
    if !token.contains('-') {
        return None;
    }
    let numbers = token
        .split('-')
        .map(parse_number)
        .collect::<Option<Vec<f64>>>()?;
    Some(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

/// Tries `average_range` on the whole token, then with its last character and then its
/// last two characters taken off as a unit suffix ("%", "m", "mm").
/// The suffix is also taken off every part of the range, so "20%-25%" averages to
/// (22.5, "%"). Returns the mean and the suffix that was stripped.
pub fn average_range_with_suffix(token: &str) -> Option<(f64, &str)> {
    for suffix_len in 0..=2 {
        let Some((body, suffix)) = split_tail(token, suffix_len) else {
            break;
        };
        if suffix.contains('-') {
            continue;
        }
        if !body.contains('-') {
            continue;
        }
        let parts: Vec<&str> = body.split('-').collect();
        let last = parts.len() - 1;
        // the last part already lost its suffix with the split
        let numbers = parts
            .iter()
            .enumerate()
            .map(|(i, part)| {
                let part = if i < last && !suffix.is_empty() {
                    part.strip_suffix(suffix).unwrap_or(part)
                } else {
                    part
                };
                parse_number(part)
            })
            .collect::<Option<Vec<f64>>>();
        if let Some(numbers) = numbers {
            let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
            return Some((mean, suffix));
        }
    }
    None
}

/// splits off the last `n` characters of a token
pub fn split_tail(token: &str, n: usize) -> Option<(&str, &str)> {
    if n == 0 {
        return Some((token, ""));
    }
    let (index, _) = token.char_indices().rev().nth(n - 1)?;
    Some(token.split_at(index))
}

/// Formats a computed value the way concentrations are stored: shortest round-trip
/// representation that always carries a fractional part ("100.0", "22.5", "0.005")
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_is_number() {
        assert!(is_number("0.1"));
        assert!(is_number("1,000"));
        assert!(is_number("5."));
        assert!(is_number(".5"));
        assert!(!is_number("5m"));
        assert!(!is_number(""));
        assert!(!is_number("-"));
        assert!(!is_number("20%"));
    }

    #[test]
    fn test_is_percent() {
        assert!(is_percent("20%"));
        assert!(is_percent("20% w/v"));
        assert!(is_percent("12.5%v/v"));
        assert!(!is_percent("%"));
        assert!(!is_percent("w/v"));
        assert!(!is_percent("abc%"));
        assert!(!is_percent("20"));
    }

    #[test]
    fn test_is_compound() {
        let stop_words = StopWords::from_list(&["and", "with"]);
        assert!(is_compound("tris", &stop_words));
        assert!(is_compound("sodium chloride", &stop_words));
        assert!(!is_compound("and", &stop_words));
        assert!(!is_compound("100.0", &stop_words));
        assert!(!is_compound("20%", &stop_words));
        assert!(!is_compound(",", &stop_words));
        assert!(!is_compound("-", &stop_words));
        assert!(!is_compound("w/v", &stop_words));
        assert!(!is_compound(ERROR_SENTINEL, &stop_words));
    }

    #[test]
    fn test_polymer_token() {
        assert!(is_polymer_token("PEG 3350"));
        assert!(is_polymer_token("MPEG 5000"));
        assert!(is_polymer_token("PEG"));
        assert!(!is_polymer_token("peg"));
        assert!(!is_polymer_token("PEGylated"));
    }

    #[test]
    fn test_average_range() {
        assert_relative_eq!(average_range("20-25").unwrap(), 22.5);
        assert_relative_eq!(average_range("1-2-3").unwrap(), 2.0);
        assert_eq!(average_range("20"), None);
        assert_eq!(average_range("-5"), None);
        assert_eq!(average_range("bis-tris"), None);
        assert_eq!(average_range("20%-25%"), None);
    }

    #[test]
    fn test_average_range_with_suffix() {
        let (mean, suffix) = average_range_with_suffix("20-25").unwrap();
        assert_relative_eq!(mean, 22.5);
        assert_eq!(suffix, "");

        let (mean, suffix) = average_range_with_suffix("20%-25%").unwrap();
        assert_relative_eq!(mean, 22.5);
        assert_eq!(suffix, "%");

        let (mean, suffix) = average_range_with_suffix("0.1-0.2m").unwrap();
        assert_relative_eq!(mean, 0.15, epsilon = 1e-12);
        assert_eq!(suffix, "m");

        let (mean, suffix) = average_range_with_suffix("10-20mm").unwrap();
        assert_relative_eq!(mean, 15.0);
        assert_eq!(suffix, "mm");

        assert_eq!(average_range_with_suffix("2-methyl-2,4-pentanediol"), None);
    }

    #[test]
    fn test_split_tail() {
        assert_eq!(split_tail("50mm", 2), Some(("50", "mm")));
        assert_eq!(split_tail("50", 0), Some(("50", "")));
        assert_eq!(split_tail("5µ", 1), Some(("5", "µ")));
        assert_eq!(split_tail("m", 2), None);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.1 * 1000.0), "100.0");
        assert_eq!(format_value(22.5), "22.5");
        assert_eq!(format_value(5.0 / 1000.0), "0.005");
    }
}
