use crate::Crystallization::parser_config::ParserConfig;
use crate::Crystallization::predicates::{
    average_range_with_suffix, format_value, is_compound, is_concentration, is_number,
    is_percent, is_polymer_token, is_qualifier, parse_number,
};
use crate::Dictionaries::compound_dictionary::{CompoundDictionary, canonical_key};
use crate::Dictionaries::stop_words::StopWords;
use crate::Dictionaries::tables::ParserTables;
use log::{trace, warn};

/// bound on the rewrites of one pass
const MAX_REWRITES: usize = 100_000;

/// polymer prefixes as written in lowercased details and their canonical spelling
const POLYMER_PREFIXES: [(&str, &str); 2] = [("mpeg", "MPEG"), ("peg", "PEG")];

/// Which side of its compound a concentration is written on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcentrationOrder {
    /// "0.1 m tris"
    #[default]
    Before,
    /// "tris 0.1 m"
    After,
}

/// `remove` tokens starting at `start` are replaced with `insert`
struct Edit {
    start: usize,
    remove: usize,
    insert: Vec<String>,
}

impl Edit {
    fn replace(start: usize, remove: usize, insert: Vec<String>) -> Self {
        Self {
            start,
            remove,
            insert,
        }
    }

    fn delete(start: usize, remove: usize) -> Self {
        Self::replace(start, remove, Vec::new())
    }
}

/// Applies `rule` at the first position where it matches and rescans from the start,
/// until no position matches
fn rewrite_to_fixpoint<F>(pass: &str, mut tokens: Vec<String>, rule: F) -> Vec<String>
where
    F: Fn(&[String], usize) -> Option<Edit>,
{
    let mut rewrites = 0;
    'scan: loop {
        for j in 0..tokens.len() {
            if let Some(edit) = rule(&tokens, j) {
                let end = (edit.start + edit.remove).min(tokens.len());
                tokens.splice(edit.start..end, edit.insert);
                rewrites += 1;
                if rewrites >= MAX_REWRITES {
                    warn!("{} pass stopped after {} rewrites: {:?}", pass, rewrites, tokens);
                    break 'scan;
                }
                continue 'scan;
            }
        }
        break;
    }
    tokens
}

fn traced(pass: &str, tokens: Vec<String>) -> Vec<String> {
    trace!("{}: {:?}", pass, tokens);
    tokens
}

/// Runs every pass in order. Returns the normalized tokens and the concentration order
/// found just before stop words are removed.
pub fn normalize(tokens: Vec<String>, tables: &ParserTables) -> (Vec<String>, ConcentrationOrder) {
    let stop_words = &tables.stop_words;
    let config = &tables.config;
    let tokens = traced("comma repair", repair_comma_numbers(tokens));
    let tokens = traced("micromolar", fuse_micromolar(tokens));
    let tokens = traced("pH", strip_ph(tokens));
    let tokens = traced("temperature", strip_temperature(tokens, config));
    let tokens = traced("numbered compounds", fuse_numbered_compounds(tokens, config));
    let tokens = traced("PEG/MPEG", normalize_polymers(tokens, stop_words));
    let tokens = traced("number periods", strip_number_periods(tokens));
    let tokens = traced("hyphen ranges", fuse_hyphen_ranges(tokens));
    let tokens = traced("range averaging", average_ranges(tokens));
    let tokens = traced("temperature", strip_temperature(tokens, config));
    let tokens = traced("units", canonicalize_units(tokens));
    let tokens = traced("trailing punctuation", trim_trailing_punctuation(tokens));
    let tokens = traced("compound phrases", fuse_compound_phrases(tokens, stop_words));
    let tokens = traced("compound periods", strip_compound_periods(tokens, stop_words));
    let tokens = traced("number w/v", fuse_number_qualifier(tokens));
    let tokens = traced(
        "percent compound w/v",
        fuse_percent_compound_qualifier(tokens, stop_words),
    );
    let order = concentration_order(&tokens, stop_words, &tables.dictionary);
    trace!("concentration order: {:?}", order);
    let tokens = remove_stop_words(tokens, stop_words);
    // stop words at the end may have hidden trailing commas
    let tokens = traced("stop words", trim_trailing_punctuation(tokens));
    (tokens, order)
}

/// "6000,10" -> "6000" "," "10"; "0,1m" -> "0" "," "1" "m".
/// Digit grouping ("1,000") is left alone.
pub fn repair_comma_numbers(tokens: Vec<String>) -> Vec<String> {
    rewrite_to_fixpoint("comma repair", tokens, |tokens, j| {
        let token = tokens[j].as_str();
        if !token.contains(',') || !is_number(&token.replace(['%', 'm', 'k'], "")) {
            return None;
        }
        let (first, second) = token.split_once(',')?;
        if first.is_empty() || second.is_empty() || second.contains(',') {
            return None;
        }
        if second.len() == 3 && first.len() <= 3 && !second.contains('.') {
            return None;
        }
        let mut insert = vec![first.to_string(), ",".to_string()];
        if second.len() > 2 && second.ends_with("mm") {
            insert.push(second[..second.len() - 2].to_string());
            insert.push("mm".to_string());
        } else if let Some((body, unit)) = second
            .strip_suffix('m')
            .map(|body| (body, "m"))
            .or_else(|| second.strip_suffix('%').map(|body| (body, "%")))
            .filter(|(body, _)| !body.is_empty())
        {
            insert.push(body.to_string());
            insert.push(unit.to_string());
        } else {
            insert.push(second.to_string());
        }
        Some(Edit::replace(j, 1, insert))
    })
}

/// "35" "um" -> "35um"
pub fn fuse_micromolar(tokens: Vec<String>) -> Vec<String> {
    rewrite_to_fixpoint("micromolar", tokens, |tokens, j| {
        if j == 0 || tokens[j] != "um" || !is_number(&tokens[j - 1]) {
            return None;
        }
        Some(Edit::replace(j - 1, 2, vec![format!("{}um", tokens[j - 1])]))
    })
}

/// removes "ph" "7.5", "ph7.5" and "ph" "=" "7.5"
pub fn strip_ph(tokens: Vec<String>) -> Vec<String> {
    rewrite_to_fixpoint("pH", tokens, |tokens, j| {
        let token = tokens[j].as_str();
        let next = tokens.get(j + 1).map(String::as_str);
        if token == "ph" && next.is_some_and(is_number) {
            return Some(Edit::delete(j, 2));
        }
        if token.len() > 2 {
            if let Some(value) = token.strip_prefix("ph") {
                if is_number(&value.replace(['=', ' '], "")) {
                    return Some(Edit::delete(j, 1));
                }
            }
        }
        if token == "ph" && next == Some("=") && tokens.get(j + 2).is_some_and(|t| is_number(t)) {
            return Some(Edit::delete(j, 3));
        }
        None
    })
}

/// Removes kelvin temperatures: a "k"-suffixed number longer than 3 characters or written
/// after a temperature word, and a number between 200 and 400 followed by a "k" token
pub fn strip_temperature(tokens: Vec<String>, config: &ParserConfig) -> Vec<String> {
    rewrite_to_fixpoint("temperature", tokens, |tokens, j| {
        let token = tokens[j].as_str();
        if let Some(value) = token.strip_suffix('k') {
            let after_temperature_word = j > 0 && config.is_temperature_word(&tokens[j - 1]);
            if is_number(value) && (token.len() > 3 || after_temperature_word) {
                return Some(Edit::delete(j, 1));
            }
        }
        if token == "k" && j > 0 {
            if let Some(kelvin) = parse_number(&tokens[j - 1]) {
                if kelvin > 200.0 && kelvin < 400.0 {
                    return Some(Edit::delete(j - 1, 2));
                }
            }
        }
        None
    })
}

/// "jeffamine" "600" -> "jeffamine 600"
pub fn fuse_numbered_compounds(tokens: Vec<String>, config: &ParserConfig) -> Vec<String> {
    rewrite_to_fixpoint("numbered compounds", tokens, |tokens, j| {
        let next = tokens.get(j + 1)?;
        if config.is_numbered_compound(&tokens[j]) && is_number(next) {
            Some(Edit::replace(j, 2, vec![format!("{} {}", tokens[j], next)]))
        } else {
            None
        }
    })
}

/// canonical prefix and the rest of a lowercase polymer token; "pegylated" is not a polymer
fn polymer_prefix(token: &str) -> Option<(&'static str, &str)> {
    for (prefix, name) in POLYMER_PREFIXES {
        if let Some(rest) = token.strip_prefix(prefix) {
            let grade_follows = rest
                .chars()
                .next()
                .is_none_or(|c| c.is_ascii_digit() || c == '-');
            return grade_follows.then_some((name, rest));
        }
    }
    None
}

/// "3,350" -> "3350", "4k" -> "4000", "-400" -> "400"
fn polymer_grade(raw: &str) -> String {
    let grade: String = raw.chars().filter(|c| *c != ',' && *c != '-').collect();
    grade
        .replace("000k", "000")
        .replace('k', "000")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn polymer_name(name: &str, monomethyl: bool, grade: &str) -> String {
    let (grade, monomethyl) = match grade.strip_suffix("mme") {
        Some(body) => (body.trim(), true),
        None => (grade, monomethyl),
    };
    match (monomethyl, grade.is_empty()) {
        (true, true) => format!("{} MME", name),
        (true, false) => format!("{} MME {}", name, grade),
        (false, true) => name.to_string(),
        (false, false) => format!("{} {}", name, grade),
    }
}

/// Rewrites polyethylene glycol tokens to "PEG <grade>", "MPEG <grade>" or "PEG MME <grade>":
/// "peg3350", "peg" "3350", "peg" "mme" "550", "peg" "5000" "mme", "peg3350" "mme", "mpeg" "5000".
/// A stop word right after the prefix is dropped.
pub fn normalize_polymers(tokens: Vec<String>, stop_words: &StopWords) -> Vec<String> {
    rewrite_to_fixpoint("PEG/MPEG", tokens, |tokens, j| {
        let (name, rest) = polymer_prefix(&tokens[j])?;
        let next = tokens.get(j + 1).map(String::as_str);
        let after_next = tokens.get(j + 2).map(String::as_str);
        if next.is_some_and(|t| stop_words.contains(t)) {
            return Some(Edit::delete(j + 1, 1));
        }
        if !rest.is_empty() {
            let monomethyl = next == Some("mme");
            let consumed = if monomethyl { 2 } else { 1 };
            let polymer = polymer_name(name, monomethyl, &polymer_grade(rest));
            return Some(Edit::replace(j, consumed, vec![polymer]));
        }
        let is_grade = |t: &str| !stop_words.contains(t) && is_number(&t.replace('k', "000"));
        if matches!(next, Some("mme") | Some("monomethyl")) {
            // "peg monomethyl ether 2000"
            let (grade, consumed) = if after_next == Some("ether") {
                (tokens.get(j + 3).map(String::as_str), 3)
            } else {
                (after_next, 2)
            };
            let polymer = match grade.filter(|g| is_grade(*g)) {
                Some(grade) => {
                    let polymer = polymer_name(name, true, &polymer_grade(grade));
                    return Some(Edit::replace(j, consumed + 1, vec![polymer]));
                }
                None => polymer_name(name, true, ""),
            };
            return Some(Edit::replace(j, consumed, vec![polymer]));
        }
        if let Some(grade) = next.filter(|t| is_grade(*t)) {
            let monomethyl = after_next == Some("mme");
            let consumed = if monomethyl { 3 } else { 2 };
            let polymer = polymer_name(name, monomethyl, &polymer_grade(grade));
            return Some(Edit::replace(j, consumed, vec![polymer]));
        }
        Some(Edit::replace(j, 1, vec![polymer_name(name, false, "")]))
    })
}

/// "5." -> "5"
pub fn strip_number_periods(tokens: Vec<String>) -> Vec<String> {
    tokens
        .into_iter()
        .map(|t| {
            if t.ends_with('.') && is_number(&t) {
                t[..t.len() - 1].to_string()
            } else {
                t
            }
        })
        .collect()
}

fn is_range_end(token: &str) -> bool {
    is_number(token)
        || ["mm", "m", "%"]
            .iter()
            .any(|unit| token.strip_suffix(*unit).is_some_and(is_number))
}

/// "20" "-" "25mm" -> "20-25mm", kept as written for range averaging
pub fn fuse_hyphen_ranges(tokens: Vec<String>) -> Vec<String> {
    rewrite_to_fixpoint("hyphen ranges", tokens, |tokens, j| {
        if j == 0 || tokens[j] != "-" {
            return None;
        }
        let right = tokens.get(j + 1)?;
        if is_number(&tokens[j - 1]) && is_range_end(right) {
            Some(Edit::replace(
                j - 1,
                3,
                vec![format!("{}-{}", tokens[j - 1], right)],
            ))
        } else {
            None
        }
    })
}

/// "20-25" -> "22.5"; "0.1-0.2m" -> "0.15" "m"; "20%-25%" -> "22.5" "%"
pub fn average_ranges(tokens: Vec<String>) -> Vec<String> {
    let mut averaged = Vec::with_capacity(tokens.len());
    for token in tokens {
        let range = average_range_with_suffix(&token).map(|(mean, unit)| (mean, unit.to_string()));
        match range {
            Some((mean, unit)) => {
                averaged.push(format_value(mean));
                if !unit.is_empty() {
                    averaged.push(unit);
                }
            }
            None => averaged.push(token),
        }
    }
    averaged
}

/// Brings every concentration to millimolar or percent:
/// "0.1m"/"0.1" "m" -> "100.0", "50mm"/"50" "mm" -> "50", "5um" -> "0.005",
/// "20" "%" -> "20%", "20" "%" "w/v" -> "20% w/v"
pub fn canonicalize_units(tokens: Vec<String>) -> Vec<String> {
    rewrite_to_fixpoint("units", tokens, |tokens, j| {
        let token = tokens[j].as_str();
        if let Some(value) = token.strip_suffix("mm").filter(|v| is_number(v)) {
            return Some(Edit::replace(j, 1, vec![value.replace(',', "")]));
        }
        if let Some(molar) = token.strip_suffix('m').and_then(parse_number) {
            return Some(Edit::replace(j, 1, vec![format_value(molar * 1000.0)]));
        }
        if let Some(micromolar) = token.strip_suffix("um").and_then(parse_number) {
            return Some(Edit::replace(j, 1, vec![format_value(micromolar / 1000.0)]));
        }
        if !is_number(token) {
            return None;
        }
        match tokens.get(j + 1).map(String::as_str) {
            Some("m") => parse_number(token)
                .map(|molar| Edit::replace(j, 2, vec![format_value(molar * 1000.0)])),
            Some("mm") => Some(Edit::replace(j, 2, vec![token.replace(',', "")])),
            Some("%") => match tokens.get(j + 2).filter(|q| is_qualifier(q)) {
                Some(qualifier) => Some(Edit::replace(
                    j,
                    3,
                    vec![format!("{}% {}", token, qualifier)],
                )),
                None => Some(Edit::replace(j, 2, vec![format!("{}%", token)])),
            },
            _ => None,
        }
    })
}

/// drops the tail of the sequence when it holds only commas and periods
pub fn trim_trailing_punctuation(mut tokens: Vec<String>) -> Vec<String> {
    let keep = tokens
        .iter()
        .rposition(|t| t != "," && t != ".")
        .map_or(0, |last| last + 1);
    tokens.truncate(keep);
    tokens
}

/// "sodium" "chloride" -> "sodium chloride". PEG/MPEG tokens are never fused.
pub fn fuse_compound_phrases(tokens: Vec<String>, stop_words: &StopWords) -> Vec<String> {
    let fusible = |t: &str| is_compound(t, stop_words) && !is_polymer_token(t);
    rewrite_to_fixpoint("compound phrases", tokens, |tokens, j| {
        if !fusible(tokens[j].as_str()) || !tokens.get(j + 1).is_some_and(|t| fusible(t.as_str())) {
            return None;
        }
        let end = tokens[j..]
            .iter()
            .position(|t| !fusible(t.as_str()))
            .map_or(tokens.len(), |offset| j + offset);
        Some(Edit::replace(j, end - j, vec![tokens[j..end].join(" ")]))
    })
}

/// abbreviation dots are taken out of compound tokens: "na. citrate" -> "na citrate"
pub fn strip_compound_periods(tokens: Vec<String>, stop_words: &StopWords) -> Vec<String> {
    tokens
        .into_iter()
        .map(|t| {
            if t.contains('.') && is_compound(&t, stop_words) {
                t.replace('.', "")
            } else {
                t
            }
        })
        .filter(|t| !t.is_empty())
        .collect()
}

/// "20" "w/v" -> "20% w/v"
pub fn fuse_number_qualifier(tokens: Vec<String>) -> Vec<String> {
    rewrite_to_fixpoint("number w/v", tokens, |tokens, j| {
        let qualifier = tokens.get(j + 1)?;
        (is_number(&tokens[j]) && is_qualifier(qualifier)).then(|| {
            Edit::replace(j, 2, vec![format!("{}% {}", tokens[j], qualifier)])
        })
    })
}

/// "20%" "PEG 4000" "w/v" -> "20% w/v" "PEG 4000"
pub fn fuse_percent_compound_qualifier(tokens: Vec<String>, stop_words: &StopWords) -> Vec<String> {
    rewrite_to_fixpoint("percent compound w/v", tokens, |tokens, j| {
        let percent = tokens.get(j)?;
        let compound = tokens.get(j + 1)?;
        let qualifier = tokens.get(j + 2)?;
        let bare_percent = percent.ends_with('%') && is_percent(percent);
        (bare_percent && is_compound(compound, stop_words) && is_qualifier(qualifier)).then(|| {
            Edit::replace(
                j,
                3,
                vec![format!("{} {}", percent, qualifier), compound.clone()],
            )
        })
    })
}

/// The first concentration written right next to a compound the dictionary knows decides
/// the order; without one, concentrations come first
pub fn concentration_order(
    tokens: &[String],
    stop_words: &StopWords,
    dictionary: &CompoundDictionary,
) -> ConcentrationOrder {
    let known = |t: &str| is_compound(t, stop_words) && dictionary.contains_key(&canonical_key(t));
    for pair in tokens.windows(2) {
        if is_concentration(&pair[0]) && known(pair[1].as_str()) {
            return ConcentrationOrder::Before;
        }
        if is_concentration(&pair[1]) && known(pair[0].as_str()) {
            return ConcentrationOrder::After;
        }
    }
    ConcentrationOrder::default()
}

/// Drops stop words. A run of stop words that separated two compound tokens leaves a ","
/// behind, so the two are never fused into one name later.
pub fn remove_stop_words(tokens: Vec<String>, stop_words: &StopWords) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(tokens.len());
    let mut after_stop_word = false;
    for token in tokens {
        if stop_words.contains(&token) {
            after_stop_word = true;
            continue;
        }
        let separates_compounds = after_stop_word
            && is_compound(&token, stop_words)
            && kept.last().is_some_and(|prev| is_compound(prev, stop_words));
        if separates_compounds {
            kept.push(",".to_string());
        }
        after_stop_word = false;
        kept.push(token);
    }
    kept
}
