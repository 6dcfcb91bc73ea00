use crate::Crystallization::predicates::parse_number;
use regex::Regex;
use std::sync::OnceLock;

/// characters that always stand alone
static PADDED: OnceLock<Regex> = OnceLock::new();
/// brackets only separate tokens
static BRACKETS: OnceLock<Regex> = OnceLock::new();

fn padded() -> &'static Regex {
    PADDED.get_or_init(|| Regex::new(r#"[<>;@#$%&!?"]"#).expect("valid padding pattern"))
}

fn brackets() -> &'static Regex {
    BRACKETS.get_or_init(|| Regex::new(r"[()\[\]{}]").expect("valid bracket pattern"))
}

/// Splits preprocessed details into words, numbers and punctuation.
///
/// Brackets separate tokens and are dropped ("bis(2-hydroxyethyl)" -> "bis" "2-hydroxyethyl";
/// the dictionary key of the fused name is the same). Percent signs, semicolons and the like
/// are always separate tokens. Commas and colons are separate tokens unless a digit follows
/// them ("6000,10" stays one token for the comma repair pass). A trailing period is split
/// off a token unless the token is an integer written with a final period ("5.").
/// Hyphens, slashes, "=" and "+" stay inside tokens.
///
/// ```
/// use crystal_details::Crystallization::tokenizer::tokenize;
/// assert_eq!(
///     tokenize("0.1 m hepes, 20% w/v peg4000."),
///     vec!["0.1", "m", "hepes", ",", "20", "%", "w/v", "peg4000", "."]
/// );
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let text = brackets().replace_all(text, " ");
    let text = padded().replace_all(&text, " $0 ");
    let text = separate_commas(&text);
    let mut tokens = Vec::new();
    for word in text.split_whitespace() {
        match split_final_period(word) {
            Some(body) => {
                tokens.push(body.to_string());
                tokens.push(".".to_string());
            }
            None => tokens.push(word.to_string()),
        }
    }
    tokens
}

fn separate_commas(text: &str) -> String {
    let mut separated = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let followed_by_digit = chars.peek().is_some_and(|next| next.is_ascii_digit());
        if (c == ',' || c == ':') && !followed_by_digit {
            separated.push(' ');
            separated.push(c);
            separated.push(' ');
        } else {
            separated.push(c);
        }
    }
    separated
}

/// body of a token whose final period must become its own token
fn split_final_period(word: &str) -> Option<&str> {
    let body = word.strip_suffix('.')?;
    if body.is_empty() {
        return None;
    }
    if !body.contains('.') && parse_number(body).is_some() {
        return None;
    }
    Some(body)
}
