//! Stop words of the details parser
//!
//! NLTK English stop words plus domain noise words (units, lab vocabulary) that never take part
//! in a compound name. "m" (molar) and "am" (ammonium) are short English stop words too, but
//! here they carry meaning, so they are kept out of the set whatever the configuration says.
use std::collections::HashSet;
use stop_words::{LANGUAGE, get};

/// tokens that are never stop words
pub const PROTECTED_TOKENS: [&str; 2] = ["m", "am"];

/// domain words added to the English list when no curated stop-word file is given
pub const DOMAIN_STOP_WORDS: &[&str] = &[
    "reservoir", "resevoir", "solution", "protein", "well", "drop", "drops", "mixed",
    "containing", "contained", "using", "used", "method", "vapor", "vapour", "diffusion",
    "hanging", "sitting", "equilibrated", "against", "crystals", "crystal", "grown",
    "obtained", "mg/ml", "ml", "ul", "microliter", "microliters", "volume", "volumes",
    "equal", "buffer", "temperature", "room", "plus", "final", "concentration",
];

/// A set of stop words
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// empty set, nothing is filtered
    pub fn empty() -> Self {
        Self {
            words: HashSet::new(),
        }
    }

    /// NLTK English stop words (the `nltk` feature of `stop-words`) plus `DOMAIN_STOP_WORDS`.
    /// The larger ISO list holds element and unit abbreviations ("na", "mg", "mm") and must
    /// not be used here.
    pub fn english() -> Self {
        let mut stop_words = Self::empty();
        let english: Vec<String> = get(LANGUAGE::English)
            .iter()
            .map(|s| s.to_string())
            .collect();
        stop_words.extend(english);
        stop_words.extend(DOMAIN_STOP_WORDS.iter().map(|s| s.to_string()));
        stop_words
    }

    pub fn from_list(words: &[&str]) -> Self {
        let mut stop_words = Self::empty();
        stop_words.extend(words.iter().map(|s| s.to_string()));
        stop_words
    }

    /// adds words (lowercased); protected tokens are silently skipped
    pub fn extend<I: IntoIterator<Item = String>>(&mut self, words: I) {
        for word in words {
            let word = word.to_lowercase();
            if PROTECTED_TOKENS.contains(&word.as_str()) {
                continue;
            }
            self.words.insert(word);
        }
    }

    pub fn with_extra<I: IntoIterator<Item = String>>(mut self, words: I) -> Self {
        self.extend(words);
        self
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
