use serde::{Deserialize, Serialize};

/// Tunables of the details parser. Every field has a default so a partial JSON
/// section in the tables configuration file is enough.
///
/// # Fields
/// * `post_crystallization_markers` - phrases after which the text only describes cryoprotection/soaking
/// * `reservoir_markers` - phrases opening the reservoir recipe
/// * `protein_markers` - phrases opening the protein drop recipe
/// * `numbered_compounds` - compounds written with a trailing number ("jeffamine 600")
/// * `temperature_words` - words after which a "k"-suffixed number is a temperature
/// * `max_expansion_depth` - bound on nested alternation/mixture expansions of one pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub post_crystallization_markers: Vec<String>,
    pub reservoir_markers: Vec<String>,
    pub protein_markers: Vec<String>,
    pub numbered_compounds: Vec<String>,
    pub temperature_words: Vec<String>,
    pub max_expansion_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            post_crystallization_markers: to_strings(&["cryo", "soak"]),
            reservoir_markers: to_strings(&[
                "reservoir solution",
                "resevoir solution",
                "reservoir buffer",
                "well solution",
                "precipitant solution",
                "crystallization solution",
                "reservoir cocktail",
                "crystallization cocktail",
                "precipitant cocktail",
                "well cocktail",
            ]),
            protein_markers: to_strings(&["protein solution", "protein buffer"]),
            numbered_compounds: to_strings(&["jeffamine", "propoxylate"]),
            temperature_words: to_strings(&["temperature", "temp"]),
            max_expansion_depth: 8,
        }
    }
}

impl ParserConfig {
    pub fn is_numbered_compound(&self, token: &str) -> bool {
        self.numbered_compounds.iter().any(|c| c == token)
    }

    pub fn is_temperature_word(&self, token: &str) -> bool {
        self.temperature_words.iter().any(|w| w == token)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
