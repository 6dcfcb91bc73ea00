use crate::Crystallization::parser_config::ParserConfig;
use crate::Dictionaries::compound_dictionary::{CompoundDictionary, canonical_key};
use crate::Dictionaries::mixtures::MixtureDictionary;
use crate::Dictionaries::replacement::ReplacementTable;
use crate::Dictionaries::stop_words::StopWords;
use crate::Utils::load_from_file::{
    TablesError, load_compound_dictionary, load_mixtures, load_replacement_table,
    load_string_list,
};
use crate::library_manager::{TablesConfig, with_tables_manager};
use log::info;
use std::collections::HashSet;

/// Everything the parser and the standardizer read. Only the compound dictionary
/// is written during a batch (confirmed curation decisions and the closure pass).
#[derive(Debug, Default)]
pub struct ParserTables {
    pub dictionary: CompoundDictionary,
    pub mixtures: MixtureDictionary,
    pub stop_words: StopWords,
    pub sensitive_replacements: ReplacementTable,
    pub lowercase_replacements: ReplacementTable,
    /// canonical keys of compounds curated as unknown
    pub unknown_list: HashSet<String>,
    /// canonical keys of compounds curated as parsing errors
    pub error_list: HashSet<String>,
    pub config: ParserConfig,
}

impl ParserTables {
    /// No dictionary, no mixtures, no stop words, no replacements, default parser configuration
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_dictionary(mut self, dictionary: CompoundDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn with_mixtures(mut self, mixtures: MixtureDictionary) -> Self {
        self.mixtures = mixtures;
        self
    }

    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    pub fn with_replacements(
        mut self,
        sensitive: ReplacementTable,
        lowercase: ReplacementTable,
    ) -> Self {
        self.sensitive_replacements = sensitive;
        self.lowercase_replacements = lowercase;
        self
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads every table named in `config`. The stop words are the English list of the
    /// `stop-words` crate, the built-in domain words and the words of the stop-word file.
    pub fn load(config: &TablesConfig) -> Result<Self, TablesError> {
        let dictionary =
            CompoundDictionary::from_map(load_compound_dictionary(&config.compound_dictionary)?);
        let mixtures = load_mixtures(&config.mixtures)?;
        let stop_words = StopWords::english().with_extra(load_string_list(&config.stop_words)?);
        let sensitive_replacements = load_replacement_table(&config.sensitive_replacements)?;
        let lowercase_replacements = load_replacement_table(&config.lowercase_replacements)?;
        let unknown_list = to_key_set(load_string_list(&config.unknown_list)?);
        let error_list = to_key_set(load_string_list(&config.error_list)?);

        info!(
            "tables loaded: {} dictionary keys, {} mixtures, {} stop words, {}+{} replacements",
            dictionary.len(),
            mixtures.len(),
            stop_words.len(),
            sensitive_replacements.len(),
            lowercase_replacements.len()
        );
        Ok(Self {
            dictionary,
            mixtures,
            stop_words,
            sensitive_replacements,
            lowercase_replacements,
            unknown_list,
            error_list,
            config: config.parser.clone(),
        })
    }

    /// loads the tables configured in the global tables manager
    pub fn from_manager() -> Result<Self, TablesError> {
        let config = with_tables_manager(|manager| manager.get_config().clone());
        Self::load(&config)
    }
}

fn to_key_set(list: Vec<String>) -> HashSet<String> {
    list.iter().map(|entry| canonical_key(entry)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_load_all_tables() {
        let dir = tempfile::tempdir().unwrap();
        let config = TablesConfig {
            compound_dictionary: write(
                &dir,
                "dictionary.json",
                r#"{ "nacl": "Sodium chloride", "tris": "Tris" }"#,
            ),
            mixtures: write(
                &dir,
                "mixtures.json",
                r#"{ "MIB buffer": { "Sodium malonate": 0.4, "Imidazole": 0.3, "Boric acid": 0.3 } }"#,
            ),
            stop_words: write(&dir, "stop_words.json", r#"["drop", "m", "am"]"#),
            sensitive_replacements: write(&dir, "sensitive.json", r#"{ "PEG-": "PEG " }"#),
            lowercase_replacements: write(&dir, "lowercase.json", r#"{ "sodium chloride": "nacl" }"#),
            unknown_list: write(&dir, "unknown.json", r#"["Well Plate"]"#),
            error_list: write(&dir, "errors.json", r#"[]"#),
            parser: ParserConfig::default(),
        };

        let tables = ParserTables::load(&config).unwrap();
        assert_eq!(tables.dictionary.len(), 2);
        assert!(tables.mixtures.contains("MIB buffer"));
        assert!(tables.stop_words.contains("drop"));
        assert!(tables.stop_words.contains("the"));
        assert!(!tables.stop_words.contains("m"));
        assert!(!tables.stop_words.contains("am"));
        assert_eq!(tables.sensitive_replacements.len(), 1);
        assert_eq!(tables.lowercase_replacements.apply("sodium chloride"), "nacl");
        assert!(tables.unknown_list.contains("wellplate"));
        assert!(tables.error_list.is_empty());
    }

    #[test]
    fn test_missing_table_is_reported() {
        let config = TablesConfig {
            compound_dictionary: "no_such_dictionary.json".to_string(),
            ..TablesConfig::default()
        };
        assert!(matches!(
            ParserTables::load(&config),
            Err(TablesError::FileNotFound(_))
        ));
    }
}
