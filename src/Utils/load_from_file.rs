use crate::Dictionaries::mixtures::MixtureDictionary;
use crate::Dictionaries::replacement::ReplacementTable;
use log::{error, info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TablesError {
    #[error("File '{0}' does not exist")]
    FileNotFound(String),
    #[error("Failed to read or write '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Error parsing '{file}' at line {line}, column {column}: {message}")]
    Json {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("Invalid format of '{file}': {message}")]
    InvalidFormat { file: String, message: String },
}

pub struct LoadData {
    pub file_name: String,
}

impl LoadData {
    pub fn new(file_name: String) -> Self {
        LoadData { file_name }
    }
    pub fn load_compound_dictionary(&self) -> Result<HashMap<String, String>, TablesError> {
        load_compound_dictionary(&self.file_name)
    }
    pub fn load_mixtures(&self) -> Result<MixtureDictionary, TablesError> {
        load_mixtures(&self.file_name)
    }
    pub fn load_string_list(&self) -> Result<Vec<String>, TablesError> {
        load_string_list(&self.file_name)
    }
    pub fn load_replacement_table(&self) -> Result<ReplacementTable, TablesError> {
        load_replacement_table(&self.file_name)
    }
}

/// Reads a whole file as JSON. On a syntax error the offending line is logged
/// together with a pointer to the failing column.
pub fn read_json(file_name: &str) -> Result<Value, TablesError> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(TablesError::FileNotFound(file_name.to_string()));
    }
    let content = fs::read_to_string(path).map_err(|source| TablesError::Io {
        file: file_name.to_string(),
        source,
    })?;

    match serde_json::from_str::<Value>(&content) {
        Ok(value) => Ok(value),
        Err(e) => {
            let error_line = e.line();
            let error_column = e.column();
            let error_msg = format!(
                "Error parsing '{}' at line {}, column {}: {}",
                file_name, error_line, error_column, e
            );
            error!("{}", error_msg);

            // If possible, show the problematic line
            if let Some(problem_line) = content.lines().nth(error_line.saturating_sub(1)) {
                error!("Problematic line: {}", problem_line);
                if error_column >= 1 && error_column <= problem_line.len() + 1 {
                    let pointer = " ".repeat(error_column - 1) + "^";
                    error!("                  {}", pointer);
                }
            }

            Err(TablesError::Json {
                file: file_name.to_string(),
                line: error_line,
                column: error_column,
                message: e.to_string(),
            })
        }
    }
}

fn expect_object(
    file_name: &str,
    value: Value,
) -> Result<serde_json::Map<String, Value>, TablesError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(TablesError::InvalidFormat {
            file: file_name.to_string(),
            message: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Loads the compound dictionary `{ key: canonical name }`. Entries with a non-string
/// value are skipped with a warning.
pub fn load_compound_dictionary(file_name: &str) -> Result<HashMap<String, String>, TablesError> {
    let object = expect_object(file_name, read_json(file_name)?)?;
    let mut dictionary = HashMap::with_capacity(object.len());
    for (key, value) in object {
        match value {
            Value::String(name) => {
                dictionary.insert(key, name);
            }
            other => warn!(
                "Key '{}' in '{}' maps to {} instead of a compound name",
                key,
                file_name,
                json_kind(&other)
            ),
        }
    }
    if dictionary.is_empty() {
        warn!("Loaded compound dictionary '{}' is empty", file_name);
    }
    info!(
        "Successfully loaded {} compound names from '{}'",
        dictionary.len(),
        file_name
    );
    Ok(dictionary)
}

/// Loads `{ mixture: { constituent: fraction } }`
pub fn load_mixtures(file_name: &str) -> Result<MixtureDictionary, TablesError> {
    let object = expect_object(file_name, read_json(file_name)?)?;
    let (mixtures, rejected) = MixtureDictionary::from_json_object(&object);
    for name in rejected {
        warn!("Mixture entry '{}' in '{}' has invalid data format", name, file_name);
    }
    info!(
        "Successfully loaded {} mixtures from '{}'",
        mixtures.len(),
        file_name
    );
    Ok(mixtures)
}

/// Loads a JSON array of strings (stop words, unknown list, error list)
pub fn load_string_list(file_name: &str) -> Result<Vec<String>, TablesError> {
    let Value::Array(items) = read_json(file_name)? else {
        return Err(TablesError::InvalidFormat {
            file: file_name.to_string(),
            message: "expected a JSON array of strings".to_string(),
        });
    };
    let mut list = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => list.push(s),
            other => warn!(
                "Skipping {} in string list '{}'",
                json_kind(&other),
                file_name
            ),
        }
    }
    info!("Successfully loaded {} entries from '{}'", list.len(), file_name);
    Ok(list)
}

/// Loads an ordered replacement table `{ pattern: replacement }`; object order is table order
pub fn load_replacement_table(file_name: &str) -> Result<ReplacementTable, TablesError> {
    let object = expect_object(file_name, read_json(file_name)?)?;
    let mut table = ReplacementTable::new();
    for (pattern, replacement) in &object {
        match replacement.as_str() {
            Some(replacement) => table.push(pattern, replacement),
            None => {
                return Err(TablesError::InvalidFormat {
                    file: file_name.to_string(),
                    message: format!("replacement of '{}' is not a string", pattern),
                });
            }
        }
    }
    info!(
        "Successfully loaded {} replacements from '{}'",
        table.len(),
        file_name
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_compound_dictionary() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "{{").unwrap();
        writeln!(temp_file, "  \"nacl\": \"Sodium chloride\",").unwrap();
        writeln!(temp_file, "  \"broken\": 42,").unwrap();
        writeln!(temp_file, "  \"tris\": \"Tris\"").unwrap();
        writeln!(temp_file, "}}").unwrap();

        let file_path = temp_file.path().to_str().unwrap();
        let dictionary = LoadData::new(file_path.to_string())
            .load_compound_dictionary()
            .unwrap();
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary["nacl"], "Sodium chloride");
        assert!(!dictionary.contains_key("broken"));
    }

    #[test]
    fn test_file_not_found() {
        let result = load_string_list("non_existent_file.json");
        assert!(matches!(result, Err(TablesError::FileNotFound(_))));
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_invalid_json_reports_location() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "{{").unwrap();
        writeln!(temp_file, "  \"nacl\": \"Sodium chloride\"").unwrap();
        writeln!(temp_file, "  \"tris\": \"Tris\"").unwrap();
        writeln!(temp_file, "}}").unwrap();

        let file_path = temp_file.path().to_str().unwrap();
        match load_compound_dictionary(file_path) {
            Err(TablesError::Json { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected a JSON error, got {:?}", other),
        }
    }

    #[test]
    fn test_replacement_table_keeps_file_order() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"{{ "sodium chloride": "nacl", "nacl": "NaCl", "peg-$*": "peg " }}"#
        )
        .unwrap();

        let file_path = temp_file.path().to_str().unwrap();
        let table = load_replacement_table(file_path).unwrap();
        let patterns: Vec<&str> = table.entries().iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(patterns, vec!["sodium chloride", "nacl", "peg-$*"]);
        assert_eq!(table.apply("sodium chloride, peg-400"), "NaCl, peg 400");
    }

    #[test]
    fn test_wrong_shape_is_invalid_format() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"["not", "an", "object"]"#).unwrap();
        let file_path = temp_file.path().to_str().unwrap();
        assert!(matches!(
            load_mixtures(file_path),
            Err(TablesError::InvalidFormat { .. })
        ));

        let mut list_file = NamedTempFile::new().unwrap();
        writeln!(list_file, r#"["well", 3, "drop"]"#).unwrap();
        let list = load_string_list(list_file.path().to_str().unwrap()).unwrap();
        assert_eq!(list, vec!["well", "drop"]);
    }
}
