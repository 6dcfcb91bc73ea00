use log::{trace, warn};

/// A pattern may carry this sequence to keep it apart from an otherwise identical key
/// of the JSON object; it is taken out of the pattern before matching
pub const IGNORED_SEQUENCE: &str = "$*";

/// Ordered literal substitutions applied to the details text before tokenization.
/// Order matters: later patterns may rely on earlier ones having fired.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplacementTable {
    entries: Vec<(String, String)>,
}

impl ReplacementTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut table = Self::new();
        for (pattern, replacement) in pairs {
            table.push(pattern, replacement);
        }
        table
    }

    pub fn push(&mut self, pattern: &str, replacement: &str) {
        self.entries
            .push((pattern.to_string(), replacement.to_string()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// applies every substitution in table order; plain substring replacement, no regex
    pub fn apply(&self, text: &str) -> String {
        let mut text = text.to_string();
        for (pattern, replacement) in &self.entries {
            let pattern = pattern.replace(IGNORED_SEQUENCE, "");
            if pattern.is_empty() {
                warn!("empty replacement pattern skipped (replacement '{}')", replacement);
                continue;
            }
            if text.contains(&pattern) {
                text = text.replace(&pattern, replacement);
                trace!("replaced '{}' with '{}': {}", pattern, replacement, text);
            }
        }
        text
    }
}
