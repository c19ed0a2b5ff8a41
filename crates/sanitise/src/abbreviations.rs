//! Textspeak abbreviation table.
//!
//! The table is parsed once from `TOKEN,expansion text` lines and never
//! changes afterwards. Lookups compare the uppercased token against the
//! uppercased keys, so `lol`, `Lol` and `LOL` all expand.
use std::collections::HashMap;

use tracing::debug;

/// Immutable mapping from uppercase token to its expansion phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbbreviationTable {
    entries: HashMap<String, String>,
}

impl AbbreviationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the contents of an abbreviation file.
    ///
    /// Lines without a comma, or with an empty token or expansion, are
    /// skipped. When a token is defined twice the first definition wins.
    ///
    /// ```rust
    /// use sanitise::AbbreviationTable;
    ///
    /// let table = AbbreviationTable::parse("LOL,Laughing out loud\nnot a row\nBRB,Be right back");
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.expand("lol"), Some("Laughing out loud"));
    /// ```
    pub fn parse(contents: &str) -> Self {
        let mut entries = HashMap::new();
        for (idx, line) in contents.lines().enumerate() {
            let Some((token, expansion)) = line.split_once(',') else {
                debug!(line = idx + 1, "abbreviation_line_skipped");
                continue;
            };
            let token = token.trim();
            let expansion = expansion.trim();
            if token.is_empty() || expansion.is_empty() {
                debug!(line = idx + 1, "abbreviation_line_skipped");
                continue;
            }
            entries
                .entry(token.to_uppercase())
                .or_insert_with(|| expansion.to_string());
        }
        Self { entries }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries = HashMap::new();
        for (token, expansion) in pairs {
            entries
                .entry(token.as_ref().to_uppercase())
                .or_insert_with(|| expansion.into());
        }
        Self { entries }
    }

    /// Expansion for an exact (case-insensitive) token match.
    pub fn expand(&self, token: &str) -> Option<&str> {
        if token.is_empty() {
            return None;
        }
        self.entries.get(&token.to_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
