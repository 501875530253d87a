use std::collections::BTreeMap;

use crate::ConfigError;

/// Weighted keyword table: priority rank (lower wins) to keyword substring.
///
/// Entries are kept in a `BTreeMap`, so matching always scans in ascending rank
/// order and the first hit is reproducible across runs. Keywords are stored
/// lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordLexicon {
    entries: BTreeMap<u32, String>,
}

impl KeywordLexicon {
    pub fn new<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (rank, keyword) in entries {
            let keyword = keyword.into().to_lowercase();
            if keyword.is_empty() {
                return Err(ConfigError::InvalidLexicon(format!(
                    "keyword for rank {rank} is empty"
                )));
            }
            if map.insert(rank, keyword).is_some() {
                return Err(ConfigError::InvalidLexicon(format!(
                    "rank {rank} appears more than once"
                )));
            }
        }
        if map.is_empty() {
            return Err(ConfigError::InvalidLexicon("no keywords".into()));
        }
        Ok(Self { entries: map })
    }

    /// Portuguese store-locator keywords.
    pub fn portuguese() -> Self {
        Self::from_static(&[(1, "loj"), (2, "contact")])
    }

    /// English store-locator keywords.
    pub fn english() -> Self {
        Self::from_static(&[(1, "shop"), (2, "contact")])
    }

    fn from_static(entries: &[(u32, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(rank, keyword)| (*rank, keyword.to_string()))
                .collect(),
        }
    }

    /// Rank of the first keyword (in ascending rank order) contained in `text`,
    /// compared case-insensitively. Empty text never matches.
    pub fn match_text(&self, text: &str) -> Option<u32> {
        if text.is_empty() {
            return None;
        }
        let normalized = text.to_lowercase();
        self.entries
            .iter()
            .find(|(_, keyword)| normalized.contains(keyword.as_str()))
            .map(|(rank, _)| *rank)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(rank, kw)| (*rank, kw.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_valid() {
        for lexicon in [KeywordLexicon::portuguese(), KeywordLexicon::english()] {
            let rebuilt = KeywordLexicon::new(lexicon.iter()).expect("valid");
            assert_eq!(rebuilt, lexicon);
        }
    }

    #[test]
    fn keywords_are_lowercased_on_construction() {
        let lexicon = KeywordLexicon::new([(3, "SHOP")]).unwrap();
        assert_eq!(lexicon.iter().collect::<Vec<_>>(), vec![(3, "shop")]);
        assert_eq!(lexicon.match_text("shopping"), Some(3));
    }
}
