//! Word cleansing, spelling correction and deduplication
//!
//! Turns the raw words of a request into the set of words worth translating.
//! Each word is lowercased and stripped of leading and trailing non-letters.
//! A word the dictionary recognizes, including regular inflections of listed
//! words, passes through unchanged. A misspelled word is replaced by its best
//! suggestion. Words that are still unrecognized are dropped, and duplicates
//! keep their first position.

use crate::dictionary::Dictionary;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

static EDGE_NON_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^a-zA-Z]+|[^a-zA-Z]+$").expect("valid edge regex"));

#[derive(Debug, Clone)]
pub struct WordNormalizer {
    dictionary: Arc<Dictionary>,
}

impl WordNormalizer {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self { dictionary }
    }

    /// Normalizer over the bundled English word list
    pub fn bundled() -> Self {
        Self::new(Arc::new(Dictionary::bundled()))
    }

    /// Normalizer over the system word list, falling back to the bundled one
    pub fn system_or_bundled() -> Self {
        Self::new(Arc::new(Dictionary::system_or_bundled(
            Dictionary::DEFAULT_MAX_EDIT_DISTANCE,
        )))
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Lowercase and strip leading/trailing non-letters: `"¡Hola!"` → `"hola"`
    pub fn cleanse(word: &str) -> String {
        EDGE_NON_LETTERS
            .replace_all(&word.to_lowercase(), "")
            .into_owned()
    }

    /// Cleanse and spell-correct a single word
    ///
    /// Returns `None` when the result is not a dictionary word.
    pub fn normalize_word(&self, word: &str) -> Option<String> {
        let cleaned = Self::cleanse(word);
        if cleaned.is_empty() {
            return None;
        }

        if self.dictionary.recognizes(&cleaned) {
            return Some(cleaned);
        }

        self.dictionary.suggestions(&cleaned).into_iter().next()
    }

    /// Normalize a batch, keeping first-occurrence order of the corrected words
    pub fn normalize<S: AsRef<str>>(&self, words: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        words
            .iter()
            .filter_map(|word| self.normalize_word(word.as_ref()))
            .filter(|word| seen.insert(word.clone()))
            .collect()
    }
}
