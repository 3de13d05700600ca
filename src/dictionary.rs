//! English word list with spelling suggestions
//!
//! Suggestions use the symmetric delete approach: every dictionary word is
//! indexed under all strings reachable from it by deleting up to
//! `max_edit_distance` characters. A misspelling is looked up by generating its
//! own deletes, and every hit is verified with an optimal string alignment
//! distance. Only the first [`PREFIX_LENGTH`] characters of a word are indexed,
//! which keeps the index small for full system word lists.
//!
//! Regular inflections of listed words (plurals, past tenses, `-ing`, `-er`,
//! `-est`, `-ly` and possessives) are recognized without being listed.

use crate::error::{RelayError, RelayResult};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Word list compiled into the binary, most common words first
const BUNDLED_WORDS: &str = include_str!("../data/words.txt");

/// System word lists tried, in order, before falling back to the bundled one
pub const SYSTEM_WORD_LISTS: &[&str] = &[
    "/usr/share/dict/british-english",
    "/usr/share/dict/words",
];

/// Number of leading characters indexed for suggestions
pub const PREFIX_LENGTH: usize = 7;

#[derive(Debug, Clone)]
pub struct Dictionary {
    /// Words in rank order; the position is the word's id
    words: Vec<String>,
    index: HashMap<String, usize>,
    /// Delete variant → ids of the words it was generated from
    deletes: HashMap<String, Vec<usize>>,
    max_edit_distance: usize,
}

impl Dictionary {
    pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 2;

    /// The bundled English word list
    pub fn bundled() -> Self {
        Self::bundled_with_distance(Self::DEFAULT_MAX_EDIT_DISTANCE)
    }

    pub fn bundled_with_distance(max_edit_distance: usize) -> Self {
        Self::parse(BUNDLED_WORDS, max_edit_distance)
    }

    /// The first readable list among `paths`, or the bundled list
    pub fn first_available<P: AsRef<Path>>(paths: &[P], max_edit_distance: usize) -> Self {
        for path in paths {
            match Self::from_file(path, max_edit_distance) {
                Ok(dictionary) => {
                    info!(
                        path = %path.as_ref().display(),
                        words = dictionary.len(),
                        "Loaded word list"
                    );
                    return dictionary;
                }
                Err(err) => debug!(error = %err, "Word list unavailable"),
            }
        }
        info!("Using bundled word list");
        Self::bundled_with_distance(max_edit_distance)
    }

    /// The system British English list when installed, else the bundled one
    pub fn system_or_bundled(max_edit_distance: usize) -> Self {
        Self::first_available(SYSTEM_WORD_LISTS, max_edit_distance)
    }

    /// Load a newline-separated word list, e.g. `/usr/share/dict/words`
    pub fn from_file(path: impl AsRef<Path>, max_edit_distance: usize) -> RelayResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RelayError::DictionaryError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let dictionary = Self::parse(&text, max_edit_distance);
        if dictionary.is_empty() {
            return Err(RelayError::DictionaryError(format!(
                "No usable words in {}",
                path.display()
            )));
        }
        Ok(dictionary)
    }

    /// Parse a word list. Blank lines and `#` comments are skipped, words are
    /// lowercased, and entries with characters other than letters, `'` and `-`
    /// are ignored.
    pub fn parse(text: &str, max_edit_distance: usize) -> Self {
        let words = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));
        Self::from_words(words, max_edit_distance)
    }

    pub fn from_words<I, S>(words: I, max_edit_distance: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Self {
            words: Vec::new(),
            index: HashMap::new(),
            deletes: HashMap::new(),
            max_edit_distance,
        };
        for word in words {
            dictionary.add_word(word.as_ref());
        }
        dictionary
    }

    fn add_word(&mut self, word: &str) {
        let word = word.to_lowercase();
        if !is_dictionary_form(&word) || self.index.contains_key(&word) {
            return;
        }

        let id = self.words.len();
        for variant in delete_variants(prefix(&word), self.max_edit_distance) {
            self.deletes.entry(variant).or_default().push(id);
        }
        self.index.insert(word.clone(), id);
        self.words.push(word);
    }

    /// Whether `word` is listed verbatim
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Whether `word` is listed or is a regular inflection of a listed word
    pub fn recognizes(&self, word: &str) -> bool {
        self.contains(word) || stem_candidates(word).iter().any(|stem| self.contains(stem))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn max_edit_distance(&self) -> usize {
        self.max_edit_distance
    }

    /// Dictionary words within `max_edit_distance` of `word`, best first
    ///
    /// Ordering: edit distance, then (for single edits) transposition, omitted
    /// letter, extra letter, substitution, then dictionary rank.
    pub fn suggestions(&self, word: &str) -> Vec<String> {
        if word.is_empty() {
            return Vec::new();
        }

        let input: Vec<char> = word.chars().collect();
        let mut seen = HashSet::new();
        let mut ranked = Vec::new();

        for variant in delete_variants(prefix(word), self.max_edit_distance) {
            let Some(ids) = self.deletes.get(&variant) else {
                continue;
            };
            for &id in ids {
                if !seen.insert(id) {
                    continue;
                }
                let candidate: Vec<char> = self.words[id].chars().collect();
                let distance = osa_distance(&input, &candidate);
                if distance > self.max_edit_distance {
                    continue;
                }
                let class = if distance == 1 {
                    edit_class(&input, &candidate)
                } else {
                    0
                };
                ranked.push((distance, class, id));
            }
        }

        ranked.sort_unstable();
        ranked
            .into_iter()
            .map(|(_, _, id)| self.words[id].clone())
            .collect()
    }
}

fn is_dictionary_form(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_lowercase())
        && word
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == '\'' || c == '-')
}

fn prefix(word: &str) -> &str {
    match word.char_indices().nth(PREFIX_LENGTH) {
        Some((end, _)) => &word[..end],
        None => word,
    }
}

/// Possible base forms of `word` under regular English inflection
fn stem_candidates(word: &str) -> Vec<String> {
    const MIN_STEM: usize = 2;

    let mut stems = Vec::new();
    let mut push = |stem: &str, restore: &str| {
        if stem.chars().count() >= MIN_STEM {
            stems.push(format!("{}{}", stem, restore));
        }
    };

    if let Some(stem) = word.strip_suffix("'s") {
        push(stem, "");
    }
    if let Some(stem) = word.strip_suffix("ies") {
        push(stem, "y");
    }
    if let Some(stem) = word.strip_suffix("es") {
        push(stem, "");
    }
    if let Some(stem) = word.strip_suffix('s') {
        if !stem.ends_with('s') {
            push(stem, "");
        }
    }
    if let Some(stem) = word.strip_suffix("ily") {
        push(stem, "y");
    }
    if let Some(stem) = word.strip_suffix("ly") {
        push(stem, "");
    }
    for suffix in ["ied", "ier", "iest"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            push(stem, "y");
        }
    }
    for suffix in ["ed", "ing", "er", "est"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            push(stem, "");
            push(stem, "e");
            if let Some(single) = undouble(stem) {
                push(single, "");
            }
        }
    }
    stems
}

/// `stem` without its final letter when it ends in a doubled consonant
fn undouble(stem: &str) -> Option<&str> {
    let mut tail = stem.chars().rev();
    let (last, before) = (tail.next()?, tail.next()?);
    (last == before && !"aeiou".contains(last)).then(|| &stem[..stem.len() - last.len_utf8()])
}

/// All strings reachable from `word` by deleting up to `max_distance` chars,
/// including `word` itself
fn delete_variants(word: &str, max_distance: usize) -> HashSet<String> {
    let mut variants = HashSet::new();
    variants.insert(word.to_string());

    let mut frontier = vec![word.chars().collect::<Vec<char>>()];
    for _ in 0..max_distance {
        let mut next = Vec::new();
        for chars in &frontier {
            for i in 0..chars.len() {
                let mut shorter = chars.clone();
                shorter.remove(i);
                if variants.insert(shorter.iter().collect()) {
                    next.push(shorter);
                }
            }
        }
        frontier = next;
    }
    variants
}

/// Optimal string alignment distance (Levenshtein plus adjacent transpositions)
fn osa_distance(a: &[char], b: &[char]) -> usize {
    let (n, m) = (a.len(), b.len());
    let mut d = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        d[0][j] = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            d[i][j] = (d[i - 1][j] + 1)
                .min(d[i][j - 1] + 1)
                .min(d[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                d[i][j] = d[i][j].min(d[i - 2][j - 2] + 1);
            }
        }
    }
    d[n][m]
}

/// Kind of a single edit turning `input` into `candidate`, lower is likelier
fn edit_class(input: &[char], candidate: &[char]) -> u8 {
    use std::cmp::Ordering;

    match candidate.len().cmp(&input.len()) {
        Ordering::Greater => 1,
        Ordering::Less => 2,
        Ordering::Equal => {
            let diffs: Vec<usize> = (0..input.len())
                .filter(|&i| input[i] != candidate[i])
                .collect();
            let swapped = diffs.len() == 2
                && diffs[1] == diffs[0] + 1
                && input[diffs[0]] == candidate[diffs[1]]
                && input[diffs[1]] == candidate[diffs[0]];
            if swapped { 0 } else { 3 }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_osa_distance() {
        assert_eq!(osa_distance(&chars("hello"), &chars("hello")), 0);
        assert_eq!(osa_distance(&chars("helo"), &chars("hello")), 1);
        assert_eq!(osa_distance(&chars("wrold"), &chars("world")), 1);
        assert_eq!(osa_distance(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(osa_distance(&chars(""), &chars("abc")), 3);
    }

    #[test]
    fn test_delete_variants() {
        let variants = delete_variants("abc", 1);
        let expected: HashSet<String> = ["abc", "bc", "ac", "ab"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(variants, expected);
        assert!(delete_variants("abc", 2).contains("a"));
    }

    #[test]
    fn test_edit_class_ordering() {
        assert_eq!(edit_class(&chars("wrold"), &chars("world")), 0);
        assert_eq!(edit_class(&chars("helo"), &chars("hello")), 1);
        assert_eq!(edit_class(&chars("helllo"), &chars("hello")), 2);
        assert_eq!(edit_class(&chars("helo"), &chars("help")), 3);
    }

    #[test]
    fn test_from_words_filters_and_lowercases() {
        let dictionary = Dictionary::from_words(["Hello", "world", "r2d2", "don't", "hello"], 1);
        assert_eq!(dictionary.len(), 3);
        assert!(dictionary.contains("hello"));
        assert!(dictionary.contains("don't"));
        assert!(!dictionary.contains("r2d2"));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let dictionary = Dictionary::parse("# header\n\nhello\n  world  \n", 1);
        assert_eq!(dictionary.len(), 2);
        assert!(dictionary.contains("world"));
    }

    #[test]
    fn test_suggestions_prefer_omitted_letter_over_substitution() {
        let dictionary = Dictionary::from_words(["help", "held", "hello"], 2);
        assert_eq!(dictionary.suggestions("helo")[0], "hello");
    }

    #[test]
    fn test_suggestions_prefer_transposition() {
        let dictionary = Dictionary::from_words(["would", "word", "world"], 2);
        assert_eq!(dictionary.suggestions("wrold")[0], "world");
    }

    #[test]
    fn test_suggestions_fall_back_to_rank() {
        let dictionary = Dictionary::from_words(["cat", "cot", "cut"], 1);
        assert_eq!(dictionary.suggestions("cxt"), vec!["cat", "cot", "cut"]);
    }

    #[test]
    fn test_suggestions_respect_max_distance() {
        let dictionary = Dictionary::from_words(["translation"], 1);
        assert!(dictionary.suggestions("trnslatin").is_empty());
        assert!(dictionary.suggestions("").is_empty());
    }

    #[test]
    fn test_bundled_dictionary() {
        let dictionary = Dictionary::bundled();
        assert!(!dictionary.is_empty());
        assert!(dictionary.contains("hello"));
        assert!(dictionary.contains("world"));
        assert!(!dictionary.contains("helo"));
        assert_eq!(dictionary.suggestions("helo")[0], "hello");
        assert_eq!(dictionary.suggestions("wrold")[0], "world");
    }

    #[test]
    fn test_recognizes_regular_inflections() {
        let dictionary = Dictionary::from_words(
            ["cat", "house", "run", "translate", "city", "happy", "quick", "big", "carry", "box"],
            2,
        );
        for word in [
            "cats", "houses", "running", "translated", "cities", "happily", "quickly", "bigger",
            "biggest", "carried", "boxes", "cat's", "runs",
        ] {
            assert!(dictionary.recognizes(word), "{} should be recognized", word);
        }
        assert!(!dictionary.contains("cats"));
        assert!(!dictionary.recognizes("catz"));
        assert!(!dictionary.recognizes("s"));
        assert!(!dictionary.recognizes("ing"));
    }

    #[test]
    fn test_undouble() {
        assert_eq!(undouble("runn"), Some("run"));
        assert_eq!(undouble("stopp"), Some("stop"));
        assert_eq!(undouble("see"), None);
        assert_eq!(undouble("walk"), None);
    }

    #[test]
    fn test_long_words_indexed_by_prefix() {
        let dictionary = Dictionary::from_words(["translation", "international"], 2);
        assert_eq!(prefix("translation"), "transla");
        assert_eq!(dictionary.suggestions("translatoin")[0], "translation");
        assert_eq!(dictionary.suggestions("tarnslation")[0], "translation");
        assert_eq!(dictionary.suggestions("internatinal")[0], "international");
    }

    #[test]
    fn test_first_available_falls_back_to_bundled() {
        let dictionary = Dictionary::first_available(&["/nonexistent/british-english"], 2);
        assert_eq!(dictionary.len(), Dictionary::bundled().len());
        assert!(dictionary.contains("elephant"));
    }

    #[test]
    fn test_first_available_reads_list() {
        let path = std::env::temp_dir().join(format!("word-relay-list-{}.txt", std::process::id()));
        std::fs::write(&path, "aardvark\nzebra\n").unwrap();
        let dictionary = Dictionary::first_available(&[path.as_path()], 2);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(dictionary.len(), 2);
        assert!(dictionary.contains("aardvark"));
    }

    #[test]
    fn test_from_file_missing() {
        let result = Dictionary::from_file("/nonexistent/words.txt", 1);
        assert!(matches!(result, Err(RelayError::DictionaryError(_))));
    }
}
