//! Word suggestions using Levenshtein distance
//!
//! Finger-spelled words are slow to enter and easy to get one letter wrong,
//! so the active word is matched against a word list: completions of the
//! prefix first, then near misses.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Small built-in list used when no dictionary file is configured
const DEFAULT_WORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "am", "and", "any", "are", "ask", "at",
    "back", "bad", "be", "because", "before", "big", "book", "but", "by", "call", "came",
    "can", "come", "could", "day", "did", "do", "does", "done", "down", "drink", "eat",
    "eight", "every", "family", "father", "find", "fine", "first", "five", "food", "for",
    "four", "friend", "from", "get", "give", "go", "good", "goodbye", "great", "had", "happy",
    "has", "have", "he", "hello", "help", "her", "here", "hi", "him", "his", "home", "how",
    "hungry", "i", "if", "in", "is", "it", "just", "know", "learn", "like", "little", "live",
    "look", "love", "make", "many", "me", "more", "morning", "mother", "much", "my", "name",
    "need", "never", "new", "nice", "night", "nine", "no", "not", "now", "of", "okay", "on",
    "one", "only", "or", "other", "our", "out", "over", "people", "please", "right", "said",
    "school", "see", "seven", "she", "sign", "six", "so", "some", "sorry", "stop", "take",
    "ten", "thank", "thanks", "that", "the", "them", "then", "there", "they", "think", "this",
    "three", "time", "to", "today", "tomorrow", "two", "understand", "up", "us", "use",
    "very", "want", "was", "water", "way", "we", "well", "what", "when", "where", "which",
    "who", "why", "will", "with", "word", "work", "would", "write", "yes", "yesterday", "you",
    "your",
];

/// Anything that can propose completions for a word prefix
pub trait SuggestionProvider {
    fn suggest(&self, prefix: &str) -> Vec<String>;
}

/// Suggestions from an in-memory word list
pub struct Dictionary {
    words: Vec<String>,
    max: usize,
}

impl Dictionary {
    pub fn new<I, S>(words: I, max: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| clean_for_matching(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        words.sort();
        words.dedup();
        Self { words, max }
    }

    pub fn builtin(max: usize) -> Self {
        Self::new(DEFAULT_WORDS.iter().copied(), max)
    }

    /// One word per line; blank lines and `#` comments ignored
    pub fn load(path: impl AsRef<Path>, max: usize) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading dictionary {}", path.display()))?;
        let words = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'));
        Ok(Self::new(words, max))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl SuggestionProvider for Dictionary {
    fn suggest(&self, prefix: &str) -> Vec<String> {
        let prefix = clean_for_matching(prefix);
        if prefix.is_empty() || self.max == 0 {
            return Vec::new();
        }

        // (is not a completion, edit distance, word)
        let mut ranked: Vec<(bool, usize, &str)> = self
            .words
            .iter()
            .filter_map(|w| {
                if w.starts_with(&prefix) {
                    Some((false, w.len() - prefix.len(), w.as_str()))
                } else if fuzzy_match(&prefix, w) {
                    Some((true, levenshtein(&prefix, w), w.as_str()))
                } else {
                    None
                }
            })
            .collect();
        ranked.sort();

        ranked
            .into_iter()
            .take(self.max)
            .map(|(_, _, w)| w.to_string())
            .collect()
    }
}

/// Fuzzy match using Levenshtein distance, allows ~30% errors
pub fn fuzzy_match(expected: &str, actual: &str) -> bool {
    if expected == actual {
        return true;
    }
    let max_dist = (expected.len() / 3).max(1);
    levenshtein(expected, actual) <= max_dist
}

/// Calculate Levenshtein distance between two strings
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        row[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            row[j] = (prev[j] + 1).min(row[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

/// Lowercase and keep letters only
pub fn clean_for_matching(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect()
}
