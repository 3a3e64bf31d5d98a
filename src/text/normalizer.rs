// Text normalizer: turns raw patent and abstract text into the token stream
// the embedding providers train on.
//
// The pipeline is: lowercase, split into `\w+` tokens, drop stopwords, join
// with single spaces. The stopword set and the tokenizer regex are owned by
// the normalizer, so tests can build one with a custom word list.

use std::collections::HashSet;

use anyhow::{Context, Result};
use regex_lite::Regex;
use stop_words::{get, LANGUAGE};

/// Word-character tokenizer pattern.
const TOKEN_PATTERN: &str = r"\w+";

/// Extra stopwords layered on top of the English list by default.
pub const DEFAULT_EXTRA_STOPWORDS: &[&str] = &["abstract"];

/// Leading token of abstracts that have no real text ("Null Text").
pub const NULL_MARKER: &str = "null";

/// Lowercases, tokenizes, and strips stopwords from text.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stopwords: HashSet<String>,
    tokenizer: Regex,
}

impl TextNormalizer {
    /// Build a normalizer from the English stopword list plus `extra` words.
    ///
    /// The null marker is never treated as a stopword; the loader relies on
    /// it surviving normalization.
    pub fn english(extra: &[String]) -> Result<Self> {
        let mut words: Vec<String> = get(LANGUAGE::English);
        words.retain(|w| w != NULL_MARKER);
        words.extend(extra.iter().cloned());
        Self::from_stopwords(words)
    }

    /// Build a normalizer from an explicit stopword list.
    pub fn from_stopwords<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stopwords = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        let tokenizer = Regex::new(TOKEN_PATTERN).context("Failed to compile token pattern")?;

        Ok(Self {
            stopwords,
            tokenizer,
        })
    }

    /// Normalize text into a space-separated string of non-stopword tokens.
    pub fn normalize(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = self
            .tokenizer
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|token| !self.stopwords.contains(*token))
            .collect();
        tokens.join(" ")
    }

    /// Check whether a (lowercase) word is in the stopword set.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }
}
