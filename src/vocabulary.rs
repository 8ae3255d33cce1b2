//! Vocabulary store: the fixed word list every recommendation draws from.
//!
//! The vocabulary is loaded once at startup from a line-delimited UTF-8 file
//! and never mutated afterwards. Row `i` of the store corresponds 1:1 to row
//! `i` of the embedding matrix built over it, so load order is significant.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading the vocabulary.
#[derive(Debug, thiserror::Error)]
pub enum VocabularyError {
    #[error("vocabulary file not found: {0:?}")]
    Missing(PathBuf),

    #[error("failed to read vocabulary file {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("vocabulary contains no words")]
    Empty,
}

/// Immutable, ordered word list with O(1) membership lookup.
///
/// Invariants: no duplicates, no blank entries, every word trimmed.
pub struct Vocabulary {
    /// Words in load order. The position of a word is its row in the
    /// embedding matrix.
    words: Vec<String>,
    /// Word -> row lookup.
    rows: HashMap<String, usize>,
}

impl Vocabulary {
    /// Load a vocabulary from a line-delimited file.
    ///
    /// Blank lines are skipped, surrounding whitespace is trimmed, and
    /// duplicate words keep their first occurrence.
    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(VocabularyError::Missing(path.to_path_buf()));
            }
            Err(err) => {
                return Err(VocabularyError::Unreadable {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        let vocabulary = Self::from_words(content.lines().map(str::to_string))?;
        log::info!(
            "loaded {} words from {}",
            vocabulary.len(),
            path.display()
        );
        Ok(vocabulary)
    }

    /// Build a vocabulary from an in-memory word sequence.
    ///
    /// Applies the same normalization as [`load`](Self::load).
    pub fn from_words(words: impl IntoIterator<Item = String>) -> Result<Self, VocabularyError> {
        let mut ordered = Vec::new();
        let mut rows = HashMap::new();
        let mut duplicates = 0usize;

        for word in words {
            let word = word.trim();
            if word.is_empty() {
                continue;
            }
            if rows.contains_key(word) {
                duplicates += 1;
                continue;
            }
            rows.insert(word.to_string(), ordered.len());
            ordered.push(word.to_string());
        }

        if duplicates > 0 {
            log::warn!("vocabulary contains {duplicates} duplicate words, keeping first occurrences");
        }

        if ordered.is_empty() {
            return Err(VocabularyError::Empty);
        }

        Ok(Self {
            words: ordered,
            rows,
        })
    }

    /// Number of words in the vocabulary. Always at least 1.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// All words in load order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The word stored at `row`, if in range.
    pub fn word(&self, row: usize) -> Option<&str> {
        self.words.get(row).map(String::as_str)
    }

    /// Exact-match membership test.
    pub fn contains(&self, word: &str) -> bool {
        self.rows.contains_key(word)
    }
}
