//! Character n-gram feature encoding.
//!
//! A canonical domain is turned into the sequence of vocabulary indices of its
//! character n-grams (sliding window, stride 1, order of occurrence kept).
//!
//! Index 0 is shared by "n-gram not in the vocabulary" and left padding; the
//! vocabulary file's first row gets index 1.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Read;

use crate::config::UNKNOWN_INDEX;

/// Column holding the n-grams in a vocabulary file.
const VOCAB_COLUMN: &str = "vocab";

/// Mapping from n-gram to feature index, ordered by training-corpus frequency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    index: HashMap<String, i64>,
}

impl Vocabulary {
    /// Builds a vocabulary from n-grams listed most frequent first.
    ///
    /// The first n-gram gets index 1. A repeated n-gram keeps its first index.
    pub fn from_ngrams<I, S>(ngrams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = HashMap::new();
        let mut next = UNKNOWN_INDEX + 1;
        for ngram in ngrams {
            index.entry(ngram.into()).or_insert_with(|| {
                let i = next;
                next += 1;
                i
            });
        }
        Self { index }
    }

    /// Reads a vocabulary file: CSV with a `vocab` column, most frequent first.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let position = reader
            .headers()
            .context("Failed to read vocabulary header")?
            .iter()
            .position(|h| h == VOCAB_COLUMN)
            .ok_or_else(|| anyhow::anyhow!("Vocabulary file has no `{}` column", VOCAB_COLUMN))?;

        let mut ngrams = Vec::new();
        for record in reader.records() {
            let record = record.context("Failed to read vocabulary row")?;
            if let Some(ngram) = record.get(position) {
                ngrams.push(ngram.to_string());
            }
        }

        log::debug!("Loaded vocabulary with {} n-grams", ngrams.len());
        Ok(Self::from_ngrams(ngrams))
    }

    /// Index of an n-gram, or `UNKNOWN_INDEX` when absent.
    pub fn index_of(&self, ngram: &str) -> i64 {
        self.index.get(ngram).copied().unwrap_or(UNKNOWN_INDEX)
    }

    /// Size of the index space, including the reserved unknown index.
    ///
    /// Every encoded value lies in `[0, len())`.
    pub fn len(&self) -> usize {
        self.index.len() + 1
    }

    /// Returns true when no n-gram is known.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Contiguous character n-grams of `text`, in order of occurrence.
///
/// Text shorter than `n` (and `n == 0`) yields no n-grams.
pub fn ngrams(text: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

/// Encodes a canonical domain as vocabulary indices, before padding.
///
/// An empty domain (the normalizer's "no match" sentinel) encodes to an empty
/// sequence, which padding turns into an all-unknown feature vector.
pub fn encode(domain: &str, vocabulary: &Vocabulary, n: usize) -> Vec<i64> {
    ngrams(domain, n)
        .iter()
        .map(|gram| vocabulary.index_of(gram))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ngrams_sliding_window() {
        assert_eq!(ngrams("abcd", 2), vec!["ab", "bc", "cd"]);
        assert_eq!(ngrams("abcd", 3), vec!["abc", "bcd"]);
    }

    #[test]
    fn test_ngrams_shorter_than_n() {
        assert!(ngrams("a", 2).is_empty());
        assert!(ngrams("", 2).is_empty());
        assert!(ngrams("abc", 0).is_empty());
    }

    #[test]
    fn test_ngrams_are_character_based() {
        assert_eq!(ngrams("ñé.", 2), vec!["ñé", "é."]);
    }

    #[test]
    fn test_encode_reserves_zero_for_unknown() {
        let vocab = Vocabulary::from_ngrams(["ab", "bc"]);
        assert_eq!(encode("abc", &vocab, 2), vec![1, 2]);
        assert_eq!(encode("abx", &vocab, 2), vec![1, 0]);
    }

    #[test]
    fn test_encode_keeps_order_of_occurrence() {
        let vocab = Vocabulary::from_ngrams(["co", "om", "m.", ".c"]);
        assert_eq!(encode("com.com", &vocab, 2), vec![1, 2, 3, 4, 1, 2]);
    }

    #[test]
    fn test_encode_empty_domain() {
        let vocab = Vocabulary::from_ngrams(["ab"]);
        assert!(encode("", &vocab, 2).is_empty());
        assert!(encode("a", &vocab, 2).is_empty());
    }

    #[test]
    fn test_vocabulary_len_includes_unknown() {
        let vocab = Vocabulary::from_ngrams(["ab", "bc", "ab"]);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.index_of("ab"), 1);
        assert_eq!(vocab.index_of("zz"), UNKNOWN_INDEX);
        assert!(Vocabulary::default().is_empty());
    }

    #[test]
    fn test_read_csv_vocabulary() {
        let data = "vocab\nom\nco\n.c\n";
        let vocab = Vocabulary::read_csv(data.as_bytes()).expect("valid vocabulary");
        assert_eq!(vocab.index_of("om"), 1);
        assert_eq!(vocab.index_of("co"), 2);
        assert_eq!(vocab.index_of(".c"), 3);
    }

    #[test]
    fn test_read_csv_vocabulary_extra_columns() {
        let data = "count,vocab\n10,ab\n5,bc\n";
        let vocab = Vocabulary::read_csv(data.as_bytes()).expect("valid vocabulary");
        assert_eq!(vocab.index_of("bc"), 2);
    }

    #[test]
    fn test_read_csv_vocabulary_missing_column() {
        let result = Vocabulary::read_csv("ngram\nab\n".as_bytes());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("vocab"));
    }
}
