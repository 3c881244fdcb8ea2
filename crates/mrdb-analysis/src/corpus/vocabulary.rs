//! Shared term vocabulary and sparse count matrix.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::AnalysisError;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

/// Lowercased tokens of two or more word characters.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_RE.find_iter(text).map(|m| m.as_str().to_lowercase())
}

/// Document-frequency and size limits for the vocabulary.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VocabularyLimits {
    pub min_df: usize,
    pub max_df: f64,
    pub max_features: usize,
}

impl VocabularyLimits {
    /// The min-df floor actually applied to a corpus of `n_docs`. A floor
    /// above the max-df ceiling could never be met, so it is lowered to the
    /// ceiling (never below 1).
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub(crate) fn effective_min_df(&self, n_docs: usize) -> usize {
        let ceiling = (self.max_df * n_docs as f64).floor().max(1.0) as usize;
        self.min_df.min(ceiling)
    }

    #[allow(clippy::cast_precision_loss)]
    fn admits(&self, df: usize, n_docs: usize, min_df: usize) -> bool {
        df >= min_df && df as f64 <= self.max_df * n_docs as f64
    }
}

/// Terms indexed alphabetically.
#[derive(Debug, Clone, Default)]
pub(crate) struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    pub(crate) fn len(&self) -> usize {
        self.terms.len()
    }

    pub(crate) fn term(&self, index: usize) -> &str {
        &self.terms[index]
    }
}

/// One sparse row per document: `(term index, count)` sorted by index.
pub(crate) type CountRow = Vec<(usize, f64)>;

/// Build the vocabulary and count matrix over `docs`.
///
/// # Errors
///
/// Returns [`AnalysisError::CorpusFeature`] when the corpus is empty or no
/// term survives document-frequency pruning.
pub(crate) fn build(
    docs: &[&str],
    limits: VocabularyLimits,
) -> Result<(Vocabulary, Vec<CountRow>), AnalysisError> {
    if docs.is_empty() {
        return Err(AnalysisError::CorpusFeature {
            stage: "vocabulary",
            detail: "no documents with text".to_string(),
        });
    }

    let raw_counts: Vec<HashMap<String, usize>> = docs
        .iter()
        .map(|doc| {
            let mut counts = HashMap::new();
            for token in tokenize(doc) {
                *counts.entry(token).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    // term -> (document frequency, corpus frequency)
    let mut stats: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for counts in &raw_counts {
        for (term, &count) in counts {
            let entry = stats.entry(term.as_str()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += count;
        }
    }

    let n_docs = docs.len();
    let min_df = limits.effective_min_df(n_docs);
    let mut kept: Vec<(&str, usize)> = stats
        .into_iter()
        .filter(|(_, (df, _))| limits.admits(*df, n_docs, min_df))
        .map(|(term, (_, total))| (term, total))
        .collect();

    if kept.is_empty() {
        return Err(AnalysisError::CorpusFeature {
            stage: "vocabulary",
            detail: format!(
                "no terms remain after pruning {n_docs} documents (min_df {min_df}, max_df {})",
                limits.max_df
            ),
        });
    }

    if kept.len() > limits.max_features {
        // stable sort keeps the alphabetical order among equal frequencies
        kept.sort_by(|a, b| b.1.cmp(&a.1));
        kept.truncate(limits.max_features);
        kept.sort_by(|a, b| a.0.cmp(b.0));
    }

    let terms: Vec<String> = kept.iter().map(|(t, _)| (*t).to_string()).collect();
    let index: HashMap<&str, usize> = terms
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let rows = raw_counts
        .iter()
        .map(|counts| {
            let mut row: CountRow = counts
                .iter()
                .filter_map(|(term, &c)| index.get(term.as_str()).map(|&i| (i, c as f64)))
                .collect();
            row.sort_by_key(|&(i, _)| i);
            row
        })
        .collect();

    tracing::debug!(documents = n_docs, terms = terms.len(), min_df, "built corpus vocabulary");
    Ok((Vocabulary { terms }, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(min_df: usize, max_df: f64, max_features: usize) -> VocabularyLimits {
        VocabularyLimits {
            min_df,
            max_df,
            max_features,
        }
    }

    #[test]
    fn tokenizer_drops_single_characters() {
        let tokens: Vec<String> = tokenize("A b cam's Lens 4k").collect();
        assert_eq!(tokens, vec!["cam", "lens", "4k"]);
    }

    #[test]
    fn min_df_floor_is_lowered_for_small_corpora() {
        let l = limits(5, 0.95, 5000);
        assert_eq!(l.effective_min_df(2), 1);
        assert_eq!(l.effective_min_df(4), 3);
        assert_eq!(l.effective_min_df(100), 5);
    }

    #[test]
    fn terms_in_every_document_exceed_max_df() {
        let (vocab, rows) = build(
            &["camera battery", "camera lens"],
            limits(5, 0.95, 5000),
        )
        .unwrap();
        let terms: Vec<&str> = (0..vocab.len()).map(|i| vocab.term(i)).collect();
        assert_eq!(terms, vec!["battery", "lens"]);
        assert_eq!(rows[0], vec![(0, 1.0)]);
        assert_eq!(rows[1], vec![(1, 1.0)]);
    }

    #[test]
    fn max_features_keeps_most_frequent() {
        let docs = ["alpha alpha beta", "gamma delta", "alpha zeta"];
        let (vocab, _) = build(&docs, limits(1, 1.0, 2)).unwrap();
        let terms: Vec<&str> = (0..vocab.len()).map(|i| vocab.term(i)).collect();
        assert_eq!(terms, vec!["alpha", "beta"]);
    }

    #[test]
    fn empty_vocabulary_is_an_error() {
        let err = build(&["same words", "same words"], limits(5, 0.95, 5000)).unwrap_err();
        assert!(err.to_string().contains("no terms remain"), "{err}");
        assert!(build(&[], limits(1, 1.0, 10)).is_err());
    }
}
