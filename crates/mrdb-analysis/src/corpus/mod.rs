//! Corpus-wide features: TF-IDF top terms and LDA topic assignment.
//!
//! Runs once, after every document has been analyzed and before indexing.
//! Only items with normalized text take part; the rest keep unset corpus
//! fields. A failing statistic clears its own fields on every item and is
//! reported in the returned [`CorpusFeatureReport`]; it never aborts the
//! batch or touches per-document analysis.

mod lda;
mod tfidf;
mod vocabulary;

use mrdb_core::AnalyzedItem;

use crate::error::AnalysisError;
use lda::LdaParams;
use vocabulary::VocabularyLimits;

#[derive(Debug, Clone, PartialEq)]
pub struct CorpusFeatureConfig {
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum share of documents a term may appear in.
    pub max_df: f64,
    pub max_features: usize,
    pub n_topics: usize,
    /// TF-IDF terms kept per document.
    pub top_terms: usize,
    /// Words reported per topic.
    pub top_words: usize,
    pub passes: usize,
    pub seed: u64,
}

impl Default for CorpusFeatureConfig {
    fn default() -> Self {
        Self {
            min_df: 5,
            max_df: 0.95,
            max_features: 5000,
            n_topics: 10,
            top_terms: 10,
            top_words: 10,
            passes: 10,
            seed: 42,
        }
    }
}

/// Outcome of one corpus feature run.
#[derive(Debug)]
pub struct CorpusFeatureReport {
    /// Items that took part (non-empty normalized text).
    pub documents: usize,
    pub vocabulary_size: usize,
    pub tfidf_error: Option<AnalysisError>,
    pub topic_error: Option<AnalysisError>,
}

impl CorpusFeatureReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tfidf_error.is_none() && self.topic_error.is_none()
    }
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Compute corpus features and write them into `items` in place.
pub fn compute(items: &mut [AnalyzedItem], config: &CorpusFeatureConfig) -> CorpusFeatureReport {
    let participants: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.has_text())
        .map(|(i, _)| i)
        .collect();

    let mut report = CorpusFeatureReport {
        documents: participants.len(),
        vocabulary_size: 0,
        tfidf_error: None,
        topic_error: None,
    };

    let docs: Vec<&str> = participants
        .iter()
        .map(|&i| items[i].normalized_text.as_str())
        .collect();
    let limits = VocabularyLimits {
        min_df: config.min_df,
        max_df: config.max_df,
        max_features: config.max_features,
    };

    let (vocab, rows) = match vocabulary::build(&docs, limits) {
        Ok(built) => built,
        Err(e) => {
            tracing::warn!(documents = report.documents, error = %e, "corpus features unavailable");
            clear_tfidf(items);
            clear_topics(items);
            report.tfidf_error = Some(AnalysisError::CorpusFeature {
                stage: "tfidf",
                detail: e.to_string(),
            });
            report.topic_error = Some(e);
            return report;
        }
    };
    report.vocabulary_size = vocab.len();

    let top_terms = tfidf::top_terms(&rows, &vocab, config.top_terms);
    for (&i, terms) in participants.iter().zip(top_terms) {
        items[i].corpus.tfidf_terms = Some(terms);
    }

    let params = LdaParams {
        n_topics: config.n_topics,
        passes: config.passes,
        seed: config.seed,
    };
    match lda::fit(&rows, vocab.len(), params) {
        Ok(fit) => {
            let topic_words: Vec<Vec<String>> = (0..config.n_topics)
                .map(|k| {
                    fit.top_term_indices(k, config.top_words)
                        .into_iter()
                        .map(|t| vocab.term(t).to_string())
                        .collect()
                })
                .collect();
            for (doc, &i) in participants.iter().enumerate() {
                let corpus = &mut items[i].corpus;
                if let Some((topic, prob)) = fit.dominant(doc) {
                    corpus.dominant_topic = Some(topic);
                    corpus.dominant_topic_prob = Some(prob);
                    corpus.topic_words = Some(topic_words[topic].clone());
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "topic model failed; topic fields left unset");
            clear_topics(items);
            report.topic_error = Some(e);
        }
    }

    tracing::info!(
        documents = report.documents,
        vocabulary = report.vocabulary_size,
        topics = config.n_topics,
        complete = report.is_complete(),
        "computed corpus features"
    );
    report
}

fn clear_tfidf(items: &mut [AnalyzedItem]) {
    for item in items {
        item.corpus.tfidf_terms = None;
    }
}

fn clear_topics(items: &mut [AnalyzedItem]) {
    for item in items {
        item.corpus.dominant_topic = None;
        item.corpus.dominant_topic_prob = None;
        item.corpus.topic_words = None;
    }
}
