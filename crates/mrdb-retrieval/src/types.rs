//! Retrieval strategies, queries, and result sets.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use mrdb_core::{Metadata, SentimentLabel};
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// How a query is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Similarity,
    SimilarityFilterPositive,
    SimilarityFilterNegative,
    Keyword,
    #[serde(alias = "hybrid_similarity_keyword")]
    Hybrid,
}

impl Strategy {
    pub const SUPPORTED: &'static str = "similarity, similarity_filter_positive, \
         similarity_filter_negative, keyword, hybrid";

    pub const ALL: [Strategy; 5] = [
        Strategy::Similarity,
        Strategy::SimilarityFilterPositive,
        Strategy::SimilarityFilterNegative,
        Strategy::Keyword,
        Strategy::Hybrid,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Similarity => "similarity",
            Strategy::SimilarityFilterPositive => "similarity_filter_positive",
            Strategy::SimilarityFilterNegative => "similarity_filter_negative",
            Strategy::Keyword => "keyword",
            Strategy::Hybrid => "hybrid",
        }
    }

    /// The sentiment label a filtering strategy restricts results to.
    #[must_use]
    pub fn sentiment_filter(self) -> Option<SentimentLabel> {
        match self {
            Strategy::SimilarityFilterPositive => Some(SentimentLabel::Positive),
            Strategy::SimilarityFilterNegative => Some(SentimentLabel::Negative),
            Strategy::Similarity | Strategy::Keyword | Strategy::Hybrid => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "similarity" => Ok(Strategy::Similarity),
            "similarity_filter_positive" => Ok(Strategy::SimilarityFilterPositive),
            "similarity_filter_negative" => Ok(Strategy::SimilarityFilterNegative),
            "keyword" => Ok(Strategy::Keyword),
            "hybrid" | "hybrid_similarity_keyword" => Ok(Strategy::Hybrid),
            other => Err(RetrievalError::UnknownStrategy {
                name: other.to_string(),
                supported: Self::SUPPORTED,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub text: String,
    pub strategy: Strategy,
    /// Bound on each sub-query.
    pub k: usize,
    /// Label for the sentiment-filter strategies, overriding the one the
    /// strategy names. Ignored by the other strategies.
    pub sentiment: Option<String>,
}

impl Query {
    #[must_use]
    pub fn new(text: impl Into<String>, strategy: Strategy, k: usize) -> Self {
        Self {
            text: text.into(),
            strategy,
            k,
            sentiment: None,
        }
    }

    #[must_use]
    pub fn with_sentiment(mut self, label: impl Into<String>) -> Self {
        self.sentiment = Some(label.into());
        self
    }
}

/// Equality condition on one metadata field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaFilter {
    pub key: String,
    pub value: String,
}

impl MetaFilter {
    #[must_use]
    pub fn sentiment(label: SentimentLabel) -> Self {
        Self {
            key: "sentiment_label".to_string(),
            value: label.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedEntry {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
    /// Relevance in `[0, 1]` for similarity hits; absent for keyword hits.
    pub score: Option<f32>,
}

/// Ordered entries with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    entries: Vec<RetrievedEntry>,
}

impl RetrievalResult {
    /// Build a result, keeping the first occurrence of each id.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = RetrievedEntry>) -> Self {
        let mut result = Self::default();
        result.extend_new(entries);
        result
    }

    /// Append entries whose ids are not present yet. Returns how many were
    /// added.
    pub fn extend_new(&mut self, entries: impl IntoIterator<Item = RetrievedEntry>) -> usize {
        let mut seen: HashSet<String> = self.entries.iter().map(|e| e.id.clone()).collect();
        let before = self.entries.len();
        for entry in entries {
            if seen.insert(entry.id.clone()) {
                self.entries.push(entry);
            }
        }
        self.entries.len() - before
    }

    #[must_use]
    pub fn entries(&self) -> &[RetrievedEntry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<RetrievedEntry> {
        self.entries
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Score of the first entry, if it has one.
    #[must_use]
    pub fn top_score(&self) -> Option<f32> {
        self.entries.first().and_then(|e| e.score)
    }
}

/// A list that backends may return either flat or wrapped in one outer
/// list (one inner list per query text).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrNested<T> {
    Nested(Vec<Vec<T>>),
    Flat(Vec<T>),
}

impl<T> Default for OneOrNested<T> {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

impl<T> OneOrNested<T> {
    /// The flat list; for the nested form, the first inner list.
    #[must_use]
    pub fn into_flat(self) -> Vec<T> {
        match self {
            Self::Flat(items) => items,
            Self::Nested(lists) => lists.into_iter().next().unwrap_or_default(),
        }
    }
}

/// Raw backend answer as parallel arrays.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub ids: OneOrNested<String>,
    #[serde(default)]
    pub documents: OneOrNested<Option<String>>,
    #[serde(default)]
    pub metadatas: OneOrNested<Option<Metadata>>,
    #[serde(default)]
    pub scores: Option<OneOrNested<f32>>,
}

impl RawSearchResponse {
    /// Flatten the parallel arrays into a result. Arrays of unequal length
    /// are cut to the shortest; later duplicates of an id are dropped.
    #[must_use]
    pub fn into_result(self) -> RetrievalResult {
        let ids = self.ids.into_flat();
        let documents = self.documents.into_flat();
        let metadatas = self.metadatas.into_flat();
        let scores = self.scores.map(OneOrNested::into_flat).unwrap_or_default();

        let len = ids.len().min(documents.len()).min(metadatas.len());
        if len < ids.len().max(documents.len()).max(metadatas.len()) {
            tracing::warn!(
                ids = ids.len(),
                documents = documents.len(),
                metadatas = metadatas.len(),
                "mismatched backend arrays; truncating to shortest"
            );
        }

        let entries = ids
            .into_iter()
            .zip(documents)
            .zip(metadatas)
            .take(len)
            .enumerate()
            .map(|(i, ((id, document), metadata))| RetrievedEntry {
                id,
                document: document.unwrap_or_default(),
                metadata: metadata.unwrap_or_default(),
                score: scores.get(i).copied(),
            });
        RetrievalResult::from_entries(entries)
    }
}

#[cfg(test)]
mod tests {
    use mrdb_core::MetaValue;

    use super::*;

    fn entry(id: &str) -> RetrievedEntry {
        RetrievedEntry {
            id: id.to_string(),
            document: format!("doc {id}"),
            metadata: Metadata::new(),
            score: None,
        }
    }

    #[test]
    fn strategy_names_round_trip() {
        for s in Strategy::ALL {
            assert_eq!(s.as_str().parse::<Strategy>().unwrap(), s);
        }
        assert_eq!(
            "hybrid_similarity_keyword".parse::<Strategy>().unwrap(),
            Strategy::Hybrid
        );
    }

    #[test]
    fn unknown_strategy_names_supported_set() {
        let err = "semantic".parse::<Strategy>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'semantic'"), "{msg}");
        assert!(msg.contains("similarity_filter_negative"), "{msg}");
    }

    #[test]
    fn result_drops_duplicate_ids() {
        let mut result = RetrievalResult::from_entries([entry("a"), entry("b"), entry("a")]);
        assert_eq!(result.ids(), vec!["a", "b"]);
        assert_eq!(result.extend_new([entry("b"), entry("c")]), 1);
        assert_eq!(result.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn nested_response_is_flattened() {
        let raw: RawSearchResponse = serde_json::from_value(serde_json::json!({
            "ids": [["x", "y"]],
            "documents": [["first", "second"]],
            "metadatas": [[{"sentiment_label": "positive"}, null]],
            "scores": [[0.9, 0.8]]
        }))
        .unwrap();
        let result = raw.into_result();
        assert_eq!(result.ids(), vec!["x", "y"]);
        assert_eq!(
            result.entries()[0].metadata["sentiment_label"],
            MetaValue::from("positive")
        );
        assert!(result.entries()[1].metadata.is_empty());
        assert_eq!(result.top_score(), Some(0.9));
    }

    #[test]
    fn mismatched_arrays_truncate_to_shortest() {
        let raw: RawSearchResponse = serde_json::from_value(serde_json::json!({
            "ids": ["x", "y", "z"],
            "documents": ["first", "second"],
            "metadatas": [{}, {}, {}]
        }))
        .unwrap();
        let result = raw.into_result();
        assert_eq!(result.ids(), vec!["x", "y"]);
        assert_eq!(result.top_score(), None);
    }

    #[test]
    fn missing_arrays_yield_empty_result() {
        let raw: RawSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(raw.into_result().is_empty());
    }
}
