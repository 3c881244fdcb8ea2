//! Query execution across strategies, including hybrid fusion.

use mrdb_core::SentimentLabel;

use crate::backend::SearchBackend;
use crate::error::RetrievalError;
use crate::types::{MetaFilter, Query, RetrievalResult, Strategy};

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

/// Parse a filter label, falling back to `positive` with a warning.
fn filter_label(label: &str) -> SentimentLabel {
    label.parse::<SentimentLabel>().unwrap_or_else(|_| {
        tracing::warn!(label, "invalid sentiment label for filtering; using 'positive'");
        SentimentLabel::Positive
    })
}

#[derive(Debug)]
pub struct RetrievalEngine<B> {
    backend: B,
}

impl<B: SearchBackend> RetrievalEngine<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run `query` with its strategy. The filter strategies use the query's
    /// sentiment label when one is given.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn retrieve(&self, query: &Query) -> Result<RetrievalResult, RetrievalError> {
        let Query {
            text,
            strategy,
            k,
            sentiment,
        } = query;
        let (text, k) = (text.as_str(), *k);

        let result = match strategy {
            Strategy::Similarity => self.similarity(text, k, None).await?,
            Strategy::SimilarityFilterPositive | Strategy::SimilarityFilterNegative => {
                let label = match sentiment {
                    Some(label) => filter_label(label),
                    None => strategy
                        .sentiment_filter()
                        .unwrap_or(SentimentLabel::Positive),
                };
                self.similarity(text, k, Some(label)).await?
            }
            Strategy::Keyword => self.keyword(text, k).await?,
            Strategy::Hybrid => self.hybrid(text, k).await?,
        };

        tracing::info!(
            strategy = %strategy,
            k,
            results = result.len(),
            query = %preview(text),
            "retrieved documents"
        );
        Ok(result)
    }

    /// Similarity search filtered on an arbitrary sentiment label. An
    /// unrecognized label falls back to `positive` with a warning.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn retrieve_filtered(
        &self,
        text: &str,
        label: &str,
        k: usize,
    ) -> Result<RetrievalResult, RetrievalError> {
        self.similarity(text, k, Some(filter_label(label))).await
    }

    async fn similarity(
        &self,
        text: &str,
        k: usize,
        label: Option<SentimentLabel>,
    ) -> Result<RetrievalResult, RetrievalError> {
        let filter = label.map(MetaFilter::sentiment);
        let raw = self.backend.similarity(text, k, filter.as_ref()).await?;
        Ok(raw.into_result())
    }

    async fn keyword(&self, text: &str, k: usize) -> Result<RetrievalResult, RetrievalError> {
        let raw = self.backend.keyword(text, k).await?;
        Ok(raw.into_result())
    }

    async fn hybrid(&self, text: &str, k: usize) -> Result<RetrievalResult, RetrievalError> {
        let (similar, containing) =
            tokio::try_join!(self.similarity(text, k, None), self.keyword(text, k))?;
        tracing::debug!(
            similarity = similar.len(),
            keyword = containing.len(),
            "hybrid sub-queries complete"
        );
        Ok(fuse(similar, containing))
    }
}

/// Similarity hits first, then keyword hits whose ids are new. An id found
/// by both keeps its similarity entry.
#[must_use]
pub fn fuse(similar: RetrievalResult, containing: RetrievalResult) -> RetrievalResult {
    let mut fused = similar;
    fused.extend_new(containing.into_entries());
    fused
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use mrdb_core::{MetaValue, Metadata};

    use super::*;
    use crate::types::{OneOrNested, RawSearchResponse};

    /// Backend answering from fixed id lists and recording filters.
    #[derive(Default)]
    struct Scripted {
        similar: Vec<&'static str>,
        containing: Vec<&'static str>,
        filters: Mutex<Vec<Option<MetaFilter>>>,
    }

    fn response(ids: &[&str], source: &str, scored: bool) -> RawSearchResponse {
        let mut meta = Metadata::new();
        meta.insert("found_by".to_string(), MetaValue::from(source));
        RawSearchResponse {
            ids: OneOrNested::Flat(ids.iter().map(|s| (*s).to_string()).collect()),
            documents: OneOrNested::Flat(ids.iter().map(|s| Some(format!("doc {s}"))).collect()),
            metadatas: OneOrNested::Flat(ids.iter().map(|_| Some(meta.clone())).collect()),
            scores: scored.then(|| OneOrNested::Flat(vec![0.9; ids.len()])),
        }
    }

    impl SearchBackend for Scripted {
        async fn similarity(
            &self,
            _query: &str,
            k: usize,
            filter: Option<&MetaFilter>,
        ) -> Result<RawSearchResponse, RetrievalError> {
            self.filters.lock().unwrap().push(filter.cloned());
            let ids: Vec<&str> = self.similar.iter().copied().take(k).collect();
            Ok(response(&ids, "similarity", true))
        }

        async fn keyword(&self, _needle: &str, k: usize) -> Result<RawSearchResponse, RetrievalError> {
            let ids: Vec<&str> = self.containing.iter().copied().take(k).collect();
            Ok(response(&ids, "keyword", false))
        }
    }

    fn engine(similar: Vec<&'static str>, containing: Vec<&'static str>) -> RetrievalEngine<Scripted> {
        RetrievalEngine::new(Scripted {
            similar,
            containing,
            ..Scripted::default()
        })
    }

    #[tokio::test]
    async fn hybrid_puts_similarity_first_and_dedupes() {
        let engine = engine(vec!["a", "b", "c"], vec!["c", "d", "a", "e"]);
        let result = engine
            .retrieve(&Query::new("battery", Strategy::Hybrid, 3))
            .await
            .unwrap();
        assert_eq!(result.ids(), vec!["a", "b", "c", "d"]);
        let c = &result.entries()[2];
        assert_eq!(c.metadata["found_by"], MetaValue::from("similarity"));
        assert!(result.len() <= 6);
    }

    #[tokio::test]
    async fn hybrid_is_bounded_by_twice_k() {
        let engine = engine(vec!["a", "b"], vec!["c", "d"]);
        let result = engine
            .retrieve(&Query::new("x", Strategy::Hybrid, 2))
            .await
            .unwrap();
        assert_eq!(result.ids(), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn filter_strategies_pass_sentiment_filter() {
        let engine = engine(vec!["a"], vec![]);
        engine
            .retrieve(&Query::new("x", Strategy::SimilarityFilterNegative, 5))
            .await
            .unwrap();
        engine
            .retrieve(&Query::new("x", Strategy::Similarity, 5))
            .await
            .unwrap();
        let filters = engine.backend().filters.lock().unwrap().clone();
        assert_eq!(
            filters,
            vec![Some(MetaFilter::sentiment(SentimentLabel::Negative)), None]
        );
    }

    #[tokio::test]
    async fn invalid_filter_label_falls_back_to_positive() {
        let engine = engine(vec!["a"], vec![]);
        engine.retrieve_filtered("x", "angry", 5).await.unwrap();
        let filters = engine.backend().filters.lock().unwrap().clone();
        assert_eq!(
            filters,
            vec![Some(MetaFilter::sentiment(SentimentLabel::Positive))]
        );
    }

    #[tokio::test]
    async fn query_sentiment_overrides_strategy_label() {
        let engine = engine(vec!["a"], vec![]);
        let base = Query::new("x", Strategy::SimilarityFilterNegative, 5);
        engine
            .retrieve(&base.clone().with_sentiment("angry"))
            .await
            .unwrap();
        engine
            .retrieve(&base.clone().with_sentiment("neutral"))
            .await
            .unwrap();
        engine
            .retrieve(&Query::new("x", Strategy::Similarity, 5).with_sentiment("negative"))
            .await
            .unwrap();
        let filters = engine.backend().filters.lock().unwrap().clone();
        assert_eq!(
            filters,
            vec![
                Some(MetaFilter::sentiment(SentimentLabel::Positive)),
                Some(MetaFilter::sentiment(SentimentLabel::Neutral)),
                None,
            ]
        );
    }

    #[tokio::test]
    async fn keyword_strategy_has_no_scores() {
        let engine = engine(vec![], vec!["k1", "k2"]);
        let result = engine
            .retrieve(&Query::new("x", Strategy::Keyword, 1))
            .await
            .unwrap();
        assert_eq!(result.ids(), vec!["k1"]);
        assert_eq!(result.top_score(), None);
    }
}
