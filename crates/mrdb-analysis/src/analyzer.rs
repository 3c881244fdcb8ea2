//! Per-document analysis: normalization, entities, sentiment, aspects.

use std::sync::Arc;

use mrdb_core::{AnalyzedItem, AspectMethod, CorpusFeatures, RawItem, SourceMeta};

use crate::aspects::AspectExtractor;
use crate::entities::EntityTagger;
use crate::linguistic::{default_backend, LinguisticBackend};
use crate::normalize::{normalize_for_analysis, preview};
use crate::scorer::SentimentScorer;

#[derive(Debug)]
pub struct DocumentAnalyzer {
    tagger: EntityTagger,
    scorer: SentimentScorer,
    aspects: AspectExtractor,
}

impl DocumentAnalyzer {
    /// Build an analyzer over the given global product keywords. Without a
    /// backend, entity tagging is keyword-only and aspect lists stay empty.
    #[must_use]
    pub fn new(global_keywords: &[String], backend: Option<Arc<dyn LinguisticBackend>>) -> Self {
        let scorer = SentimentScorer::new();
        Self {
            tagger: EntityTagger::new(global_keywords, backend.clone()),
            scorer,
            aspects: AspectExtractor::new(backend, scorer),
        }
    }

    /// Analyzer using the bundled heuristic backend.
    #[must_use]
    pub fn with_default_backend(global_keywords: &[String]) -> Self {
        Self::new(global_keywords, Some(default_backend()))
    }

    #[must_use]
    pub fn tagger(&self) -> &EntityTagger {
        &self.tagger
    }

    /// Analyze one text. Empty or noise-only input yields the neutral empty
    /// record; corpus-level fields are always left unset.
    #[must_use]
    pub fn analyze(
        &self,
        text: &str,
        meta: SourceMeta,
        contextual_keywords: &[String],
        method: AspectMethod,
    ) -> AnalyzedItem {
        let kind = meta.source_kind();
        if text.trim().is_empty() {
            tracing::debug!(source_kind = %kind, "empty input text; returning empty analysis");
            return AnalyzedItem::empty(text, meta);
        }

        let normalized = normalize_for_analysis(text);
        if normalized.is_empty() {
            tracing::warn!(
                source_kind = %kind,
                preview = %preview(text),
                "text cleaning produced empty text; skipping analysis"
            );
            return AnalyzedItem::empty(text, meta);
        }

        let entities = self.tagger.tag(&normalized, contextual_keywords);
        let sentiment = self.scorer.score(&normalized);
        let aspects = self.aspects.extract(&normalized, method);

        AnalyzedItem {
            original_text: text.to_string(),
            normalized_text: normalized,
            source_kind: kind,
            sentiment,
            sentiment_label: sentiment.label(),
            entities,
            aspects,
            meta,
            corpus: CorpusFeatures::default(),
        }
    }

    /// Analyze a captured item with its own contextual keywords.
    #[must_use]
    pub fn analyze_item(&self, item: &RawItem, method: AspectMethod) -> AnalyzedItem {
        let contextual = item.meta().contextual_keywords();
        self.analyze(item.text(), item.meta().clone(), &contextual, method)
    }

    /// Analyze a batch in input order. Every item yields a record.
    #[must_use]
    pub fn analyze_batch(&self, items: &[RawItem], method: AspectMethod) -> Vec<AnalyzedItem> {
        let analyzed: Vec<AnalyzedItem> = items
            .iter()
            .map(|item| self.analyze_item(item, method))
            .collect();
        let empty = analyzed.iter().filter(|a| !a.has_text()).count();
        tracing::info!(
            total = analyzed.len(),
            empty,
            method = %method,
            "analyzed document batch"
        );
        analyzed
    }
}
