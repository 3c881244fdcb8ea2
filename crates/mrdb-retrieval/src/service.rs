//! Question → retrieval → gate → prompt → model → report.

use crate::backend::{LanguageModel, SearchBackend};
use crate::context::{assemble_context, build_prompt};
use crate::engine::RetrievalEngine;
use crate::error::RetrievalError;
use crate::gate::{ConfidenceGate, GateOutcome};
use crate::response::ResearchReport;
use crate::types::{Query, Strategy};

#[derive(Debug)]
pub struct ResearchService<B, L> {
    engine: RetrievalEngine<B>,
    gate: ConfidenceGate,
    llm: L,
}

impl<B: SearchBackend, L: LanguageModel> ResearchService<B, L> {
    #[must_use]
    pub fn new(engine: RetrievalEngine<B>, gate: ConfidenceGate, llm: L) -> Self {
        Self { engine, gate, llm }
    }

    #[must_use]
    pub fn engine(&self) -> &RetrievalEngine<B> {
        &self.engine
    }

    #[must_use]
    pub fn model(&self) -> &L {
        &self.llm
    }

    /// Answer `question` from documents retrieved with `strategy`.
    ///
    /// Empty or low-relevance retrievals and blank context produce canned
    /// reports without calling the model.
    ///
    /// # Errors
    ///
    /// Propagates retrieval and model failures, and returns
    /// [`RetrievalError::ResponseFormat`] when the reply holds no usable
    /// report.
    pub async fn research(
        &self,
        question: &str,
        strategy: Strategy,
        k: usize,
    ) -> Result<ResearchReport, RetrievalError> {
        self.research_query(&Query::new(question, strategy, k)).await
    }

    /// [`Self::research`] for a fully specified query, including its
    /// sentiment filter label.
    ///
    /// # Errors
    ///
    /// As for [`Self::research`].
    pub async fn research_query(&self, query: &Query) -> Result<ResearchReport, RetrievalError> {
        let (question, strategy) = (query.text.as_str(), query.strategy);
        let result = self.engine.retrieve(query).await?;

        let found = match self.gate.check(result) {
            GateOutcome::Found(found) => found,
            GateOutcome::BelowThreshold { top_score } => {
                tracing::info!(%strategy, top_score, "no sufficiently relevant match");
                return Ok(ResearchReport::no_match(strategy));
            }
            GateOutcome::Empty => {
                tracing::info!(%strategy, "no documents retrieved");
                return Ok(ResearchReport::no_match(strategy));
            }
        };

        let count = found.len();
        let context = assemble_context(&found);
        if context.trim().is_empty() {
            tracing::warn!(%strategy, count, "retrieved documents produced empty context");
            return Ok(ResearchReport::empty_context(strategy, count));
        }

        let prompt = build_prompt(&context, question);
        tracing::debug!(prompt_chars = prompt.len(), count, "sending research prompt");
        let raw = self.llm.complete(&prompt).await?;

        let report = ResearchReport::from_model_output(&raw, strategy, count).inspect_err(|e| {
            tracing::warn!(reason = %e.reason, "model reply was not a usable report");
        })?;
        tracing::info!(%strategy, count, themes = report.key_themes.len(), "research report ready");
        Ok(report)
    }
}
