//! Relevance gate between retrieval and context assembly.

use crate::types::RetrievalResult;

/// Default minimum relevance of the top hit.
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Found(RetrievalResult),
    BelowThreshold { top_score: f32 },
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceGate {
    threshold: f64,
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new(DEFAULT_RELEVANCE_THRESHOLD)
    }
}

impl ConfidenceGate {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Judge a result by its first entry. Unscored results (keyword hits)
    /// pass.
    #[must_use]
    pub fn check(&self, result: RetrievalResult) -> GateOutcome {
        if result.is_empty() {
            return GateOutcome::Empty;
        }
        match result.top_score() {
            Some(top_score) if f64::from(top_score) < self.threshold => {
                tracing::info!(top_score, threshold = self.threshold, "top result below relevance threshold");
                GateOutcome::BelowThreshold { top_score }
            }
            _ => GateOutcome::Found(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use mrdb_core::Metadata;

    use super::*;
    use crate::types::RetrievedEntry;

    fn result(score: Option<f32>) -> RetrievalResult {
        RetrievalResult::from_entries([RetrievedEntry {
            id: "a".to_string(),
            document: "text".to_string(),
            metadata: Metadata::new(),
            score,
        }])
    }

    #[test]
    fn empty_result_is_empty() {
        assert_eq!(ConfidenceGate::default().check(RetrievalResult::default()), GateOutcome::Empty);
    }

    #[test]
    fn low_top_score_is_rejected() {
        let outcome = ConfidenceGate::default().check(result(Some(0.69)));
        assert_eq!(outcome, GateOutcome::BelowThreshold { top_score: 0.69 });
    }

    #[test]
    fn threshold_is_inclusive() {
        let outcome = ConfidenceGate::new(0.5).check(result(Some(0.5)));
        assert!(matches!(outcome, GateOutcome::Found(r) if r.len() == 1));
    }

    #[test]
    fn unscored_results_pass() {
        assert!(matches!(
            ConfidenceGate::default().check(result(None)),
            GateOutcome::Found(_)
        ));
    }
}
