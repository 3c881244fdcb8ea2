//! Extracting the JSON report from free-form model output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ResponseFormatError;
use crate::types::Strategy;

const NO_MATCH_REPORT: &str = "No relevant information found in the database for this query.";
const EMPTY_CONTEXT_REPORT: &str =
    "Relevant documents were found, but their content was empty after processing. Cannot generate report.";

/// The outermost `{...}` span of `raw`, parsed as JSON.
///
/// # Errors
///
/// Returns [`ResponseFormatError`] carrying `raw` when there is no brace
/// pair or the span is not valid JSON.
pub fn extract_json(raw: &str) -> Result<Value, ResponseFormatError> {
    let fail = |reason: String| ResponseFormatError {
        raw: raw.to_string(),
        reason,
    };

    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(fail("no JSON object delimiters found".to_string()));
    };
    if end < start {
        return Err(fail("closing brace precedes opening brace".to_string()));
    }

    serde_json::from_str(&raw[start..=end]).map_err(|e| fail(format!("invalid JSON: {e}")))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub description: String,
}

/// Counts or percentages as the model reported them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub positive: Value,
    #[serde(default)]
    pub neutral: Value,
    #[serde(default)]
    pub negative: Value,
}

impl SentimentBreakdown {
    fn unavailable() -> Self {
        Self {
            description: "N/A".to_string(),
            positive: Value::from(0),
            neutral: Value::from(0),
            negative: Value::from(0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AspectAggregate {
    #[serde(default)]
    pub aspect: String,
    #[serde(default)]
    pub positive_count: Value,
    #[serde(default)]
    pub neutral_count: Value,
    #[serde(default)]
    pub negative_count: Value,
    #[serde(default)]
    pub total_mentions: Value,
    #[serde(default)]
    pub summary: String,
}

/// Synthesized answer to a research question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    #[serde(default)]
    pub report: String,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub sentiments: SentimentBreakdown,
    #[serde(default)]
    pub key_themes: Vec<String>,
    #[serde(default)]
    pub aspect_sentiments_aggregated: Vec<AspectAggregate>,
    #[serde(default)]
    pub retrieval_method_used: String,
    #[serde(default)]
    pub retrieved_document_count: usize,
}

impl ResearchReport {
    fn canned(report: &str, strategy: Strategy, count: usize) -> Self {
        Self {
            report: report.to_string(),
            sentiments: SentimentBreakdown::unavailable(),
            retrieval_method_used: strategy.as_str().to_string(),
            retrieved_document_count: count,
            ..Self::default()
        }
    }

    /// Nothing relevant was retrieved.
    #[must_use]
    pub fn no_match(strategy: Strategy) -> Self {
        Self::canned(NO_MATCH_REPORT, strategy, 0)
    }

    /// Documents were retrieved but produced no usable context.
    #[must_use]
    pub fn empty_context(strategy: Strategy, count: usize) -> Self {
        Self::canned(EMPTY_CONTEXT_REPORT, strategy, count)
    }

    /// Parse a model reply into a report and stamp retrieval details on it.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseFormatError`] when no JSON object can be extracted
    /// or it does not match the report shape.
    pub fn from_model_output(
        raw: &str,
        strategy: Strategy,
        count: usize,
    ) -> Result<Self, ResponseFormatError> {
        let value = extract_json(raw)?;
        let mut report: Self = serde_json::from_value(value).map_err(|e| ResponseFormatError {
            raw: raw.to_string(),
            reason: format!("unexpected report shape: {e}"),
        })?;
        report.retrieval_method_used = strategy.as_str().to_string();
        report.retrieved_document_count = count;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_object_between_noise() {
        let value = extract_json("noise {\"a\":1} trailing").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn fenced_output_is_accepted() {
        let raw = "```json\n{\"report\": \"ok\", \"nested\": {\"x\": [1, 2]}}\n```";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["nested"]["x"], json!([1, 2]));
    }

    #[test]
    fn missing_braces_carry_raw_text() {
        let err = extract_json("I cannot answer that.").unwrap_err();
        assert_eq!(err.raw, "I cannot answer that.");
        assert!(err.reason.contains("delimiters"));
    }

    #[test]
    fn reversed_braces_are_rejected() {
        let err = extract_json("} nope {").unwrap_err();
        assert_eq!(err.raw, "} nope {");
    }

    #[test]
    fn invalid_span_is_rejected() {
        let err = extract_json("{\"a\": 1} and {\"b\": }").unwrap_err();
        assert!(err.reason.starts_with("invalid JSON"));
    }

    #[test]
    fn model_output_becomes_report_with_retrieval_details() {
        let raw = r#"Here you go: {
            "report": "Battery complaints dominate.",
            "metrics": [{"title": "Negative share", "value": "60%", "description": "of posts"}],
            "sentiments": {"description": "mostly negative", "positive": 1, "neutral": 1, "negative": 3},
            "key_themes": ["Battery Life"],
            "aspect_sentiments_aggregated": [
                {"aspect": "battery", "positive_count": 0, "neutral_count": 1, "negative_count": 3, "total_mentions": 4, "summary": "drains fast"}
            ]
        }"#;
        let report = ResearchReport::from_model_output(raw, Strategy::Hybrid, 5).unwrap();
        assert_eq!(report.report, "Battery complaints dominate.");
        assert_eq!(report.metrics[0].value, json!("60%"));
        assert_eq!(report.sentiments.negative, json!(3));
        assert_eq!(report.aspect_sentiments_aggregated[0].aspect, "battery");
        assert_eq!(report.retrieval_method_used, "hybrid");
        assert_eq!(report.retrieved_document_count, 5);
    }

    #[test]
    fn partial_report_fills_defaults() {
        let report =
            ResearchReport::from_model_output("{\"report\": \"short\"}", Strategy::Keyword, 2).unwrap();
        assert!(report.metrics.is_empty());
        assert!(report.key_themes.is_empty());
        assert_eq!(report.sentiments.positive, Value::Null);
    }

    #[test]
    fn wrong_shape_is_a_format_error() {
        let err = ResearchReport::from_model_output("{\"metrics\": 7}", Strategy::Similarity, 1)
            .unwrap_err();
        assert!(err.reason.contains("report shape"));
        assert_eq!(err.raw, "{\"metrics\": 7}");
    }

    #[test]
    fn no_match_report_is_zeroed() {
        let report = ResearchReport::no_match(Strategy::SimilarityFilterNegative);
        assert_eq!(report.report, NO_MATCH_REPORT);
        assert_eq!(report.sentiments.description, "N/A");
        assert_eq!(report.sentiments.positive, json!(0));
        assert_eq!(report.retrieval_method_used, "similarity_filter_negative");
        assert_eq!(report.retrieved_document_count, 0);

        let empty = ResearchReport::empty_context(Strategy::Hybrid, 3);
        assert_eq!(empty.retrieved_document_count, 3);
        assert!(empty.report.starts_with("Relevant documents were found"));
    }
}
