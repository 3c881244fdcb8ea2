//! Formatting retrieved entries into a prompt for the language model.

use mrdb_core::{MetaValue, Metadata};
use serde::Deserialize;

use crate::types::{RetrievalResult, RetrievedEntry};

/// Prompt asking for a single JSON research report. `{context}` and
/// `{question}` are substituted by [`build_prompt`].
pub const RESEARCH_PROMPT_TEMPLATE: &str = r#"You are a product insights assistant. Analyze the customer feedback in CONTEXT (reviews, forum posts, comments) to answer the QUESTION.

Use only the information in CONTEXT. Do not add outside knowledge.

Each document lists metadata (source, overall sentiment, aspects, topic). Use it as evidence.

Reply with exactly one valid JSON object and nothing else: no preamble, no markdown fences.

CONTEXT:
{context}

QUESTION:
{question}

The JSON object must follow this schema. Numbers must be JSON numbers and lists JSON arrays.

{
  "report": "Summary answering the question from CONTEXT only: key takeaways, positive and negative experiences, themes, and aspects discussed. (string)",
  "metrics": [
    {
      "title": "Metric name (string)",
      "value": "<value as string or number>",
      "description": "Short explanation (string)"
    }
  ],
  "sentiments": {
    "description": "Sentiment distribution of the feedback relevant to the question, from the Overall Sentiment metadata where present. (string)",
    "positive": "<count or percentage>",
    "neutral": "<count or percentage>",
    "negative": "<count or percentage>"
  },
  "key_themes": ["Theme (e.g. 'Battery Life', 'Customer Service')"],
  "aspect_sentiments_aggregated": [
    {
      "aspect": "Aspect mentioned (string)",
      "positive_count": "<count>",
      "neutral_count": "<count>",
      "negative_count": "<count>",
      "total_mentions": "<count>",
      "summary": "Sentiment toward this aspect (string)"
    }
  ]
}
"#;

/// Fill the research template.
#[must_use]
pub fn build_prompt(context: &str, question: &str) -> String {
    RESEARCH_PROMPT_TEMPLATE
        .replacen("{context}", context, 1)
        .replacen("{question}", question, 1)
}

#[derive(Deserialize)]
struct AspectSummary {
    #[serde(default)]
    aspect: Option<String>,
    #[serde(default)]
    sentiment: Option<String>,
    #[serde(default)]
    sentiment_word: Option<String>,
}

fn text<'a>(meta: &'a Metadata, key: &str) -> Option<&'a str> {
    meta.get(key).and_then(MetaValue::as_str).filter(|s| !s.is_empty())
}

fn aspects_line(id: &str, meta: &Metadata) -> Option<String> {
    let raw = text(meta, "aspect_sentiments")?;
    let aspects: Vec<AspectSummary> = match serde_json::from_str(raw) {
        Ok(list) => list,
        Err(e) => {
            tracing::debug!(doc_id = id, error = %e, "unreadable aspect_sentiments metadata");
            return None;
        }
    };
    let parts: Vec<String> = aspects
        .iter()
        .map(|a| {
            format!(
                "{}: {} ({})",
                a.aspect.as_deref().unwrap_or("N/A"),
                a.sentiment.as_deref().unwrap_or("N/A"),
                a.sentiment_word.as_deref().unwrap_or_default()
            )
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

fn topic_line(id: &str, meta: &Metadata) -> Option<String> {
    let topic = meta.get("lda_dominant_topic")?;
    let mut line = format!("Topic {topic}");
    if let Some(prob) = meta.get("lda_dominant_topic_prob").and_then(MetaValue::as_f64) {
        line.push_str(&format!(" ({prob:.2})"));
    }
    if let Some(raw) = text(meta, "lda_dominant_topic_words") {
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(words) if !words.is_empty() => {
                line.push_str(": ");
                line.push_str(&words.join(" "));
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(doc_id = id, error = %e, "unreadable topic words metadata"),
        }
    }
    Some(line)
}

/// One document block: header, metadata line, text.
#[must_use]
pub fn format_entry(entry: &RetrievedEntry) -> String {
    let meta = &entry.metadata;
    let mut info = format!("Source: {}", text(meta, "source_type").unwrap_or("unknown"));

    if let Some(label) = text(meta, "sentiment_label") {
        info.push_str(&format!(", Overall Sentiment: {label}"));
    }
    if let Some(aspects) = aspects_line(&entry.id, meta) {
        info.push_str(&format!(", Aspects: {aspects}"));
    }
    if let Some(topic) = topic_line(&entry.id, meta) {
        info.push_str(&format!(", LDA Topic: {topic}"));
    }
    if let Some(author) = text(meta, "author") {
        info.push_str(&format!(", Author: {author}"));
    }
    if let Some(rating) = meta.get("review_rating") {
        info.push_str(&format!(", Rating: {rating}"));
    }
    if let Some(created) = text(meta, "created_iso") {
        let date: String = created.chars().take(10).collect();
        info.push_str(&format!(", Date: {date}"));
    }

    format!(
        "--- Document (ID: {}) ---\n{info}\nText: {}\n--- End Document ---",
        entry.id, entry.document
    )
}

/// All entries as one context block, separated by blank lines. Empty when
/// there is nothing to format.
#[must_use]
pub fn assemble_context(result: &RetrievalResult) -> String {
    if result.is_empty() {
        tracing::warn!("no documents to format for context");
        return String::new();
    }
    result
        .entries()
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}
