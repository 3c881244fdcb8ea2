//! Mapping analyzed items to index-ready entries.

use std::collections::HashSet;

use mrdb_core::metadata::insert_opt;
use mrdb_core::{AnalyzedItem, EntityKind, IndexEntry, MetaValue, Metadata};
use serde::Serialize;

use crate::error::IndexError;
use crate::normalize::preview;

/// Encode a composite as a JSON string, or `None` when it is empty or
/// cannot be encoded.
fn encoded<T: Serialize + ?Sized>(key: &str, value: &T) -> Option<MetaValue> {
    match serde_json::to_value(value) {
        Ok(json) => MetaValue::from_json(&json),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to encode metadata composite; omitting");
            None
        }
    }
}

/// Flat metadata for one analyzed item. Composites are JSON strings and
/// absent or empty values are omitted.
#[must_use]
pub fn entry_metadata(item: &AnalyzedItem) -> Metadata {
    let mut meta = item.meta.to_metadata();

    meta.insert("source_type".to_string(), item.source_kind.as_str().into());
    meta.insert(
        "sentiment_label".to_string(),
        item.sentiment_label.as_str().into(),
    );
    meta.insert(
        "sentiment_compound_score".to_string(),
        item.sentiment.compound.into(),
    );
    insert_opt(
        &mut meta,
        "product_mentions",
        encoded("product_mentions", item.entities.get(EntityKind::Product)),
    );
    if !item.entities.is_empty() {
        insert_opt(&mut meta, "entities", encoded("entities", &item.entities));
    }
    insert_opt(
        &mut meta,
        "aspect_sentiments",
        encoded("aspect_sentiments", &item.aspects),
    );

    let corpus = &item.corpus;
    if let Some(terms) = &corpus.tfidf_terms {
        // stored as [[term, weight], ...] pairs
        let pairs: Vec<(&str, f64)> = terms.iter().map(|t| (t.term.as_str(), t.weight)).collect();
        insert_opt(&mut meta, "tfidf_features", encoded("tfidf_features", &pairs));
    }
    insert_opt(&mut meta, "lda_dominant_topic", corpus.dominant_topic);
    insert_opt(&mut meta, "lda_dominant_topic_prob", corpus.dominant_topic_prob);
    if let Some(words) = &corpus.topic_words {
        insert_opt(
            &mut meta,
            "lda_dominant_topic_words",
            encoded("lda_dominant_topic_words", words),
        );
    }

    if !item.original_text.is_empty() {
        meta.insert("original_text".to_string(), item.original_text.clone().into());
    }
    meta
}

/// Convert analyzed items into index entries.
///
/// Items without a document id or without normalized text are skipped with
/// a log line.
///
/// # Errors
///
/// Returns [`IndexError::DuplicateId`] if two items share a document id.
pub fn to_index_entries(items: &[AnalyzedItem]) -> Result<Vec<IndexEntry>, IndexError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());
    let mut entries = Vec::with_capacity(items.len());
    let mut skipped = 0_usize;

    for item in items {
        let Some(id) = item.meta.doc_id() else {
            tracing::warn!(
                source_kind = %item.source_kind,
                preview = %preview(&item.original_text),
                "item has no document id; skipping"
            );
            skipped += 1;
            continue;
        };
        if !item.has_text() {
            tracing::debug!(doc_id = id, "item has no normalized text; skipping");
            skipped += 1;
            continue;
        }
        if !seen.insert(id) {
            return Err(IndexError::DuplicateId(id.to_string()));
        }

        entries.push(IndexEntry {
            id: id.to_string(),
            document: item.normalized_text.clone(),
            metadata: entry_metadata(item),
        });
    }

    tracing::info!(entries = entries.len(), skipped, "prepared index entries");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use mrdb_core::{
        AspectMethod, AspectSentiment, ForumCommentMeta, ForumPostMeta, SentimentLabel,
        SentimentScores, SourceMeta, TermWeight,
    };

    use super::*;

    fn analyzed(id: &str, text: &str) -> AnalyzedItem {
        let meta = SourceMeta::ForumComment(ForumCommentMeta {
            doc_id: id.to_string(),
            comment_id: id.trim_start_matches("reddit_comment_").to_string(),
            subreddit: Some("homesecurity".to_string()),
            ..ForumCommentMeta::default()
        });
        let mut item = AnalyzedItem::empty(format!("original {text}"), meta);
        item.normalized_text = text.to_string();
        item.sentiment = SentimentScores {
            compound: 0.6,
            positive: 0.5,
            neutral: 0.5,
            negative: 0.0,
        };
        item.sentiment_label = SentimentLabel::Positive;
        item
    }

    #[test]
    fn entries_carry_flattened_metadata() {
        let mut item = analyzed("reddit_comment_c1", "ring work great");
        item.entities.insert(EntityKind::Product, "Ring");
        item.aspects.push(AspectSentiment {
            aspect: "ring".to_string(),
            sentiment: SentimentLabel::Positive,
            score: 0.62,
            sentiment_word: "great".to_string(),
            method: AspectMethod::DependencyRule,
        });
        item.corpus.tfidf_terms = Some(vec![TermWeight {
            term: "ring".to_string(),
            weight: 0.7071,
        }]);
        item.corpus.dominant_topic = Some(3);
        item.corpus.dominant_topic_prob = Some(0.81);
        item.corpus.topic_words = Some(vec!["ring".to_string(), "doorbell".to_string()]);

        let entries = to_index_entries(&[item]).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.id, "reddit_comment_c1");
        assert_eq!(entry.document, "ring work great");

        let m = &entry.metadata;
        assert_eq!(m["doc_id"], MetaValue::from("reddit_comment_c1"));
        assert_eq!(m["source_type"], MetaValue::from("reddit_comment"));
        assert_eq!(m["sentiment_label"], MetaValue::from("positive"));
        assert_eq!(m["sentiment_compound_score"], MetaValue::Float(0.6));
        assert_eq!(m["product_mentions"], MetaValue::from("[\"Ring\"]"));
        assert_eq!(m["tfidf_features"], MetaValue::from("[[\"ring\",0.7071]]"));
        assert_eq!(m["lda_dominant_topic"], MetaValue::Int(3));
        assert_eq!(m["lda_dominant_topic_prob"], MetaValue::Float(0.81));
        assert_eq!(
            m["lda_dominant_topic_words"],
            MetaValue::from("[\"ring\",\"doorbell\"]")
        );
        assert_eq!(m["subreddit"], MetaValue::from("homesecurity"));
        assert_eq!(m["original_text"], MetaValue::from("original ring work great"));
        let aspects = m["aspect_sentiments"].as_str().unwrap();
        assert!(aspects.contains("\"method\":\"rule_based\""), "{aspects}");
        assert!(m["entities"].as_str().unwrap().contains("\"PRODUCT\":[\"Ring\"]"));
        assert!(m.values().all(|v| !matches!(v, MetaValue::Text(s) if s == "[]")));
    }

    #[test]
    fn empty_composites_and_unset_fields_are_omitted() {
        let entries = to_index_entries(&[analyzed("reddit_comment_c2", "okay")]).unwrap();
        let m = &entries[0].metadata;
        for key in [
            "product_mentions",
            "entities",
            "aspect_sentiments",
            "tfidf_features",
            "lda_dominant_topic",
            "lda_dominant_topic_prob",
            "lda_dominant_topic_words",
            "author",
        ] {
            assert!(!m.contains_key(key), "{key} should be omitted");
        }
    }

    #[test]
    fn items_without_id_or_text_are_skipped() {
        let no_id = {
            let mut item = analyzed("x", "text");
            item.meta = SourceMeta::ForumPost(ForumPostMeta::default());
            item
        };
        let no_text = {
            let mut item = analyzed("reddit_comment_c3", "");
            item.normalized_text.clear();
            item
        };
        let kept = analyzed("reddit_comment_c4", "fine");
        let entries = to_index_entries(&[no_id, no_text, kept]).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "reddit_comment_c4");
    }

    #[test]
    fn duplicate_ids_are_an_error() {
        let err = to_index_entries(&[
            analyzed("reddit_comment_dup", "first"),
            analyzed("reddit_comment_dup", "second"),
        ])
        .unwrap_err();
        assert_eq!(err.to_string(), "duplicate document id 'reddit_comment_dup'");
    }
}
