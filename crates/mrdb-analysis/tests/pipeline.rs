//! End-to-end analysis: dump ingestion through index entries.

use std::path::PathBuf;

use mrdb_analysis::{
    compute_corpus_features, parse_dump, product_listings, forum_threads, to_index_entries,
    CorpusFeatureConfig, DocumentAnalyzer, ForumThread, IndexError, ProductListing,
};
use mrdb_core::{load_keywords, AspectMethod, MetaValue, SentimentLabel, SentimentScores};

fn repository_keywords() -> Vec<String> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/keywords.yaml");
    load_keywords(&path)
        .expect("repository keywords file should load")
        .keywords
}

const LISTINGS: &str = r#"[
  {
    "URL": "https://www.amazon.com/Wyze-Cam/dp/B0TEST1234",
    "Title": "Wyze Cam v3",
    "Price": "$35.98",
    "Rating": "4.5 out of 5 stars",
    "Review Count": "2,430 ratings",
    "reviews": [
      {"title": "Great camera", "comment": "Night vision works perfectly", "date": "Reviewed in the United States on June 3, 2024"},
      {"title": "", "comment": "😀😀"},
      {"title": "Terrible battery", "comment": "It died after two days"}
    ]
  }
]"#;

const THREADS: &str = r#"[
  {
    "id": "t1",
    "title": "Ring or Arlo?",
    "selftext": "Thinking about a new doorbell",
    "subreddit": "homesecurity",
    "created_utc": 1700000000,
    "comments": [
      {"comment_id": "c1", "body": "Arlo has been reliable for me"},
      {"comment_id": "c2", "body": ""}
    ]
  },
  {"title": "no id"}
]"#;

#[test]
fn three_review_corpus_with_one_empty_item() {
    let listings: Vec<ProductListing> = parse_dump(LISTINGS).unwrap();
    let raw = product_listings(&listings);
    assert_eq!(raw.len(), 3);

    let analyzer = DocumentAnalyzer::with_default_backend(&repository_keywords());
    let mut analyzed = analyzer.analyze_batch(&raw, AspectMethod::DependencyRule);

    assert!(!analyzed[1].has_text());
    assert_eq!(analyzed[1].sentiment, SentimentScores::neutral_empty());
    assert!(analyzed[1].entities.is_empty());
    assert!(analyzed[1].aspects.is_empty());

    let report = compute_corpus_features(&mut analyzed, &CorpusFeatureConfig::default());
    assert_eq!(report.documents, 2);
    assert!(report.is_complete(), "{report:?}");

    for i in [0, 2] {
        let corpus = &analyzed[i].corpus;
        assert!(corpus.tfidf_terms.is_some());
        assert!(corpus.dominant_topic.is_some());
        assert!(corpus.dominant_topic_prob.is_some());
        assert!(corpus.topic_words.is_some());
    }
    assert!(analyzed[1].corpus.is_unset());

    assert_eq!(analyzed[0].sentiment_label, SentimentLabel::Positive);
    assert_eq!(analyzed[2].sentiment_label, SentimentLabel::Negative);

    let entries = to_index_entries(&analyzed).unwrap();
    let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["amazon_review_B0TEST1234_0", "amazon_review_B0TEST1234_2"]);
    assert!(entries.iter().all(|e| !e.document.is_empty()));
    assert_eq!(
        entries[0].metadata["source_type"],
        MetaValue::from("amazon_review")
    );
    assert_eq!(
        entries[0].metadata["created_iso"],
        MetaValue::from("2024-06-03T00:00:00+00:00")
    );
    assert!(entries[0].metadata.contains_key("lda_dominant_topic"));
}

#[test]
fn forum_threads_flow_through_with_contextual_products() {
    let threads: Vec<ForumThread> = parse_dump(THREADS).unwrap();
    let raw = forum_threads(&threads);
    assert_eq!(raw.len(), 2);

    let analyzer = DocumentAnalyzer::with_default_backend(&repository_keywords());
    let analyzed = analyzer.analyze_batch(&raw, AspectMethod::ProximityLexicon);
    assert_eq!(analyzed[1].entities.product, vec!["Arlo".to_string()]);

    let entries = to_index_entries(&analyzed).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "t1");
    assert_eq!(entries[1].id, "reddit_comment_c1");
    assert_eq!(
        entries[1].metadata["permalink"],
        MetaValue::from("https://www.reddit.com/comments/t1/_/c1/")
    );
}

#[test]
fn re_ingesting_the_same_dump_collides_on_ids() {
    let listings: Vec<ProductListing> = parse_dump(LISTINGS).unwrap();
    let mut raw = product_listings(&listings);
    raw.extend(product_listings(&listings));

    let analyzer = DocumentAnalyzer::with_default_backend(&[]);
    let analyzed = analyzer.analyze_batch(&raw, AspectMethod::DependencyRule);
    let err = to_index_entries(&analyzed).unwrap_err();
    assert!(matches!(err, IndexError::DuplicateId(ref id) if id == "amazon_review_B0TEST1234_0"));
}
