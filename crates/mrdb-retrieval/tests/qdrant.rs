//! Integration tests for `QdrantStore` / `QdrantBackend` using wiremock HTTP mocks.

use mrdb_core::{IndexEntry, MetaValue, Metadata, SentimentLabel};
use mrdb_retrieval::qdrant::entry_point_id;
use mrdb_retrieval::{
    HashingEmbedder, IndexStore, MetaFilter, QdrantBackend, QdrantStore, SearchBackend,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIM: usize = 16;

fn backend(base_url: &str) -> QdrantBackend<HashingEmbedder> {
    let store = QdrantStore::new(base_url, "feedback", DIM, 5).expect("client construction should not fail");
    QdrantBackend::new(store, HashingEmbedder::new(DIM))
}

fn entry(id: &str, document: &str) -> IndexEntry {
    let mut metadata = Metadata::new();
    metadata.insert("sentiment_label".to_string(), MetaValue::from("negative"));
    metadata.insert("sentiment_compound_score".to_string(), MetaValue::Float(-0.42));
    IndexEntry {
        id: id.to_string(),
        document: document.to_string(),
        metadata,
    }
}

#[tokio::test]
async fn existing_collection_is_reused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/feedback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": {}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/collections/feedback"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    backend(&server.uri())
        .ensure_collection()
        .await
        .expect("should reuse collection");
}

#[tokio::test]
async fn missing_collection_is_created_with_cosine_distance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/feedback"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/collections/feedback"))
        .and(body_partial_json(serde_json::json!({
            "vectors": { "size": DIM, "distance": "Cosine" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": true})))
        .expect(1)
        .mount(&server)
        .await;

    backend(&server.uri())
        .ensure_collection()
        .await
        .expect("should create collection");
}

#[tokio::test]
async fn upsert_sends_hashed_ids_and_flat_payload() {
    let server = MockServer::start().await;
    let expected_id = entry_point_id("amazon_review_B0TEST1234_0");
    Mock::given(method("PUT"))
        .and(path("/collections/feedback/points"))
        .and(body_partial_json(serde_json::json!({
            "points": [{
                "id": expected_id,
                "payload": {
                    "doc_id": "amazon_review_B0TEST1234_0",
                    "document": "battery drain fast",
                    "sentiment_label": "negative",
                    "sentiment_compound_score": -0.42
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": {"status": "completed"}})))
        .expect(1)
        .mount(&server)
        .await;

    let stored = backend(&server.uri())
        .upsert(&[entry("amazon_review_B0TEST1234_0", "battery drain fast")])
        .await
        .expect("upsert should succeed");
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn upsert_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/collections/feedback/points"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = backend(&server.uri())
        .upsert(&[entry("a", "text")])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("upsert returned status 500"), "{err}");
}

#[tokio::test]
async fn filtered_search_parses_scored_points() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections/feedback/points/search"))
        .and(body_partial_json(serde_json::json!({
            "limit": 3,
            "filter": { "must": [{ "key": "sentiment_label", "match": { "value": "positive" } }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": [
                {
                    "id": 11,
                    "score": 0.93,
                    "payload": {
                        "doc_id": "reddit_post_p1",
                        "document": "love the night vision",
                        "sentiment_label": "positive",
                        "lda_dominant_topic": 2
                    }
                },
                {
                    "id": 12,
                    "score": 0.71,
                    "payload": { "document": "solid camera" }
                }
            ]
        })))
        .mount(&server)
        .await;

    let filter = MetaFilter::sentiment(SentimentLabel::Positive);
    let result = backend(&server.uri())
        .similarity("night vision", 3, Some(&filter))
        .await
        .expect("search should succeed")
        .into_result();

    assert_eq!(result.ids(), vec!["reddit_post_p1", "12"]);
    let first = &result.entries()[0];
    assert_eq!(first.document, "love the night vision");
    assert_eq!(first.metadata["lda_dominant_topic"], MetaValue::Int(2));
    assert!(!first.metadata.contains_key("document"));
    assert_eq!(result.top_score(), Some(0.93));
}

#[tokio::test]
async fn keyword_scroll_uses_text_match_and_has_no_scores() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections/feedback/points/scroll"))
        .and(body_partial_json(serde_json::json!({
            "limit": 5,
            "filter": { "must": [{ "key": "document", "match": { "text": "battery" } }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": {
                "points": [
                    { "id": 1, "payload": { "doc_id": "k1", "document": "battery ok" } }
                ],
                "next_page_offset": null
            }
        })))
        .mount(&server)
        .await;

    let result = backend(&server.uri())
        .keyword("battery", 5)
        .await
        .expect("scroll should succeed")
        .into_result();
    assert_eq!(result.ids(), vec!["k1"]);
    assert_eq!(result.top_score(), None);
}

#[tokio::test]
async fn malformed_search_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections/feedback/points/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .mount(&server)
        .await;

    let err = backend(&server.uri())
        .similarity("x", 1, None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, mrdb_retrieval::RetrievalError::Deserialize { .. }),
        "{err:?}"
    );
}
