//! Qdrant collection client: index storage, similarity search, and
//! document-text containment search.
//!
//! Payloads are the flat entry metadata plus the document text under
//! `document`, so metadata filters address fields by their own names.

use std::collections::BTreeMap;
use std::time::Duration;

use mrdb_core::{IndexEntry, MetaValue, Metadata};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::backend::{Embedder, IndexStore, SearchBackend};
use crate::error::RetrievalError;
use crate::types::{MetaFilter, OneOrNested, RawSearchResponse};

/// Points sent per upsert request.
const UPSERT_BATCH: usize = 256;

const DOCUMENT_FIELD: &str = "document";
const ID_FIELD: &str = "doc_id";

#[derive(Debug, Clone)]
pub struct QdrantStore {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    vector_dim: usize,
}

#[derive(Serialize)]
struct CreateCollectionRequest {
    vectors: VectorsConfig,
}

#[derive(Serialize)]
struct VectorsConfig {
    size: usize,
    distance: &'static str,
}

#[derive(Serialize)]
struct UpsertPointsRequest<'a> {
    points: &'a [Point],
}

#[derive(Debug, Serialize)]
struct Point {
    id: u64,
    vector: Vec<f32>,
    payload: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScrollResponse {
    result: ScrollPage,
}

#[derive(Debug, Deserialize)]
struct ScrollPage {
    points: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: serde_json::Value,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    payload: Option<serde_json::Map<String, serde_json::Value>>,
}

impl QdrantStore {
    /// # Errors
    ///
    /// Returns [`RetrievalError::Http`] if the HTTP client cannot be built.
    pub fn new(
        qdrant_url: &str,
        collection: &str,
        vector_dim: usize,
        timeout_secs: u64,
    ) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: qdrant_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
            vector_dim,
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    /// Ensure the collection exists, creating it with cosine distance if
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Qdrant`] on network or API failure.
    pub async fn ensure_collection(&self) -> Result<(), RetrievalError> {
        let url = self.collection_url();
        if let Ok(resp) = self.client.get(&url).send().await {
            if resp.status().is_success() {
                tracing::debug!(collection = %self.collection, "reusing existing collection");
                return Ok(());
            }
        }

        let body = CreateCollectionRequest {
            vectors: VectorsConfig {
                size: self.vector_dim,
                distance: "Cosine",
            },
        };
        let resp = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Qdrant(format!("collection create request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(RetrievalError::Qdrant(format!(
                "collection create returned status {}",
                resp.status()
            )));
        }

        tracing::info!(collection = %self.collection, dim = self.vector_dim, "created collection");
        Ok(())
    }

    /// Upsert entries with their precomputed vectors.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Qdrant`] on a length mismatch, a dimension
    /// mismatch, or network/API failure.
    pub async fn upsert_vectors(
        &self,
        entries: &[IndexEntry],
        vectors: Vec<Vec<f32>>,
    ) -> Result<usize, RetrievalError> {
        if entries.len() != vectors.len() {
            return Err(RetrievalError::Qdrant(format!(
                "{} vectors for {} entries",
                vectors.len(),
                entries.len()
            )));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.vector_dim) {
            return Err(RetrievalError::Qdrant(format!(
                "vector dimension {} does not match collection dimension {}",
                bad.len(),
                self.vector_dim
            )));
        }

        let points: Vec<Point> = entries
            .iter()
            .zip(vectors)
            .map(|(entry, vector)| Point {
                id: entry_point_id(&entry.id),
                vector,
                payload: entry_payload(entry),
            })
            .collect();

        let url = format!("{}/points?wait=true", self.collection_url());
        for batch in points.chunks(UPSERT_BATCH) {
            let resp = self
                .client
                .put(&url)
                .json(&UpsertPointsRequest { points: batch })
                .send()
                .await
                .map_err(|e| RetrievalError::Qdrant(format!("upsert request failed: {e}")))?;

            if !resp.status().is_success() {
                return Err(RetrievalError::Qdrant(format!(
                    "upsert returned status {}",
                    resp.status()
                )));
            }
        }

        tracing::info!(collection = %self.collection, points = points.len(), "upserted points");
        Ok(points.len())
    }

    /// Nearest points to `vector`, best first.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Qdrant`] on network or API failure and
    /// [`RetrievalError::Deserialize`] on an unexpected response body.
    pub async fn search_vector(
        &self,
        vector: Vec<f32>,
        k: usize,
        filter: Option<&MetaFilter>,
    ) -> Result<RawSearchResponse, RetrievalError> {
        let mut body = json!({
            "vector": vector,
            "limit": k,
            "with_payload": true,
        });
        if let Some(f) = filter {
            body["filter"] = json!({ "must": [{ "key": f.key, "match": { "value": f.value } }] });
        }

        let url = format!("{}/points/search", self.collection_url());
        let value = self.post_json(&url, &body, "search").await?;
        let parsed: SearchResponse =
            serde_json::from_value(value).map_err(|e| RetrievalError::Deserialize {
                context: format!("search({})", self.collection),
                source: e,
            })?;
        Ok(points_to_response(parsed.result, true))
    }

    /// Points whose document text contains `needle`.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Qdrant`] on network or API failure and
    /// [`RetrievalError::Deserialize`] on an unexpected response body.
    pub async fn scroll_text(&self, needle: &str, k: usize) -> Result<RawSearchResponse, RetrievalError> {
        let body = json!({
            "filter": { "must": [{ "key": DOCUMENT_FIELD, "match": { "text": needle } }] },
            "limit": k,
            "with_payload": true,
            "with_vector": false,
        });

        let url = format!("{}/points/scroll", self.collection_url());
        let value = self.post_json(&url, &body, "scroll").await?;
        let parsed: ScrollResponse =
            serde_json::from_value(value).map_err(|e| RetrievalError::Deserialize {
                context: format!("scroll({})", self.collection),
                source: e,
            })?;
        Ok(points_to_response(parsed.result.points, false))
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        op: &str,
    ) -> Result<serde_json::Value, RetrievalError> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| RetrievalError::Qdrant(format!("{op} request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(RetrievalError::Qdrant(format!(
                "{op} returned status {}",
                resp.status()
            )));
        }
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| RetrievalError::Deserialize {
            context: format!("{op}({})", self.collection),
            source: e,
        })
    }
}

/// Stable point id for an entry id: the first 8 bytes of its SHA-256 as a
/// big-endian u64.
#[must_use]
pub fn entry_point_id(id: &str) -> u64 {
    let hash = Sha256::digest(id.as_bytes());
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    u64::from_be_bytes(bytes)
}

fn entry_payload(entry: &IndexEntry) -> BTreeMap<String, serde_json::Value> {
    let mut payload: BTreeMap<String, serde_json::Value> = entry
        .metadata
        .iter()
        .map(|(k, v)| (k.clone(), meta_to_json(v)))
        .collect();
    payload.insert(ID_FIELD.to_string(), json!(entry.id));
    payload.insert(DOCUMENT_FIELD.to_string(), json!(entry.document));
    payload
}

fn meta_to_json(value: &MetaValue) -> serde_json::Value {
    match value {
        MetaValue::Bool(b) => json!(b),
        MetaValue::Int(i) => json!(i),
        MetaValue::Float(f) => json!(f),
        MetaValue::Text(s) => json!(s),
    }
}

fn points_to_response(points: Vec<ScoredPoint>, scored: bool) -> RawSearchResponse {
    let mut ids = Vec::with_capacity(points.len());
    let mut documents = Vec::with_capacity(points.len());
    let mut metadatas = Vec::with_capacity(points.len());
    let mut scores = Vec::with_capacity(points.len());

    for point in points {
        let mut payload = point.payload.unwrap_or_default();
        let document = payload
            .remove(DOCUMENT_FIELD)
            .and_then(|v| v.as_str().map(str::to_string));
        let id = payload
            .get(ID_FIELD)
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| point.id.to_string(), str::to_string);
        let metadata: Metadata = payload
            .iter()
            .filter_map(|(k, v)| MetaValue::from_json(v).map(|m| (k.clone(), m)))
            .collect();

        ids.push(id);
        documents.push(document);
        metadatas.push(Some(metadata));
        scores.push(point.score.unwrap_or_default());
    }

    RawSearchResponse {
        ids: OneOrNested::Flat(ids),
        documents: OneOrNested::Flat(documents),
        metadatas: OneOrNested::Flat(metadatas),
        scores: scored.then_some(OneOrNested::Flat(scores)),
    }
}

/// [`QdrantStore`] paired with an embedder so it can answer text queries and
/// index entries directly.
#[derive(Debug, Clone)]
pub struct QdrantBackend<E> {
    store: QdrantStore,
    embedder: E,
}

impl<E: Embedder> QdrantBackend<E> {
    #[must_use]
    pub fn new(store: QdrantStore, embedder: E) -> Self {
        Self { store, embedder }
    }

    #[must_use]
    pub fn store(&self) -> &QdrantStore {
        &self.store
    }
}

impl<E: Embedder> SearchBackend for QdrantBackend<E> {
    async fn similarity(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetaFilter>,
    ) -> Result<RawSearchResponse, RetrievalError> {
        let vector = self
            .embedder
            .embed(&[query])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Tei("no embedding returned for query".to_string()))?;
        self.store.search_vector(vector, k, filter).await
    }

    async fn keyword(&self, needle: &str, k: usize) -> Result<RawSearchResponse, RetrievalError> {
        self.store.scroll_text(needle, k).await
    }
}

impl<E: Embedder> IndexStore for QdrantBackend<E> {
    async fn ensure_collection(&self) -> Result<(), RetrievalError> {
        self.store.ensure_collection().await
    }

    async fn upsert(&self, entries: &[IndexEntry]) -> Result<usize, RetrievalError> {
        if entries.is_empty() {
            return Ok(0);
        }
        let texts: Vec<&str> = entries.iter().map(|e| e.document.as_str()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        self.store.upsert_vectors(entries, vectors).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_id_is_stable() {
        let id1 = entry_point_id("reddit_comment_c1");
        let id2 = entry_point_id("reddit_comment_c1");
        assert_eq!(id1, id2);
        assert_ne!(id1, entry_point_id("reddit_comment_c2"));
    }

    #[test]
    fn payload_flattens_metadata_with_document() {
        let mut metadata = Metadata::new();
        metadata.insert("sentiment_label".to_string(), MetaValue::from("negative"));
        metadata.insert("lda_dominant_topic".to_string(), MetaValue::Int(2));
        let entry = IndexEntry {
            id: "t1".to_string(),
            document: "battery die fast".to_string(),
            metadata,
        };
        let payload = entry_payload(&entry);
        assert_eq!(payload["document"], json!("battery die fast"));
        assert_eq!(payload["doc_id"], json!("t1"));
        assert_eq!(payload["sentiment_label"], json!("negative"));
        assert_eq!(payload["lda_dominant_topic"], json!(2));
    }

    #[test]
    fn points_without_doc_id_fall_back_to_point_id() {
        let points: Vec<ScoredPoint> = serde_json::from_value(json!([
            {"id": 17, "score": 0.5, "payload": {"document": "text", "source": "reddit"}}
        ]))
        .unwrap();
        let result = points_to_response(points, true).into_result();
        assert_eq!(result.ids(), vec!["17"]);
        assert_eq!(result.entries()[0].document, "text");
        assert_eq!(result.entries()[0].metadata["source"], MetaValue::from("reddit"));
        assert!(!result.entries()[0].metadata.contains_key("document"));
    }
}
