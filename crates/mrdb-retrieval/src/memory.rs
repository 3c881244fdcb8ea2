//! In-process index for tests and offline runs.
//!
//! Similarity is brute-force cosine over every stored vector; keyword search
//! is case-sensitive substring containment on the document text.

use std::sync::{PoisonError, RwLock};

use mrdb_core::{IndexEntry, MetaValue};

use crate::backend::{Embedder, IndexStore, SearchBackend};
use crate::error::RetrievalError;
use crate::types::{MetaFilter, OneOrNested, RawSearchResponse};

struct StoredEntry {
    entry: IndexEntry,
    vector: Vec<f32>,
}

pub struct InMemoryBackend<E> {
    embedder: E,
    entries: RwLock<Vec<StoredEntry>>,
}

impl<E> std::fmt::Debug for InMemoryBackend<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl<E> InMemoryBackend<E> {
    #[must_use]
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ranked(&self, query: &[f32], k: usize, filter: Option<&MetaFilter>) -> RawSearchResponse {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut scored: Vec<(f32, &IndexEntry)> = entries
            .iter()
            .filter(|s| filter.is_none_or(|f| matches_filter(&s.entry, f)))
            .map(|s| (cosine_similarity(query, &s.vector), &s.entry))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(k);

        let scores = scored.iter().map(|(s, _)| *s).collect();
        to_response(scored.into_iter().map(|(_, e)| e), Some(scores))
    }

    fn containing(&self, needle: &str, k: usize) -> RawSearchResponse {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let hits = entries
            .iter()
            .map(|s| &s.entry)
            .filter(|e| e.document.contains(needle))
            .take(k);
        to_response(hits, None)
    }
}

fn matches_filter(entry: &IndexEntry, filter: &MetaFilter) -> bool {
    entry
        .metadata
        .get(&filter.key)
        .and_then(MetaValue::as_str)
        .is_some_and(|v| v == filter.value)
}

fn to_response<'a>(
    entries: impl Iterator<Item = &'a IndexEntry>,
    scores: Option<Vec<f32>>,
) -> RawSearchResponse {
    let mut ids = Vec::new();
    let mut documents = Vec::new();
    let mut metadatas = Vec::new();
    for entry in entries {
        ids.push(entry.id.clone());
        documents.push(Some(entry.document.clone()));
        metadatas.push(Some(entry.metadata.clone()));
    }
    RawSearchResponse {
        ids: OneOrNested::Flat(ids),
        documents: OneOrNested::Flat(documents),
        metadatas: OneOrNested::Flat(metadatas),
        scores: scores.map(OneOrNested::Flat),
    }
}

/// Cosine similarity in `[-1, 1]`; `0.0` for empty or mismatched vectors.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

impl<E: Embedder> SearchBackend for InMemoryBackend<E> {
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
            .unwrap_or_default();
        Ok(self.ranked(&vector, k, filter))
    }

    async fn keyword(&self, needle: &str, k: usize) -> Result<RawSearchResponse, RetrievalError> {
        Ok(self.containing(needle, k))
    }
}

impl<E: Embedder> IndexStore for InMemoryBackend<E> {
    async fn ensure_collection(&self) -> Result<(), RetrievalError> {
        Ok(())
    }

    async fn upsert(&self, entries: &[IndexEntry]) -> Result<usize, RetrievalError> {
        let texts: Vec<&str> = entries.iter().map(|e| e.document.as_str()).collect();
        let vectors = self.embedder.embed(&texts).await?;

        let mut stored = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for (entry, vector) in entries.iter().zip(vectors) {
            stored.retain(|s| s.entry.id != entry.id);
            stored.push(StoredEntry {
                entry: entry.clone(),
                vector,
            });
        }
        Ok(entries.len())
    }
}

/// Dependency-free embedder: lower-cased alphanumeric tokens hashed into a
/// fixed number of buckets, L2-normalized. Texts sharing words score
/// higher; there is no semantic generalization.
#[derive(Debug, Clone, Copy)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    #[must_use]
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; self.dim];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            let bucket = usize::try_from(hash % self.dim as u64).unwrap_or_default();
            v[bucket] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

fn fnv1a(s: &str) -> u64 {
    s.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use mrdb_core::Metadata;

    use super::*;

    fn entry(id: &str, document: &str, label: &str) -> IndexEntry {
        let mut metadata = Metadata::new();
        metadata.insert("sentiment_label".to_string(), MetaValue::from(label));
        IndexEntry {
            id: id.to_string(),
            document: document.to_string(),
            metadata,
        }
    }

    async fn backend() -> InMemoryBackend<HashingEmbedder> {
        let backend = InMemoryBackend::new(HashingEmbedder::new(256));
        backend
            .upsert(&[
                entry("a", "battery life terrible", "negative"),
                entry("b", "night vision great", "positive"),
                entry("c", "battery great value", "positive"),
            ])
            .await
            .unwrap();
        backend
    }

    #[test]
    fn cosine_of_identical_and_orthogonal() {
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!(cosine_similarity(&[], &[]).abs() < f32::EPSILON);
        assert!(cosine_similarity(&[1.0], &[1.0, 2.0]).abs() < f32::EPSILON);
    }

    #[test]
    fn hashing_embedder_is_case_insensitive_and_normalized() {
        let e = HashingEmbedder::new(64);
        assert_eq!(e.vector("Battery LIFE"), e.vector("battery life"));
        let norm: f32 = e.vector("battery life").iter().map(|x| x * x).sum();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!(e.vector("").iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn similarity_ranks_by_shared_words() {
        let backend = backend().await;
        let result = backend.similarity("battery life", 2, None).await.unwrap().into_result();
        assert_eq!(result.ids()[0], "a");
        assert_eq!(result.len(), 2);
        assert!(result.top_score().unwrap() > 0.7);
    }

    #[tokio::test]
    async fn filter_restricts_by_label() {
        let backend = backend().await;
        let filter = MetaFilter::sentiment(mrdb_core::SentimentLabel::Positive);
        let result = backend
            .similarity("battery", 10, Some(&filter))
            .await
            .unwrap()
            .into_result();
        assert_eq!(result.ids()[0], "c");
        assert!(!result.ids().contains(&"a"));
    }

    #[tokio::test]
    async fn keyword_is_substring_containment() {
        let backend = backend().await;
        let result = backend.keyword("great", 10).await.unwrap().into_result();
        assert_eq!(result.ids(), vec!["b", "c"]);
        assert_eq!(result.top_score(), None);
        let bounded = backend.keyword("great", 1).await.unwrap().into_result();
        assert_eq!(bounded.len(), 1);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_ids() {
        let backend = backend().await;
        backend
            .upsert(&[entry("a", "replaced text", "neutral")])
            .await
            .unwrap();
        assert_eq!(backend.len(), 3);
        let result = backend.keyword("replaced", 5).await.unwrap().into_result();
        assert_eq!(result.ids(), vec!["a"]);
    }
}
