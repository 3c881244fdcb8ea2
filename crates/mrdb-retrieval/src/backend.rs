//! Seams to the external services: search, index storage, embedding, and
//! the language model.

use std::future::Future;

use mrdb_core::IndexEntry;

use crate::error::RetrievalError;
use crate::types::{MetaFilter, RawSearchResponse};

/// Read side of the index.
pub trait SearchBackend: Send + Sync {
    /// Up to `k` entries most similar to `query`, best first, optionally
    /// restricted by an equality filter.
    fn similarity(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetaFilter>,
    ) -> impl Future<Output = Result<RawSearchResponse, RetrievalError>> + Send;

    /// Up to `k` entries whose document text contains `needle`.
    fn keyword(
        &self,
        needle: &str,
        k: usize,
    ) -> impl Future<Output = Result<RawSearchResponse, RetrievalError>> + Send;
}

/// Write side of the index.
pub trait IndexStore: Send + Sync {
    /// Create the backing collection unless it already exists.
    fn ensure_collection(&self) -> impl Future<Output = Result<(), RetrievalError>> + Send;

    /// Insert or replace entries keyed by id. Returns how many were stored.
    fn upsert(
        &self,
        entries: &[IndexEntry],
    ) -> impl Future<Output = Result<usize, RetrievalError>> + Send;
}

pub trait Embedder: Send + Sync {
    /// One vector per input text, in input order.
    fn embed(
        &self,
        texts: &[&str],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, RetrievalError>> + Send;
}

pub trait LanguageModel: Send + Sync {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, RetrievalError>> + Send;
}
