//! `query`: retrieve documents for a question and, when a model is
//! configured, synthesize a research report.

use std::path::PathBuf;

use mrdb_analysis::to_index_entries;
use mrdb_core::AppConfig;
use mrdb_retrieval::{
    ChatClient, ConfidenceGate, HashingEmbedder, InMemoryBackend, IndexStore, Query,
    ResearchService, RetrievalEngine, RetrievalResult, SearchBackend, Strategy,
};

use crate::index::qdrant_backend;
use crate::process::read_processed;

/// Bucket count for the offline hashing embedder.
const OFFLINE_DIM: usize = 512;

#[derive(Debug)]
pub(crate) struct QueryArgs {
    pub question: String,
    pub strategy: Strategy,
    pub sentiment: Option<String>,
    pub k: Option<usize>,
    pub offline: Option<PathBuf>,
    pub retrieve_only: bool,
}

impl QueryArgs {
    fn to_query(&self, k: usize) -> Query {
        let query = Query::new(self.question.clone(), self.strategy, k);
        match &self.sentiment {
            Some(label) => query.with_sentiment(label.clone()),
            None => query,
        }
    }
}

fn print_result(result: &RetrievalResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result.entries())?);
    Ok(())
}

async fn retrieve<B: SearchBackend>(
    engine: &RetrievalEngine<B>,
    args: &QueryArgs,
    k: usize,
) -> anyhow::Result<RetrievalResult> {
    let result = engine.retrieve(&args.to_query(k)).await?;
    if result.is_empty() {
        tracing::warn!(strategy = %args.strategy, "no documents retrieved");
    }
    Ok(result)
}

/// Retrieval over a processed file held in memory. Needs no services.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds duplicate ids.
pub(crate) async fn run_offline_query(input: &std::path::Path, args: &QueryArgs) -> anyhow::Result<()> {
    let entries = to_index_entries(&read_processed(input)?)?;
    let backend = InMemoryBackend::new(HashingEmbedder::new(OFFLINE_DIM));
    backend.upsert(&entries).await?;
    tracing::info!(entries = backend.len(), "built in-memory index");

    let k = args.k.unwrap_or(10);
    let result = retrieve(&RetrievalEngine::new(backend), args, k).await?;
    print_result(&result)
}

/// Query the configured collection.
///
/// Prints the retrieved entries when `--retrieve-only` is set or no model
/// URL is configured; otherwise prints the research report.
///
/// # Errors
///
/// Returns an error on retrieval, model, or response-format failure.
pub(crate) async fn run_query(config: &AppConfig, args: &QueryArgs) -> anyhow::Result<()> {
    let engine = RetrievalEngine::new(qdrant_backend(config)?);
    let k = args.k.unwrap_or(config.retriever_k);

    let llm_url = match (&config.llm_url, args.retrieve_only) {
        (Some(url), false) => url,
        (None, false) => {
            tracing::warn!("MRDB_LLM_URL not set; printing retrieved documents only");
            return print_result(&retrieve(&engine, args, k).await?);
        }
        (_, true) => return print_result(&retrieve(&engine, args, k).await?),
    };

    let llm = ChatClient::new(
        llm_url,
        &config.llm_model,
        config.llm_temperature,
        config.llm_api_key.clone(),
        config.http_timeout_secs,
    )?;
    let service = ResearchService::new(
        engine,
        ConfidenceGate::new(config.relevance_threshold),
        llm,
    );

    let report = service.research_query(&args.to_query(k)).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
