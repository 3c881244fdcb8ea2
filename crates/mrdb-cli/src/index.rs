//! `index`: processed items → Qdrant collection.

use std::path::Path;

use mrdb_analysis::to_index_entries;
use mrdb_core::AppConfig;
use mrdb_retrieval::{IndexStore, QdrantBackend, QdrantStore, TeiClient};

use crate::process::read_processed;

/// Qdrant backend embedding through TEI, as configured.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be built.
pub(crate) fn qdrant_backend(config: &AppConfig) -> anyhow::Result<QdrantBackend<TeiClient>> {
    let tei = TeiClient::new(&config.tei_url, config.http_timeout_secs)?;
    let store = QdrantStore::new(
        &config.qdrant_url,
        &config.qdrant_collection,
        config.vector_dim,
        config.http_timeout_secs,
    )?;
    Ok(QdrantBackend::new(store, tei))
}

/// Build index entries from `input` and upsert them.
///
/// With `dry_run`, entries are built and validated but nothing is sent.
///
/// # Errors
///
/// Returns an error on duplicate entry ids, unreadable input, or an
/// embedding/store failure.
pub(crate) async fn run_index(config: &AppConfig, input: &Path, dry_run: bool) -> anyhow::Result<()> {
    let analyzed = read_processed(input)?;
    let entries = to_index_entries(&analyzed)?;
    let skipped = analyzed.len() - entries.len();

    if dry_run {
        println!(
            "dry-run: would index {} entries into '{}' ({skipped} items skipped)",
            entries.len(),
            config.qdrant_collection
        );
        return Ok(());
    }

    let backend = qdrant_backend(config)?;
    backend.ensure_collection().await?;
    let stored = backend.upsert(&entries).await?;

    tracing::info!(
        collection = %config.qdrant_collection,
        stored,
        skipped,
        "indexing complete"
    );
    println!("indexed {stored} entries into '{}'", config.qdrant_collection);
    Ok(())
}
