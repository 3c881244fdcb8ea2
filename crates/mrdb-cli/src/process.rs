//! `process`: scraped dumps → analyzed items with corpus features.

use std::path::{Path, PathBuf};

use anyhow::Context;
use mrdb_analysis::{
    compute_corpus_features, forum_threads, light_clean, parse_dump, product_listings,
    CorpusFeatureConfig, DocumentAnalyzer, ForumThread, ProductListing,
};
use mrdb_core::{load_keywords, AnalyzedItem, AspectMethod, RawItem, SourceKind, SourceMeta};
use serde_json::json;

/// Inputs and tuning for one `process` run.
#[derive(Debug)]
pub(crate) struct ProcessArgs {
    pub listings: Vec<PathBuf>,
    pub threads: Vec<PathBuf>,
    pub output: PathBuf,
    pub keywords: PathBuf,
    pub aspect_method: AspectMethod,
    pub corpus: CorpusFeatureConfig,
}

fn read_dump(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Collect raw items from every listing and thread dump, in argument order.
///
/// # Errors
///
/// Returns an error if a file cannot be read or is not a JSON array.
pub(crate) fn load_raw_items(listings: &[PathBuf], threads: &[PathBuf]) -> anyhow::Result<Vec<RawItem>> {
    let mut items = Vec::new();

    for path in listings {
        let parsed: Vec<ProductListing> = parse_dump(&read_dump(path)?)
            .with_context(|| format!("invalid product listing dump {}", path.display()))?;
        let raw = product_listings(&parsed);
        tracing::info!(path = %path.display(), listings = parsed.len(), items = raw.len(), "loaded product listings");
        items.extend(raw);
    }

    for path in threads {
        let parsed: Vec<ForumThread> = parse_dump(&read_dump(path)?)
            .with_context(|| format!("invalid forum thread dump {}", path.display()))?;
        let raw = forum_threads(&parsed);
        tracing::info!(path = %path.display(), threads = parsed.len(), items = raw.len(), "loaded forum threads");
        items.extend(raw);
    }

    Ok(items)
}

/// Read analyzed items written by a previous `process` run.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub(crate) fn read_processed(path: &Path) -> anyhow::Result<Vec<AnalyzedItem>> {
    let content = read_dump(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a processed item file", path.display()))
}

/// Analyze every item, add corpus features, and write the result as JSON.
///
/// # Errors
///
/// Returns an error if inputs cannot be loaded or the output cannot be
/// written. Corpus feature failures are logged, not returned.
pub(crate) fn run_process(args: &ProcessArgs) -> anyhow::Result<()> {
    if args.listings.is_empty() && args.threads.is_empty() {
        anyhow::bail!("nothing to process; pass --listings and/or --threads");
    }

    let keywords = load_keywords(&args.keywords)?.keywords;
    let raw = load_raw_items(&args.listings, &args.threads)?;

    let analyzer = DocumentAnalyzer::with_default_backend(&keywords);
    let mut analyzed = analyzer.analyze_batch(&raw, args.aspect_method);

    let report = compute_corpus_features(&mut analyzed, &args.corpus);
    if let Some(e) = &report.tfidf_error {
        tracing::warn!(error = %e, "TF-IDF features unavailable");
    }
    if let Some(e) = &report.topic_error {
        tracing::warn!(error = %e, "topic features unavailable");
    }

    let json = serde_json::to_string_pretty(&analyzed)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    let with_text = analyzed.iter().filter(|a| a.has_text()).count();
    println!(
        "processed {} items ({with_text} with text, vocabulary {}) → {}",
        analyzed.len(),
        report.vocabulary_size,
        args.output.display()
    );
    Ok(())
}

/// Analyze a single text and report its purchase-phrase product mentions
/// alongside the full analysis.
///
/// # Errors
///
/// Returns an error if the keyword file cannot be loaded.
pub(crate) fn analyze_text(
    text: &str,
    kind: SourceKind,
    keywords: &Path,
    method: AspectMethod,
) -> anyhow::Result<serde_json::Value> {
    let keywords = load_keywords(keywords)?.keywords;
    let analyzer = DocumentAnalyzer::with_default_backend(&keywords);

    let meta = SourceMeta::Unidentified {
        kind,
        fields: std::collections::BTreeMap::new(),
    };
    let analysis = analyzer.analyze(text, meta, &[], method);
    let mentions = analyzer.tagger().product_mentions(&light_clean(text));

    Ok(json!({
        "product_mentions": mentions,
        "analysis": analysis,
    }))
}
