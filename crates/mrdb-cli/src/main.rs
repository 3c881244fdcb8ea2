mod index;
mod process;
mod query;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mrdb_analysis::CorpusFeatureConfig;
use mrdb_core::{AspectMethod, SourceKind};
use mrdb_retrieval::Strategy;
use tracing_subscriber::EnvFilter;

use crate::process::ProcessArgs;
use crate::query::QueryArgs;

#[derive(Debug, Parser)]
#[command(name = "mrdb-cli")]
#[command(about = "Consumer feedback analytics and retrieval")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze scraped dumps and write enriched items as JSON
    Process {
        /// Product listing dump (JSON array); repeatable
        #[arg(long = "listings")]
        listings: Vec<PathBuf>,
        /// Forum thread dump (JSON array); repeatable
        #[arg(long = "threads")]
        threads: Vec<PathBuf>,
        /// Where to write the processed items
        #[arg(long, short)]
        output: PathBuf,
        /// Global product keyword file
        #[arg(long, env = "MRDB_KEYWORDS_PATH", default_value = "./config/keywords.yaml")]
        keywords: PathBuf,
        /// Aspect extraction method (rule_based or lexicon_simple)
        #[arg(long, env = "MRDB_ASPECT_METHOD", default_value = "rule_based")]
        aspect_method: AspectMethod,
        /// Minimum document frequency for corpus vocabulary terms
        #[arg(long, default_value = "5")]
        min_df: usize,
        /// Maximum document share for corpus vocabulary terms
        #[arg(long, default_value = "0.95")]
        max_df: f64,
        /// Number of LDA topics
        #[arg(long, default_value = "10")]
        topics: usize,
    },
    /// Analyze one text and print the result as JSON
    Analyze {
        text: String,
        /// Source kind the text came from
        #[arg(long, default_value = "reddit_post")]
        source: SourceKind,
        /// Global product keyword file
        #[arg(long, env = "MRDB_KEYWORDS_PATH", default_value = "./config/keywords.yaml")]
        keywords: PathBuf,
        /// Aspect extraction method (rule_based or lexicon_simple)
        #[arg(long, env = "MRDB_ASPECT_METHOD", default_value = "rule_based")]
        aspect_method: AspectMethod,
    },
    /// Upsert processed items into the configured Qdrant collection
    Index {
        /// Processed items written by `process`
        #[arg(long, short)]
        input: PathBuf,
        /// Validate and count entries without contacting any service
        #[arg(long)]
        dry_run: bool,
    },
    /// Retrieve documents for a question and synthesize a report
    Query {
        question: String,
        /// similarity, similarity_filter_positive, similarity_filter_negative, keyword, or hybrid
        #[arg(long, default_value = "similarity")]
        strategy: Strategy,
        /// Sentiment label for the filter strategies (positive, neutral, negative)
        #[arg(long)]
        sentiment: Option<String>,
        /// Results per sub-query (defaults to MRDB_RETRIEVER_K)
        #[arg(long)]
        k: Option<usize>,
        /// Search a processed file in memory instead of Qdrant; retrieval only
        #[arg(long)]
        offline: Option<PathBuf>,
        /// Print retrieved documents instead of asking the model
        #[arg(long)]
        retrieve_only: bool,
    },
}

fn init_tracing() -> anyhow::Result<()> {
    let level = std::env::var("MRDB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Process {
            listings,
            threads,
            output,
            keywords,
            aspect_method,
            min_df,
            max_df,
            topics,
        } => {
            let args = ProcessArgs {
                listings,
                threads,
                output,
                keywords,
                aspect_method,
                corpus: CorpusFeatureConfig {
                    min_df,
                    max_df,
                    n_topics: topics,
                    ..CorpusFeatureConfig::default()
                },
            };
            process::run_process(&args)?;
        }
        Commands::Analyze {
            text,
            source,
            keywords,
            aspect_method,
        } => {
            let result = process::analyze_text(&text, source, &keywords, aspect_method)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Index { input, dry_run } => {
            let config = mrdb_core::load_app_config()?;
            index::run_index(&config, &input, dry_run).await?;
        }
        Commands::Query {
            question,
            strategy,
            sentiment,
            k,
            offline,
            retrieve_only,
        } => {
            let args = QueryArgs {
                question,
                strategy,
                sentiment,
                k,
                offline,
                retrieve_only,
            };
            if let Some(path) = &args.offline {
                query::run_offline_query(path, &args).await?;
            } else {
                let config = mrdb_core::load_app_config()?;
                query::run_query(&config, &args).await?;
            }
        }
    }

    Ok(())
}
