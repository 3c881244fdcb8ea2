//! Text analytics for captured consumer feedback.
//!
//! Per-document stages (normalization, sentiment, entities, aspects) run
//! through [`DocumentAnalyzer`]; the batch [`corpus`] stage adds TF-IDF and
//! topic features; [`indexer`] turns the results into index-ready entries.
//! [`ingest`] converts scraped product-listing and forum-thread dumps into
//! the raw items the analyzer consumes.

pub mod analyzer;
pub mod aspects;
pub mod corpus;
pub mod entities;
pub mod error;
pub mod indexer;
pub mod ingest;
pub mod linguistic;
pub mod normalize;
pub mod scorer;

mod lemma;
mod lexicon;

pub use analyzer::DocumentAnalyzer;
pub use aspects::{parse_aspect_method, AspectExtractor};
pub use corpus::{compute as compute_corpus_features, CorpusFeatureConfig, CorpusFeatureReport};
pub use entities::EntityTagger;
pub use error::{AnalysisError, IndexError};
pub use indexer::to_index_entries;
pub use ingest::{forum_threads, parse_dump, product_listings, ForumThread, ProductListing};
pub use linguistic::{default_backend, HeuristicParser, LinguisticBackend, ParsedText};
pub use normalize::{heavy_normalize, light_clean, normalize_for_analysis};
pub use scorer::SentimentScorer;
