//! Shared data model and configuration for the mrdb analytics workspace.
//!
//! Everything the analysis and retrieval crates exchange lives here: raw
//! captured items with their per-source metadata records, the enriched
//! [`AnalyzedItem`], index-ready [`IndexEntry`] values, and the environment
//! backed [`AppConfig`].

pub mod analyzed;
pub mod app_config;
pub mod config;
pub mod item;
pub mod keywords;
pub mod metadata;
pub mod parse;

pub use analyzed::{
    AnalyzedItem, AspectMethod, AspectSentiment, CorpusFeatures, EntityKind, EntityMap,
    SentimentLabel, SentimentScores, TermWeight, POLARITY_THRESHOLD,
};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use item::{
    ForumCommentMeta, ForumPostMeta, ProductReviewMeta, RawItem, SourceKind, SourceMeta,
};
pub use keywords::{load_keywords, KeywordsFile};
pub use metadata::{IndexEntry, MetaValue, Metadata};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read keywords file {path}: {source}")]
    KeywordsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse keywords file: {0}")]
    KeywordsFileParse(#[from] serde_yaml::Error),

    #[error("keywords validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unsupported aspect method '{name}'; supported: {supported}")]
    UnknownAspectMethod { name: String, supported: String },

    #[error("unsupported source kind '{0}'")]
    UnknownSourceKind(String),

    #[error("invalid sentiment label '{0}'; expected positive, neutral, or negative")]
    InvalidSentimentLabel(String),
}
