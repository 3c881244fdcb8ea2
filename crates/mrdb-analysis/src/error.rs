use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unsupported aspect method '{name}'; supported: {supported}")]
    UnknownAspectMethod { name: String, supported: &'static str },

    #[error("corpus feature stage '{stage}' failed: {detail}")]
    CorpusFeature { stage: &'static str, detail: String },

    #[error("malformed source dump: {0}")]
    SourceDump(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("duplicate document id '{0}'")]
    DuplicateId(String),
}
