use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("unknown retrieval strategy '{name}'; supported: {supported}")]
    UnknownStrategy {
        name: String,
        supported: &'static str,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Qdrant error: {0}")]
    Qdrant(String),

    #[error("TEI embed error: {0}")]
    Tei(String),

    #[error("language model error: {0}")]
    Llm(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    ResponseFormat(#[from] ResponseFormatError),
}

/// The model's reply did not contain a usable JSON object. Carries the raw
/// reply for diagnosis.
#[derive(Debug, Error)]
#[error("unusable model response ({reason}); raw output: {raw}")]
pub struct ResponseFormatError {
    pub raw: String,
    pub reason: String,
}
