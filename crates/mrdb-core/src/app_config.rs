use std::path::PathBuf;

use crate::analyzed::AspectMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub tei_url: String,
    pub qdrant_url: String,
    pub qdrant_collection: String,
    pub vector_dim: usize,
    pub llm_url: Option<String>,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub llm_temperature: f64,
    pub retriever_k: usize,
    pub relevance_threshold: f64,
    pub aspect_method: AspectMethod,
    pub keywords_path: PathBuf,
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("tei_url", &self.tei_url)
            .field("qdrant_url", &self.qdrant_url)
            .field("qdrant_collection", &self.qdrant_collection)
            .field("vector_dim", &self.vector_dim)
            .field("llm_url", &self.llm_url)
            .field("llm_model", &self.llm_model)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_temperature", &self.llm_temperature)
            .field("retriever_k", &self.retriever_k)
            .field("relevance_threshold", &self.relevance_threshold)
            .field("aspect_method", &self.aspect_method)
            .field("keywords_path", &self.keywords_path)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}
