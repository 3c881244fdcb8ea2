//! TEI (Text Embeddings Inference) client.

use std::time::Duration;

use serde::Serialize;

use crate::backend::Embedder;
use crate::error::RetrievalError;

/// Maximum number of texts per /embed call.
const BATCH_SIZE: usize = 64;

#[derive(Debug, Clone)]
pub struct TeiClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [&'a str],
}

impl TeiClient {
    /// # Errors
    ///
    /// Returns [`RetrievalError::Http`] if the HTTP client cannot be built.
    pub fn new(tei_url: &str, timeout_secs: u64) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/embed", tei_url.trim_end_matches('/')),
        })
    }

    /// Embed `texts` in batches of [`BATCH_SIZE`], preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Tei`] if a request fails, returns a non-2xx
    /// status, or answers with the wrong number of vectors.
    pub async fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = EmbedRequest { inputs: chunk };
            let response = self
                .client
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .map_err(|e| RetrievalError::Tei(format!("TEI request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(RetrievalError::Tei(format!(
                    "TEI returned status {}",
                    response.status()
                )));
            }

            let embeddings: Vec<Vec<f32>> = response
                .json()
                .await
                .map_err(|e| RetrievalError::Tei(format!("TEI response parse error: {e}")))?;

            if embeddings.len() != chunk.len() {
                return Err(RetrievalError::Tei(format!(
                    "TEI returned {} embeddings for {} inputs",
                    embeddings.len(),
                    chunk.len()
                )));
            }

            all_embeddings.extend(embeddings);
        }

        tracing::debug!(texts = texts.len(), "embedded texts");
        Ok(all_embeddings)
    }
}

impl Embedder for TeiClient {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        self.embed_texts(texts).await
    }
}
