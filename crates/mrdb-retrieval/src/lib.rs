//! Retrieval and report synthesis over indexed consumer feedback.
//!
//! [`RetrievalEngine`] answers a [`Query`] through a [`SearchBackend`]
//! (Qdrant over HTTP, or the in-memory backend), fusing hybrid results.
//! [`ResearchService`] gates the result on relevance, assembles a prompt,
//! calls a [`LanguageModel`], and parses the reply into a
//! [`ResearchReport`].

pub mod backend;
pub mod context;
pub mod engine;
pub mod error;
pub mod gate;
pub mod memory;
pub mod qdrant;
pub mod response;
pub mod service;
pub mod types;

mod embeddings;
mod llm;

pub use backend::{Embedder, IndexStore, LanguageModel, SearchBackend};
pub use context::{assemble_context, build_prompt, format_entry};
pub use embeddings::TeiClient;
pub use engine::{fuse, RetrievalEngine};
pub use error::{ResponseFormatError, RetrievalError};
pub use gate::{ConfidenceGate, GateOutcome, DEFAULT_RELEVANCE_THRESHOLD};
pub use llm::ChatClient;
pub use memory::{HashingEmbedder, InMemoryBackend};
pub use qdrant::{QdrantBackend, QdrantStore};
pub use response::{extract_json, ResearchReport};
pub use service::ResearchService;
pub use types::{MetaFilter, Query, RetrievalResult, RetrievedEntry, Strategy};
