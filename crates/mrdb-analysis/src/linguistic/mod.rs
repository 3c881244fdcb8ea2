//! Syntactic annotation consumed by entity tagging and aspect extraction.
//!
//! A [`LinguisticBackend`] turns text into tokens carrying a part of speech,
//! a dependency label and a head index, plus noun chunks and named-entity
//! spans. [`HeuristicParser`] is the bundled backend; callers may supply
//! their own.

mod heuristic;

use std::ops::Range;
use std::sync::{Arc, LazyLock};

use mrdb_core::EntityKind;

pub use heuristic::HeuristicParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pos {
    Noun,
    Propn,
    Verb,
    Aux,
    Adj,
    Adv,
    Det,
    Pron,
    Adp,
    Cconj,
    Part,
    Num,
    Intj,
    X,
}

impl Pos {
    #[must_use]
    pub fn is_nominal(self) -> bool {
        matches!(self, Pos::Noun | Pos::Propn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepLabel {
    Amod,
    Advmod,
    Nsubj,
    Dobj,
    Nsubjpass,
    Auxpass,
    Acomp,
    Compound,
    Det,
    Root,
    Dep,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: Pos,
    pub dep: DepLabel,
    /// Index of the governing token. The root points at itself.
    pub head: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpan {
    pub text: String,
    pub kind: EntityKind,
}

/// One parsed text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedText {
    pub tokens: Vec<Token>,
    /// Token ranges of base noun phrases, in order.
    pub noun_chunks: Vec<Range<usize>>,
    pub entities: Vec<EntitySpan>,
}

impl ParsedText {
    /// Indices of the tokens whose head is `index`.
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(i, t)| *i != index && t.head == index)
            .map(|(i, _)| i)
    }

    #[must_use]
    pub fn chunk_text(&self, chunk: &Range<usize>) -> String {
        self.tokens[chunk.clone()]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub trait LinguisticBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(&self, text: &str) -> ParsedText;
}

static DEFAULT_BACKEND: LazyLock<Arc<dyn LinguisticBackend>> =
    LazyLock::new(|| Arc::new(HeuristicParser::new()));

/// The process-wide bundled backend.
#[must_use]
pub fn default_backend() -> Arc<dyn LinguisticBackend> {
    Arc::clone(&DEFAULT_BACKEND)
}
