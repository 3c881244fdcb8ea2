//! Aspect-level sentiment extraction.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mrdb_core::{AspectMethod, AspectSentiment, SentimentLabel, POLARITY_THRESHOLD};

use crate::error::AnalysisError;
use crate::linguistic::{DepLabel, LinguisticBackend, ParsedText, Pos};
use crate::scorer::SentimentScorer;

/// Tokens scanned on each side of a noun chunk by the proximity method.
const PROXIMITY_WINDOW: usize = 3;

static NO_BACKEND_LOGGED: AtomicBool = AtomicBool::new(false);

/// Parse an aspect method name.
///
/// # Errors
///
/// Returns [`AnalysisError::UnknownAspectMethod`] naming the supported set.
pub fn parse_aspect_method(name: &str) -> Result<AspectMethod, AnalysisError> {
    name.parse::<AspectMethod>()
        .map_err(|_| AnalysisError::UnknownAspectMethod {
            name: name.to_string(),
            supported: AspectMethod::SUPPORTED,
        })
}

pub struct AspectExtractor {
    backend: Option<Arc<dyn LinguisticBackend>>,
    scorer: SentimentScorer,
}

impl std::fmt::Debug for AspectExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AspectExtractor")
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .finish_non_exhaustive()
    }
}

impl AspectExtractor {
    #[must_use]
    pub fn new(backend: Option<Arc<dyn LinguisticBackend>>, scorer: SentimentScorer) -> Self {
        Self { backend, scorer }
    }

    /// Extract (aspect, sentiment) pairs from normalized text. The first hit
    /// per aspect string wins. Returns nothing when the text is empty or no
    /// backend is available.
    #[must_use]
    pub fn extract(&self, text: &str, method: AspectMethod) -> Vec<AspectSentiment> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let Some(backend) = &self.backend else {
            if !NO_BACKEND_LOGGED.swap(true, Ordering::Relaxed) {
                tracing::warn!(method = %method, "no linguistic backend configured; skipping aspect extraction");
            }
            return Vec::new();
        };

        let parsed = backend.parse(text);
        match method {
            AspectMethod::DependencyRule => self.dependency_rule(&parsed),
            AspectMethod::ProximityLexicon => self.proximity_lexicon(&parsed),
        }
    }

    /// Compound score of an opinion-bearing token, if it passes the polarity
    /// threshold.
    fn opinion_score(&self, parsed: &ParsedText, index: usize) -> Option<f64> {
        let token = &parsed.tokens[index];
        if !matches!(token.pos, Pos::Adj | Pos::Adv) {
            return None;
        }
        let compound = self.scorer.word_compound(&token.text);
        (compound.abs() >= POLARITY_THRESHOLD).then_some(compound)
    }

    fn dependency_rule(&self, parsed: &ParsedText) -> Vec<AspectSentiment> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for (i, token) in parsed.tokens.iter().enumerate() {
            let Some(compound) = self.opinion_score(parsed, i) else {
                continue;
            };
            let Some(aspect_idx) = rule_target(parsed, i) else {
                continue;
            };
            let aspect = parsed.tokens[aspect_idx].text.to_lowercase();
            if !seen.insert(aspect.clone()) {
                continue;
            }
            out.push(AspectSentiment {
                aspect,
                sentiment: SentimentLabel::from_compound(compound),
                score: compound,
                sentiment_word: token.text.clone(),
                method: AspectMethod::DependencyRule,
            });
        }
        out
    }

    fn proximity_lexicon(&self, parsed: &ParsedText) -> Vec<AspectSentiment> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let len = parsed.tokens.len();

        for chunk in &parsed.noun_chunks {
            let aspect = parsed.chunk_text(chunk).to_lowercase();
            if aspect.is_empty() || seen.contains(&aspect) {
                continue;
            }
            let start = chunk.start.saturating_sub(PROXIMITY_WINDOW);
            let end = (chunk.end + PROXIMITY_WINDOW).min(len);

            let hit = (start..end).find_map(|i| self.opinion_score(parsed, i).map(|c| (i, c)));
            if let Some((i, compound)) = hit {
                seen.insert(aspect.clone());
                out.push(AspectSentiment {
                    aspect,
                    sentiment: SentimentLabel::from_compound(compound),
                    score: compound,
                    sentiment_word: parsed.tokens[i].text.clone(),
                    method: AspectMethod::ProximityLexicon,
                });
            }
        }
        out
    }
}

/// The noun an opinion token at `index` is about, by the first matching
/// rule: adjectival modifier of a noun, adverbial modifier of a verb with a
/// noun subject (else object), adverbial modifier of a passive auxiliary
/// whose verb has a noun passive subject.
fn rule_target(parsed: &ParsedText, index: usize) -> Option<usize> {
    let tokens = &parsed.tokens;
    let token = &tokens[index];
    let head = &tokens[token.head];

    if token.dep == DepLabel::Amod && head.pos == Pos::Noun {
        return Some(token.head);
    }

    if token.dep == DepLabel::Advmod && head.pos == Pos::Verb {
        let child_with = |dep: DepLabel| {
            parsed
                .children(token.head)
                .find(|&c| tokens[c].dep == dep && tokens[c].pos == Pos::Noun)
        };
        return child_with(DepLabel::Nsubj).or_else(|| child_with(DepLabel::Dobj));
    }

    if token.dep == DepLabel::Advmod
        && head.dep == DepLabel::Auxpass
        && tokens[head.head].pos == Pos::Verb
    {
        return parsed
            .children(head.head)
            .find(|&c| tokens[c].dep == DepLabel::Nsubjpass && tokens[c].pos == Pos::Noun);
    }

    None
}
