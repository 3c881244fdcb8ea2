//! Keyword and statistical named-entity tagging.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use mrdb_core::{EntityKind, EntityMap};
use regex::Regex;

use crate::linguistic::LinguisticBackend;

static NO_BACKEND_LOGGED: AtomicBool = AtomicBool::new(false);

static PURCHASE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)my new (\w+)",
        r"(?i)just bought (?:a|an) (\w+)",
        r"(?i)purchased (?:a|an) (\w+)",
        r"(?i)ordered (?:a|an) (\w+)",
        r"(?i)got (?:a|an) (\w+)",
        r"(?i)using (?:a|an) (\w+)",
        r"(?i)reviewed? (?:a|an) (\w+)",
        r"(?i)trying? (?:a|an) (\w+)",
        r"(?i)love (?:my|this) (\w+)",
        r"(?i)hate (?:my|this) (\w+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid purchase pattern"))
    .collect()
});

/// A product keyword with its whole-word, case-insensitive matcher.
#[derive(Debug, Clone)]
struct KeywordPattern {
    keyword: String,
    pattern: Regex,
}

impl KeywordPattern {
    fn compile(keyword: &str) -> Option<Self> {
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            return None;
        }
        match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(trimmed))) {
            Ok(pattern) => Some(Self {
                keyword: trimmed.to_string(),
                pattern,
            }),
            Err(e) => {
                tracing::warn!(keyword = trimmed, error = %e, "skipping unmatchable keyword");
                None
            }
        }
    }

    fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Tags PRODUCT mentions from keyword lists and ORGANIZATION, BRAND,
/// PERSON and LOCATION mentions from the linguistic backend.
pub struct EntityTagger {
    keywords: Vec<KeywordPattern>,
    backend: Option<Arc<dyn LinguisticBackend>>,
}

impl std::fmt::Debug for EntityTagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityTagger")
            .field("keywords", &self.keywords.len())
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .finish()
    }
}

impl EntityTagger {
    #[must_use]
    pub fn new(keywords: &[String], backend: Option<Arc<dyn LinguisticBackend>>) -> Self {
        Self {
            keywords: keywords
                .iter()
                .filter_map(|k| KeywordPattern::compile(k))
                .collect(),
            backend,
        }
    }

    /// Tag `text`. Global keywords are checked before `contextual` ones; all
    /// lists keep first-seen order without duplicates.
    #[must_use]
    pub fn tag(&self, text: &str, contextual: &[String]) -> EntityMap {
        let mut entities = EntityMap::default();
        if text.trim().is_empty() {
            return entities;
        }

        for kw in &self.keywords {
            if kw.is_match(text) {
                entities.insert(EntityKind::Product, kw.keyword.clone());
            }
        }
        for kw in contextual.iter().filter_map(|k| KeywordPattern::compile(k)) {
            if kw.is_match(text) {
                entities.insert(EntityKind::Product, kw.keyword);
            }
        }

        let Some(backend) = &self.backend else {
            if !NO_BACKEND_LOGGED.swap(true, Ordering::Relaxed) {
                tracing::warn!("no linguistic backend configured; only PRODUCT entities will be tagged");
            }
            return entities;
        };

        for span in backend.parse(text).entities {
            match span.kind {
                EntityKind::Organization => {
                    entities.insert(EntityKind::Organization, span.text.clone());
                    entities.insert(EntityKind::Brand, span.text);
                }
                EntityKind::Person | EntityKind::Location => {
                    entities.insert(span.kind, span.text);
                }
                EntityKind::Product | EntityKind::Brand => {}
            }
        }

        entities
    }

    /// Product mentions from the global keywords plus purchase phrasing such
    /// as "just bought a X" or "love this X".
    #[must_use]
    pub fn product_mentions(&self, text: &str) -> Vec<String> {
        let mut mentions: Vec<String> = Vec::new();
        let mut push = |m: String| {
            if !mentions.contains(&m) {
                mentions.push(m);
            }
        };

        for kw in &self.keywords {
            if kw.is_match(text) {
                push(kw.keyword.clone());
            }
        }
        for pattern in PURCHASE_PATTERNS.iter() {
            for caps in pattern.captures_iter(text) {
                if let Some(m) = caps.get(1) {
                    push(m.as_str().to_string());
                }
            }
        }
        mentions
    }
}
