//! The enriched per-document record and its component value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::item::{SourceKind, SourceMeta};
use crate::CoreError;

/// Compound scores at or beyond this magnitude carry a polarity label.
pub const POLARITY_THRESHOLD: f64 = 0.05;

/// Four-component polarity scores. `compound` lies in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub compound: f64,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentScores {
    /// Scores for text with no tokens at all.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            compound: 0.0,
            positive: 0.0,
            neutral: 0.0,
            negative: 0.0,
        }
    }

    /// Scores carried by an item whose normalized text is empty.
    #[must_use]
    pub fn neutral_empty() -> Self {
        Self {
            compound: 0.0,
            positive: 0.0,
            neutral: 1.0,
            negative: 0.0,
        }
    }

    #[must_use]
    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_compound(self.compound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    #[must_use]
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POLARITY_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= -POLARITY_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            _ => Err(CoreError::InvalidSentimentLabel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityKind {
    Product,
    Brand,
    Organization,
    Person,
    Location,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Product,
        EntityKind::Brand,
        EntityKind::Organization,
        EntityKind::Person,
        EntityKind::Location,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Product => "PRODUCT",
            EntityKind::Brand => "BRAND",
            EntityKind::Organization => "ORGANIZATION",
            EntityKind::Person => "PERSON",
            EntityKind::Location => "LOCATION",
        }
    }
}

/// Entity mentions by kind. Each list is order-preserving and holds no
/// duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct EntityMap {
    pub product: Vec<String>,
    pub brand: Vec<String>,
    pub organization: Vec<String>,
    pub person: Vec<String>,
    pub location: Vec<String>,
}

impl EntityMap {
    #[must_use]
    pub fn get(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Product => &self.product,
            EntityKind::Brand => &self.brand,
            EntityKind::Organization => &self.organization,
            EntityKind::Person => &self.person,
            EntityKind::Location => &self.location,
        }
    }

    fn get_mut(&mut self, kind: EntityKind) -> &mut Vec<String> {
        match kind {
            EntityKind::Product => &mut self.product,
            EntityKind::Brand => &mut self.brand,
            EntityKind::Organization => &mut self.organization,
            EntityKind::Person => &mut self.person,
            EntityKind::Location => &mut self.location,
        }
    }

    /// Append `mention` unless the list already holds it. Returns whether it
    /// was added.
    pub fn insert(&mut self, kind: EntityKind, mention: impl Into<String>) -> bool {
        let mention = mention.into();
        let list = self.get_mut(kind);
        if list.contains(&mention) {
            return false;
        }
        list.push(mention);
        true
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|k| self.get(*k).is_empty())
    }
}

/// How aspect-sentiment pairs are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectMethod {
    #[default]
    #[serde(rename = "rule_based")]
    DependencyRule,
    #[serde(rename = "lexicon_simple")]
    ProximityLexicon,
}

impl AspectMethod {
    pub const SUPPORTED: &'static str = "rule_based, lexicon_simple";

    /// Tag attached to each pair the method emits.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AspectMethod::DependencyRule => "rule_based",
            AspectMethod::ProximityLexicon => "lexicon_simple",
        }
    }
}

impl fmt::Display for AspectMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rule_based" | "dependency" => Ok(AspectMethod::DependencyRule),
            "lexicon_simple" | "proximity" => Ok(AspectMethod::ProximityLexicon),
            other => Err(CoreError::UnknownAspectMethod {
                name: other.to_string(),
                supported: Self::SUPPORTED.to_string(),
            }),
        }
    }
}

/// One opinion about one aspect of the reviewed thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectSentiment {
    /// Lower-cased aspect text.
    pub aspect: String,
    pub sentiment: SentimentLabel,
    pub score: f64,
    pub sentiment_word: String,
    pub method: AspectMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermWeight {
    pub term: String,
    pub weight: f64,
}

/// Corpus-level statistics, filled at most once by the corpus stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusFeatures {
    pub tfidf_terms: Option<Vec<TermWeight>>,
    pub dominant_topic: Option<usize>,
    pub dominant_topic_prob: Option<f64>,
    pub topic_words: Option<Vec<String>>,
}

impl CorpusFeatures {
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.tfidf_terms.is_none()
            && self.dominant_topic.is_none()
            && self.dominant_topic_prob.is_none()
            && self.topic_words.is_none()
    }
}

/// One source text after per-document analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedItem {
    pub original_text: String,
    /// May be empty only when every other per-document feature is in its
    /// neutral empty state.
    pub normalized_text: String,
    pub source_kind: SourceKind,
    pub sentiment: SentimentScores,
    pub sentiment_label: SentimentLabel,
    pub entities: EntityMap,
    pub aspects: Vec<AspectSentiment>,
    pub meta: SourceMeta,
    pub corpus: CorpusFeatures,
}

impl AnalyzedItem {
    /// The neutral empty record for text that normalizes to nothing.
    #[must_use]
    pub fn empty(original_text: impl Into<String>, meta: SourceMeta) -> Self {
        Self {
            original_text: original_text.into(),
            normalized_text: String::new(),
            source_kind: meta.source_kind(),
            sentiment: SentimentScores::neutral_empty(),
            sentiment_label: SentimentLabel::Neutral,
            entities: EntityMap::default(),
            aspects: Vec::new(),
            meta,
            corpus: CorpusFeatures::default(),
        }
    }

    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.normalized_text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ForumPostMeta;

    #[test]
    fn label_thresholds_are_inclusive() {
        assert_eq!(SentimentLabel::from_compound(0.05), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_compound(-0.05), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_compound(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(0.049), SentimentLabel::Neutral);
    }

    #[test]
    fn sentiment_label_rejects_unknown() {
        assert!("angry".parse::<SentimentLabel>().is_err());
        assert_eq!(
            " Negative ".parse::<SentimentLabel>().unwrap(),
            SentimentLabel::Negative
        );
    }

    #[test]
    fn entity_insert_keeps_first_seen_order() {
        let mut map = EntityMap::default();
        assert!(map.insert(EntityKind::Product, "Ring"));
        assert!(map.insert(EntityKind::Product, "Wyze"));
        assert!(!map.insert(EntityKind::Product, "Ring"));
        assert_eq!(map.product, vec!["Ring", "Wyze"]);
    }

    #[test]
    fn aspect_method_parses_aliases_and_names_supported_set() {
        assert_eq!(
            "proximity".parse::<AspectMethod>().unwrap(),
            AspectMethod::ProximityLexicon
        );
        let err = "magic".parse::<AspectMethod>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("magic"));
        assert!(msg.contains("rule_based, lexicon_simple"));
    }

    #[test]
    fn empty_item_has_neutral_shape() {
        let item = AnalyzedItem::empty("", SourceMeta::ForumPost(ForumPostMeta::default()));
        assert_eq!(item.sentiment, SentimentScores::neutral_empty());
        assert!(item.entities.is_empty());
        assert!(item.aspects.is_empty());
        assert!(item.corpus.is_unset());
        assert_eq!(item.source_kind, SourceKind::ForumPost);
    }

    #[test]
    fn entity_map_serializes_with_uppercase_keys() {
        let mut map = EntityMap::default();
        map.insert(EntityKind::Brand, "Google");
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["BRAND"][0], "Google");
        assert!(json["PRODUCT"].as_array().unwrap().is_empty());
    }
}
