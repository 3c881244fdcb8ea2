//! Captured source items and their per-source metadata records.
//!
//! Each source kind carries its own typed metadata record instead of a
//! free-form map. The records share a uniform accessor surface (`doc_id`,
//! `created_at`, `author`, `rating`) so downstream stages never need to know
//! which source an item came from.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::{insert_opt, MetaValue, Metadata};
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "amazon_review")]
    ProductReview,
    #[serde(rename = "reddit_post")]
    ForumPost,
    #[serde(rename = "reddit_comment")]
    ForumComment,
}

impl SourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::ProductReview => "amazon_review",
            SourceKind::ForumPost => "reddit_post",
            SourceKind::ForumComment => "reddit_comment",
        }
    }

    /// Name of the originating platform.
    #[must_use]
    pub fn platform(self) -> &'static str {
        match self {
            SourceKind::ProductReview => "amazon",
            SourceKind::ForumPost | SourceKind::ForumComment => "reddit",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amazon_review" | "product_review" => Ok(SourceKind::ProductReview),
            "reddit_post" | "forum_post" => Ok(SourceKind::ForumPost),
            "reddit_comment" | "forum_comment" => Ok(SourceKind::ForumComment),
            other => Err(CoreError::UnknownSourceKind(other.to_string())),
        }
    }
}

/// Metadata for one product review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductReviewMeta {
    pub doc_id: String,
    pub product_asin: Option<String>,
    pub product_title: Option<String>,
    pub product_url: Option<String>,
    pub product_price: Option<f64>,
    pub product_rating_overall: Option<f64>,
    pub product_review_count: Option<i64>,
    pub review_title: Option<String>,
    pub review_comment: Option<String>,
    pub review_rating: Option<f64>,
    pub author: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Metadata for one forum thread's opening post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForumPostMeta {
    pub doc_id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub score: Option<i64>,
    pub url: Option<String>,
    pub permalink: Option<String>,
    pub num_comments: Option<i64>,
    pub subreddit: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Metadata for one forum comment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForumCommentMeta {
    pub doc_id: String,
    pub comment_id: String,
    pub post_id: Option<String>,
    pub post_title: Option<String>,
    pub parent_id: Option<String>,
    pub subreddit: Option<String>,
    pub author: Option<String>,
    pub score: Option<i64>,
    pub permalink: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Per-source metadata, tagged by source type.
///
/// `Unidentified` holds items captured without a typed record; its map may
/// still carry a `doc_id` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source_type")]
pub enum SourceMeta {
    #[serde(rename = "amazon_review")]
    ProductReview(ProductReviewMeta),
    #[serde(rename = "reddit_post")]
    ForumPost(ForumPostMeta),
    #[serde(rename = "reddit_comment")]
    ForumComment(ForumCommentMeta),
    #[serde(rename = "unidentified")]
    Unidentified {
        kind: SourceKind,
        #[serde(default)]
        fields: BTreeMap<String, MetaValue>,
    },
}

impl SourceMeta {
    #[must_use]
    pub fn source_kind(&self) -> SourceKind {
        match self {
            SourceMeta::ProductReview(_) => SourceKind::ProductReview,
            SourceMeta::ForumPost(_) => SourceKind::ForumPost,
            SourceMeta::ForumComment(_) => SourceKind::ForumComment,
            SourceMeta::Unidentified { kind, .. } => *kind,
        }
    }

    /// The designated unique id. Empty ids count as missing.
    #[must_use]
    pub fn doc_id(&self) -> Option<&str> {
        let id = match self {
            SourceMeta::ProductReview(m) => Some(m.doc_id.as_str()),
            SourceMeta::ForumPost(m) => Some(m.doc_id.as_str()),
            SourceMeta::ForumComment(m) => Some(m.doc_id.as_str()),
            SourceMeta::Unidentified { fields, .. } => {
                fields.get("doc_id").and_then(MetaValue::as_str)
            }
        };
        id.map(str::trim).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SourceMeta::ProductReview(m) => m.created_at,
            SourceMeta::ForumPost(m) => m.created_at,
            SourceMeta::ForumComment(m) => m.created_at,
            SourceMeta::Unidentified { fields, .. } => fields
                .get("created_iso")
                .and_then(MetaValue::as_str)
                .and_then(crate::parse::parse_timestamp),
        }
    }

    #[must_use]
    pub fn author(&self) -> Option<&str> {
        match self {
            SourceMeta::ProductReview(m) => m.author.as_deref(),
            SourceMeta::ForumPost(m) => m.author.as_deref(),
            SourceMeta::ForumComment(m) => m.author.as_deref(),
            SourceMeta::Unidentified { fields, .. } => {
                fields.get("author").and_then(MetaValue::as_str)
            }
        }
    }

    #[must_use]
    pub fn rating(&self) -> Option<f64> {
        match self {
            SourceMeta::ProductReview(m) => m.review_rating,
            SourceMeta::ForumPost(_) | SourceMeta::ForumComment(_) => None,
            SourceMeta::Unidentified { fields, .. } => {
                fields.get("rating").and_then(MetaValue::as_f64)
            }
        }
    }

    /// Keywords describing the item's context (product title, subreddit, ...)
    /// that the entity tagger treats as additional product keywords.
    #[must_use]
    pub fn contextual_keywords(&self) -> Vec<String> {
        let candidates: Vec<Option<&String>> = match self {
            SourceMeta::ProductReview(m) => vec![m.product_title.as_ref(), m.product_asin.as_ref()],
            SourceMeta::ForumPost(m) => vec![m.subreddit.as_ref()],
            SourceMeta::ForumComment(m) => vec![m.subreddit.as_ref(), m.post_title.as_ref()],
            SourceMeta::Unidentified { .. } => Vec::new(),
        };
        candidates
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Flatten the record into scalar metadata. `None` fields are omitted.
    #[must_use]
    pub fn to_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        meta.insert(
            "source".to_string(),
            self.source_kind().platform().into(),
        );
        if let Some(id) = self.doc_id() {
            meta.insert("doc_id".to_string(), id.into());
        }
        insert_opt(&mut meta, "author", self.author());
        insert_opt(
            &mut meta,
            "created_iso",
            self.created_at().map(|dt| dt.to_rfc3339()),
        );

        match self {
            SourceMeta::ProductReview(m) => {
                insert_opt(&mut meta, "product_asin", m.product_asin.clone());
                insert_opt(&mut meta, "product_title", m.product_title.clone());
                insert_opt(&mut meta, "product_url", m.product_url.clone());
                insert_opt(&mut meta, "product_price", m.product_price);
                insert_opt(&mut meta, "product_rating_overall", m.product_rating_overall);
                insert_opt(&mut meta, "product_review_count", m.product_review_count);
                insert_opt(&mut meta, "review_title_orig", m.review_title.clone());
                insert_opt(&mut meta, "review_comment_orig", m.review_comment.clone());
                insert_opt(&mut meta, "review_rating", m.review_rating);
            }
            SourceMeta::ForumPost(m) => {
                insert_opt(&mut meta, "title_orig", m.title.clone());
                insert_opt(&mut meta, "score", m.score);
                insert_opt(&mut meta, "url", m.url.clone());
                insert_opt(&mut meta, "permalink", m.permalink.clone());
                insert_opt(&mut meta, "num_comments", m.num_comments);
                insert_opt(&mut meta, "subreddit", m.subreddit.clone());
            }
            SourceMeta::ForumComment(m) => {
                meta.insert("comment_id".to_string(), m.comment_id.clone().into());
                insert_opt(&mut meta, "post_id", m.post_id.clone());
                insert_opt(&mut meta, "post_title_orig", m.post_title.clone());
                insert_opt(&mut meta, "parent_id", m.parent_id.clone());
                insert_opt(&mut meta, "subreddit", m.subreddit.clone());
                insert_opt(&mut meta, "score", m.score);
                insert_opt(&mut meta, "permalink", m.permalink.clone());
            }
            SourceMeta::Unidentified { fields, .. } => {
                for (k, v) in fields {
                    meta.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }
        }

        meta
    }
}

/// One captured piece of source text. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    text: String,
    meta: SourceMeta,
}

impl RawItem {
    #[must_use]
    pub fn new(text: impl Into<String>, meta: SourceMeta) -> Self {
        Self {
            text: text.into(),
            meta,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn meta(&self) -> &SourceMeta {
        &self.meta
    }

    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.meta.source_kind()
    }

    #[must_use]
    pub fn rating(&self) -> Option<f64> {
        self.meta.rating()
    }

    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.meta.author()
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.meta.created_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_meta() -> ProductReviewMeta {
        ProductReviewMeta {
            doc_id: "amazon_review_B0TEST1234_0".to_string(),
            product_asin: Some("B0TEST1234".to_string()),
            product_title: Some("Nest Cam".to_string()),
            review_rating: Some(4.0),
            ..ProductReviewMeta::default()
        }
    }

    #[test]
    fn doc_id_treats_blank_as_missing() {
        let meta = SourceMeta::ForumPost(ForumPostMeta {
            doc_id: "  ".to_string(),
            ..ForumPostMeta::default()
        });
        assert_eq!(meta.doc_id(), None);
    }

    #[test]
    fn unidentified_reads_doc_id_from_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("doc_id".to_string(), MetaValue::from("custom-1"));
        let meta = SourceMeta::Unidentified {
            kind: SourceKind::ForumPost,
            fields,
        };
        assert_eq!(meta.doc_id(), Some("custom-1"));
        assert_eq!(meta.source_kind(), SourceKind::ForumPost);
    }

    #[test]
    fn contextual_keywords_for_review_are_title_then_asin() {
        let meta = SourceMeta::ProductReview(review_meta());
        assert_eq!(
            meta.contextual_keywords(),
            vec!["Nest Cam".to_string(), "B0TEST1234".to_string()]
        );
    }

    #[test]
    fn to_metadata_omits_missing_fields() {
        let meta = SourceMeta::ProductReview(review_meta()).to_metadata();
        assert_eq!(
            meta.get("doc_id"),
            Some(&MetaValue::from("amazon_review_B0TEST1234_0"))
        );
        assert_eq!(meta.get("review_rating"), Some(&MetaValue::Float(4.0)));
        assert!(!meta.contains_key("product_url"));
        assert!(!meta.contains_key("author"));
    }

    #[test]
    fn serde_tags_by_source_type() {
        let meta = SourceMeta::ProductReview(review_meta());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["source_type"], "amazon_review");
        let back: SourceMeta = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn source_kind_parses_aliases() {
        assert_eq!(
            "forum_comment".parse::<SourceKind>().unwrap(),
            SourceKind::ForumComment
        );
        assert!("tweet".parse::<SourceKind>().is_err());
    }
}
