//! Conversion of scraped product-listing and forum-thread dumps into
//! [`RawItem`]s.
//!
//! Dumps are JSON arrays. Entries that do not deserialize, reviews with
//! neither title nor comment, threads without an id, and comments without an
//! id or body are skipped with a log line; they never abort the batch.

use std::sync::LazyLock;

use mrdb_core::parse::{
    parse_price, parse_rating, parse_review_count, parse_timestamp, parse_timestamp_value,
};
use mrdb_core::{ForumCommentMeta, ForumPostMeta, ProductReviewMeta, RawItem, SourceMeta};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::AnalysisError;

static ASIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/dp/([A-Z0-9]{10})").expect("valid asin regex"));

static REVIEW_DATE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Reviewed in .*? on\s+").expect("valid review date regex"));

/// One scraped product page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListing {
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Price", default)]
    pub price: Option<String>,
    #[serde(rename = "Rating", default)]
    pub rating: Option<String>,
    #[serde(rename = "Review Count", default)]
    pub review_count: Option<String>,
    #[serde(default)]
    pub reviews: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductReview {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// One scraped forum thread: the opening post and its comments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForumThread {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub num_comments: Option<i64>,
    #[serde(default)]
    pub subreddit: Option<String>,
    #[serde(default)]
    pub created_utc: Option<serde_json::Value>,
    #[serde(default)]
    pub comments: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForumComment {
    #[serde(default)]
    pub comment_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub created_utc: Option<serde_json::Value>,
}

/// Parse a JSON array dump, skipping entries that do not deserialize.
///
/// # Errors
///
/// Returns [`AnalysisError::SourceDump`] if `json` is not a JSON array.
pub fn parse_dump<T: DeserializeOwned>(json: &str) -> Result<Vec<T>, AnalysisError> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| decode_entry(i, value, "dump entry"))
        .collect())
}

fn decode_entry<T: DeserializeOwned>(index: usize, value: serde_json::Value, what: &str) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!(index, error = %e, "skipping malformed {what}");
            None
        }
    }
}

/// Trimmed, non-empty text or `None`.
fn clean(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Like [`clean`], with line breaks flattened to spaces.
fn clean_flat(value: Option<&String>) -> Option<String> {
    clean(value).map(|s| s.replace(['\n', '\r'], " "))
}

/// Turn product listings into one item per review.
#[must_use]
pub fn product_listings(listings: &[ProductListing]) -> Vec<RawItem> {
    let mut items = Vec::new();

    for (i, listing) in listings.iter().enumerate() {
        let url = clean(listing.url.as_ref());
        let title = clean(listing.title.as_ref());
        let asin = url
            .as_deref()
            .and_then(|u| ASIN_RE.captures(u))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        let label = asin.clone().or_else(|| title.clone()).unwrap_or_else(|| i.to_string());

        if listing.reviews.is_empty() {
            tracing::debug!(product = %label, "no reviews for product");
            continue;
        }

        let price = listing.price.as_deref().and_then(parse_price);
        let overall = listing.rating.as_deref().and_then(parse_rating);
        let review_count = listing.review_count.as_deref().and_then(parse_review_count);

        for (r_idx, value) in listing.reviews.iter().enumerate() {
            let Some(review) = decode_entry::<ProductReview>(r_idx, value.clone(), "review") else {
                continue;
            };
            let review_title = clean(review.title.as_ref());
            let review_comment = clean(review.comment.as_ref());

            let text = match (&review_title, &review_comment) {
                (Some(t), Some(c)) => format!("{t}. {c}"),
                (Some(t), None) => t.clone(),
                (None, Some(c)) => c.clone(),
                (None, None) => {
                    tracing::debug!(product = %label, index = r_idx, "skipping empty review");
                    continue;
                }
            };

            let created_at = review.date.as_deref().and_then(|d| {
                let stripped = REVIEW_DATE_PREFIX_RE.replace(d, "");
                parse_timestamp(&stripped)
            });

            let meta = ProductReviewMeta {
                doc_id: format!("amazon_review_{}_{r_idx}", asin.as_deref().unwrap_or("unknown")),
                product_asin: asin.clone(),
                product_title: title.clone(),
                product_url: url.clone(),
                product_price: price,
                product_rating_overall: overall,
                product_review_count: review_count,
                review_rating: review_title.as_deref().and_then(parse_rating),
                review_title,
                review_comment,
                author: clean(review.author.as_ref()),
                created_at,
            };
            items.push(RawItem::new(text, SourceMeta::ProductReview(meta)));
        }
    }

    tracing::info!(listings = listings.len(), items = items.len(), "ingested product listings");
    items
}

/// Turn forum threads into one item per post with text plus one per comment.
#[must_use]
pub fn forum_threads(threads: &[ForumThread]) -> Vec<RawItem> {
    let mut items = Vec::new();

    for (i, thread) in threads.iter().enumerate() {
        let Some(post_id) = clean(thread.id.as_ref()) else {
            tracing::warn!(index = i, "skipping thread without post id");
            continue;
        };

        let post_title = clean_flat(thread.title.as_ref());
        let subreddit = clean(thread.subreddit.as_ref());
        let post_text = clean_flat(thread.selftext.as_ref()).or_else(|| post_title.clone());

        if let Some(text) = post_text {
            let meta = ForumPostMeta {
                doc_id: post_id.clone(),
                title: post_title.clone(),
                author: clean(thread.author.as_ref()),
                score: thread.score,
                url: clean(thread.url.as_ref()),
                permalink: Some(format!("https://www.reddit.com/comments/{post_id}/")),
                num_comments: thread.num_comments,
                subreddit: subreddit.clone(),
                created_at: thread.created_utc.as_ref().and_then(parse_timestamp_value),
            };
            items.push(RawItem::new(text, SourceMeta::ForumPost(meta)));
        }

        for (c_idx, value) in thread.comments.iter().enumerate() {
            let Some(comment) = decode_entry::<ForumComment>(c_idx, value.clone(), "comment") else {
                continue;
            };
            let comment_id = clean(comment.comment_id.as_ref()).or_else(|| clean(comment.id.as_ref()));
            let body = clean_flat(comment.body.as_ref());
            let (Some(comment_id), Some(body)) = (comment_id, body) else {
                tracing::debug!(post_id = %post_id, index = c_idx, "skipping empty or id-less comment");
                continue;
            };

            let meta = ForumCommentMeta {
                doc_id: format!("reddit_comment_{comment_id}"),
                permalink: Some(format!(
                    "https://www.reddit.com/comments/{post_id}/_/{comment_id}/"
                )),
                comment_id,
                post_id: Some(post_id.clone()),
                post_title: post_title.clone(),
                parent_id: clean(comment.parent_id.as_ref()),
                subreddit: subreddit.clone(),
                author: clean(comment.author.as_ref()),
                score: comment.score,
                created_at: comment.created_utc.as_ref().and_then(parse_timestamp_value),
            };
            items.push(RawItem::new(body, SourceMeta::ForumComment(meta)));
        }
    }

    tracing::info!(threads = threads.len(), items = items.len(), "ingested forum threads");
    items
}
