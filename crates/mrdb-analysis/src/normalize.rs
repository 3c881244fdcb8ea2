//! Text cleaning for review and forum content.
//!
//! The light form strips URLs, mentions, hash marks and emoji from
//! lower-cased text. The heavy form additionally lemmatizes and drops
//! stopwords and any token that is not purely alphabetic.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::lemma::lemmatize;
use crate::lexicon;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|www\.\S+").expect("valid url regex"));

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w+").expect("valid mention regex"));

static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F600}-\x{1F64F}",
        r"\x{1F300}-\x{1F5FF}",
        r"\x{1F680}-\x{1F6FF}",
        r"\x{1F700}-\x{1F77F}",
        r"\x{1F780}-\x{1F7FF}",
        r"\x{1F800}-\x{1F8FF}",
        r"\x{1F900}-\x{1F9FF}",
        r"\x{1FA00}-\x{1FA6F}",
        r"\x{1FA70}-\x{1FAFF}",
        r"\x{2600}-\x{26FF}",
        r"\x{2702}-\x{27B0}",
        r"\x{24C2}",
        r"\x{1F170}-\x{1F251}",
        "]+"
    ))
    .expect("valid emoji regex")
});

static IRREGULAR_NOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(can|won|shan)['’]t\b").expect("valid contraction regex"));

static NOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)n['’]t\b").expect("valid contraction regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// English stopwords, minus negators and words that carry sentiment.
static STOPWORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    stop_words::get(stop_words::LANGUAGE::English)
        .iter()
        .map(|w| w.to_string())
        .filter(|w| !lexicon::is_negator(w) && lexicon::valence(w).is_none())
        .collect()
});

#[must_use]
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Lower-case, strip URLs, `@mentions`, `#` marks and emoji, and collapse
/// whitespace. Hashtag words are kept.
#[must_use]
pub fn light_clean(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    let lowered = text.to_lowercase();
    let no_urls = URL_RE.replace_all(&lowered, "");
    let no_mentions = MENTION_RE.replace_all(&no_urls, "");
    let no_hashes = no_mentions.replace('#', "");
    let no_emoji = EMOJI_RE.replace_all(&no_hashes, "");
    WHITESPACE_RE.replace_all(&no_emoji, " ").trim().to_string()
}

/// Spell out `n't` as a separate `not` so the negation survives tokenizing.
fn expand_negations(text: &str) -> String {
    let irregular = IRREGULAR_NOT_RE.replace_all(text, |caps: &regex::Captures<'_>| {
        let base = match &caps[1] {
            "won" => "will",
            "shan" => "shall",
            other => other,
        };
        format!("{base} not")
    });
    NOT_RE.replace_all(&irregular, "$1 not").into_owned()
}

/// Light cleaning followed by lemmatization and stopword removal. Only
/// alphabetic lemmas survive.
#[must_use]
pub fn heavy_normalize(text: &str) -> String {
    let cleaned = expand_negations(&light_clean(text));
    let mut lemmas = Vec::new();
    for word in cleaned.unicode_words() {
        if !word.chars().all(char::is_alphabetic) || is_stopword(word) {
            continue;
        }
        let lemma = lemmatize(word);
        if lemma.is_empty() || is_stopword(&lemma) {
            continue;
        }
        lemmas.push(lemma);
    }
    lemmas.join(" ")
}

/// Normalized text for analysis: the heavy form, falling back to the light
/// form when the heavy form is empty.
#[must_use]
pub fn normalize_for_analysis(text: &str) -> String {
    let heavy = heavy_normalize(text);
    if !heavy.is_empty() {
        return heavy;
    }
    let light = light_clean(text);
    if !light.is_empty() {
        tracing::debug!(
            preview = %preview(text),
            "heavy normalization was empty; using light form"
        );
    }
    light
}

/// First 50 characters of `text`, for log lines.
pub(crate) fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}
