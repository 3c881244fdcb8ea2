//! Rule-based English lemmatizer.
//!
//! Irregular forms come from a fixed table. Regular inflections are undone by
//! suffix rules: plural `-s`/`-es`/`-ies` always, `-ed`/`-ing`/`-s` verb
//! endings only when the recovered stem is a known verb base. Words that carry
//! sentiment valence are never reduced ("amazing" stays "amazing"), and
//! singular nouns that only look plural ("lens", "series") are kept as-is.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::lexicon;

const IRREGULAR: &[(&str, &str)] = &[
    ("am", "be"),
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("doing", "do"),
    ("went", "go"),
    ("gone", "go"),
    ("goes", "go"),
    ("made", "make"),
    ("bought", "buy"),
    ("brought", "bring"),
    ("thought", "think"),
    ("got", "get"),
    ("gotten", "get"),
    ("gave", "give"),
    ("given", "give"),
    ("took", "take"),
    ("taken", "take"),
    ("came", "come"),
    ("saw", "see"),
    ("seen", "see"),
    ("said", "say"),
    ("told", "tell"),
    ("found", "find"),
    ("felt", "feel"),
    ("kept", "keep"),
    ("left", "leave"),
    ("paid", "pay"),
    ("sent", "send"),
    ("spent", "spend"),
    ("built", "build"),
    ("broke", "break"),
    ("broken", "break"),
    ("wrote", "write"),
    ("written", "write"),
    ("ran", "run"),
    ("knew", "know"),
    ("known", "know"),
    ("held", "hold"),
    ("stood", "stand"),
    ("understood", "understand"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("began", "begin"),
    ("begun", "begin"),
    ("became", "become"),
    ("lost", "lose"),
    ("meant", "mean"),
    ("met", "meet"),
    ("sold", "sell"),
    ("shipped", "ship"),
    ("stopped", "stop"),
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("batteries", "battery"),
    ("lenses", "lens"),
    ("knives", "knife"),
    ("lives", "life"),
    ("wives", "wife"),
    ("leaves", "leaf"),
    ("shelves", "shelf"),
    ("halves", "half"),
];

/// Words ending in `s` that are not plurals, or whose plural is the same form.
const INVARIANT: &[&str] = &[
    "always", "chaos", "corps", "diabetes", "headquarters", "ios", "kudos", "lens", "news",
    "perhaps", "physics", "series", "species", "thanks", "whereas", "yes",
];

/// Common verb base forms. Also used by the heuristic tagger.
pub(crate) const VERB_BASES: &[&str] = &[
    "arrive", "ask", "break", "bring", "buy", "call", "cancel", "change", "charge", "check",
    "choose", "clean", "click", "close", "come", "connect", "cost", "crash", "create", "cut",
    "deliver", "detect", "die", "disconnect", "do", "download", "drain", "drop", "enjoy", "expect",
    "fail", "fall", "feel", "find", "fit", "fix", "follow", "freeze", "get", "give", "go",
    "happen", "hear", "help", "hold", "include", "install", "keep", "know", "last", "leave", "let",
    "load", "look", "lose", "make", "mean", "miss", "mount", "move", "need", "notice", "offer",
    "open", "order", "own", "pair", "pay", "pick", "place", "plan", "play", "plug", "purchase",
    "put", "reach", "read", "receive", "record", "reset", "respond", "return", "review", "run",
    "save", "say", "see", "seem", "sell", "send", "set", "setup", "ship", "show", "start", "stay",
    "stop", "stream", "subscribe", "switch", "take", "talk", "tell", "test", "think", "try",
    "turn", "update", "upgrade", "use", "wait", "want", "watch", "work", "write",
];

static IRREGULAR_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| IRREGULAR.iter().copied().collect());

static INVARIANT_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| INVARIANT.iter().copied().collect());

static VERB_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| VERB_BASES.iter().copied().collect());

#[must_use]
pub fn is_verb_base(word: &str) -> bool {
    VERB_SET.contains(word)
}

/// Recover the verb base of an inflected form, if it is one.
#[must_use]
pub fn verb_base(word: &str) -> Option<String> {
    if let Some(base) = IRREGULAR_MAP.get(word) {
        return Some((*base).to_string());
    }
    for suffix in ["ing", "ed", "es", "s"] {
        let Some(stem) = word.strip_suffix(suffix) else {
            continue;
        };
        if stem.len() < 2 {
            continue;
        }
        if is_verb_base(stem) {
            return Some(stem.to_string());
        }
        let with_e = format!("{stem}e");
        if suffix != "es" && is_verb_base(&with_e) {
            return Some(with_e);
        }
        if let Some(undoubled) = undouble(stem) {
            if is_verb_base(undoubled) {
                return Some(undoubled.to_string());
            }
        }
        if let Some(y_stem) = stem.strip_suffix('i') {
            let with_y = format!("{y_stem}y");
            if is_verb_base(&with_y) {
                return Some(with_y);
            }
        }
    }
    None
}

fn undouble(stem: &str) -> Option<&str> {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n >= 3
        && bytes[n - 1].is_ascii_lowercase()
        && bytes[n - 1] == bytes[n - 2]
        && !matches!(bytes[n - 1], b'l' | b's' | b'z')
    {
        Some(&stem[..n - 1])
    } else {
        None
    }
}

fn noun_singular(word: &str) -> Option<String> {
    if word.len() <= 3 {
        return None;
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return Some(format!("{stem}y"));
    }
    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(suffix) {
            return Some(word[..word.len() - 2].to_string());
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return None;
    }
    word.strip_suffix('s').map(str::to_string)
}

/// Lemmatize one lower-cased word.
#[must_use]
pub fn lemmatize(word: &str) -> String {
    if let Some(base) = IRREGULAR_MAP.get(word) {
        return (*base).to_string();
    }
    if INVARIANT_SET.contains(word) || lexicon::valence(word).is_some() || is_verb_base(word) {
        return word.to_string();
    }
    if let Some(base) = verb_base(word) {
        return base;
    }
    noun_singular(word).unwrap_or_else(|| word.to_string())
}
