//! Consumer-review valence lexicon.
//!
//! Keys are lowercase single words. Valences sit on a `[-4.0, 4.0]` scale;
//! the scorer normalizes the summed valence into a compound score.

use std::collections::HashMap;
use std::sync::LazyLock;

pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("better", 1.9),
    ("bright", 1.9),
    ("brilliant", 2.8),
    ("clean", 1.7),
    ("clear", 1.6),
    ("comfortable", 2.3),
    ("convenient", 2.0),
    ("cool", 1.3),
    ("crisp", 1.2),
    ("decent", 1.4),
    ("delighted", 2.7),
    ("dependable", 1.9),
    ("durable", 1.6),
    ("easy", 1.9),
    ("easily", 1.4),
    ("effective", 2.1),
    ("efficient", 1.8),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 3.2),
    ("exceptional", 2.9),
    ("fantastic", 2.6),
    ("fast", 1.2),
    ("favorite", 2.0),
    ("fine", 0.8),
    ("flawless", 2.6),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("gorgeous", 3.0),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("impressed", 2.1),
    ("impressive", 2.3),
    ("incredible", 2.4),
    ("intuitive", 1.6),
    ("like", 1.5),
    ("liked", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("loves", 2.7),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("perfectly", 3.2),
    ("pleasant", 2.3),
    ("pleased", 1.9),
    ("powerful", 1.8),
    ("quick", 1.1),
    ("quickly", 1.0),
    ("recommend", 1.5),
    ("recommended", 1.6),
    ("reliable", 1.9),
    ("responsive", 1.5),
    ("satisfied", 1.8),
    ("sharp", 1.1),
    ("simple", 1.1),
    ("smooth", 1.6),
    ("solid", 1.9),
    ("stable", 1.2),
    ("sturdy", 1.6),
    ("super", 2.9),
    ("superb", 3.1),
    ("terrific", 3.2),
    ("thanks", 1.9),
    ("useful", 1.9),
    ("valuable", 2.1),
    ("well", 1.1),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("worth", 0.9),
    ("wow", 2.8),
    // Negative signals
    ("angry", -2.3),
    ("annoyed", -1.6),
    ("annoying", -1.7),
    ("awful", -2.0),
    ("bad", -2.5),
    ("blurry", -1.2),
    ("boring", -1.3),
    ("broke", -1.8),
    ("broken", -2.1),
    ("buggy", -1.6),
    ("cheap", -0.7),
    ("clunky", -1.1),
    ("complicated", -1.0),
    ("confusing", -1.3),
    ("crap", -1.6),
    ("crappy", -2.5),
    ("damaged", -1.9),
    ("dead", -3.3),
    ("defective", -1.9),
    ("difficult", -1.5),
    ("disappoint", -1.8),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("dislike", -1.6),
    ("dumb", -2.3),
    ("expensive", -1.2),
    ("fail", -2.5),
    ("failed", -2.3),
    ("fails", -2.0),
    ("failure", -2.3),
    ("faulty", -1.9),
    ("flimsy", -1.4),
    ("frustrated", -2.4),
    ("frustrating", -1.9),
    ("garbage", -2.0),
    ("hate", -2.7),
    ("hated", -3.2),
    ("hard", -0.4),
    ("horrible", -2.5),
    ("junk", -1.4),
    ("lag", -1.0),
    ("laggy", -1.4),
    ("lame", -1.8),
    ("mediocre", -1.0),
    ("noisy", -0.7),
    ("overpriced", -1.7),
    ("pathetic", -2.2),
    ("poor", -2.1),
    ("poorly", -1.8),
    ("problem", -1.7),
    ("problems", -1.7),
    ("regret", -1.8),
    ("ridiculous", -1.5),
    ("sad", -2.1),
    ("scam", -2.3),
    ("slow", -0.7),
    ("slowly", -0.5),
    ("sucks", -1.5),
    ("terrible", -2.1),
    ("trash", -1.5),
    ("ugly", -2.3),
    ("unhappy", -1.8),
    ("unreliable", -1.7),
    ("unusable", -2.0),
    ("upset", -1.6),
    ("useless", -1.8),
    ("waste", -1.8),
    ("weak", -1.9),
    ("worse", -2.1),
    ("worst", -3.1),
    ("worthless", -1.9),
    ("wrong", -2.1),
];

/// Intensifiers and dampeners with their scalar adjustment.
pub(crate) const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", 0.293),
    ("completely", 0.293),
    ("extremely", 0.293),
    ("highly", 0.293),
    ("incredibly", 0.293),
    ("most", 0.293),
    ("really", 0.293),
    ("so", 0.293),
    ("super", 0.293),
    ("totally", 0.293),
    ("very", 0.293),
    ("barely", -0.293),
    ("hardly", -0.293),
    ("kinda", -0.293),
    ("marginally", -0.293),
    ("slightly", -0.293),
    ("somewhat", -0.293),
    ("sort", -0.293),
];

pub(crate) const NEGATORS: &[&str] = &[
    "aint", "cannot", "cant", "didnt", "doesnt", "dont", "hardly", "isnt", "neither", "never",
    "no", "nobody", "none", "nor", "not", "nothing", "nowhere", "wasnt", "without", "wont",
    "wouldnt",
];

static VALENCE: LazyLock<HashMap<&'static str, f64>> =
    LazyLock::new(|| LEXICON.iter().copied().collect());

static BOOSTER_MAP: LazyLock<HashMap<&'static str, f64>> =
    LazyLock::new(|| BOOSTERS.iter().copied().collect());

/// Valence of a lower-cased word, if it carries any.
#[must_use]
pub fn valence(word: &str) -> Option<f64> {
    VALENCE.get(word).copied()
}

#[must_use]
pub fn booster(word: &str) -> Option<f64> {
    BOOSTER_MAP.get(word).copied()
}

/// Whether `word` negates what follows. Contractions are compared with their
/// apostrophe removed.
#[must_use]
pub fn is_negator(word: &str) -> bool {
    if word.ends_with("n't") || word.ends_with("n’t") {
        return true;
    }
    let bare: String = word.chars().filter(|c| *c != '\'' && *c != '’').collect();
    NEGATORS.contains(&bare.as_str())
}
