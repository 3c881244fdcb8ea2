use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use mrdb_core::EntityKind;
use unicode_segmentation::UnicodeSegmentation;

use super::{DepLabel, EntitySpan, LinguisticBackend, ParsedText, Pos, Token};
use crate::{lemma, lexicon};

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "my", "your", "his", "her", "its", "our",
    "their", "every", "each", "some", "any", "no", "all", "another", "either", "neither",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "you", "he", "him", "she", "it", "we", "us", "they", "them", "myself", "yourself",
    "itself", "themselves", "mine", "yours", "ours", "theirs", "what", "who", "whom", "which",
    "something", "anything", "everything", "nothing", "someone", "anyone", "everyone",
];

const AUXILIARIES: &[&str] = &[
    "am", "is", "are", "was", "were", "be", "been", "being", "has", "have", "had", "do", "does",
    "did", "will", "would", "can", "could", "should", "may", "might", "must", "shall", "don't",
    "doesn't", "didn't", "isn't", "wasn't", "aren't", "won't", "can't", "couldn't", "wouldn't",
];

const BE_FORMS: &[&str] = &["am", "is", "are", "was", "were", "be", "been", "being", "get", "got"];

const ADPOSITIONS: &[&str] = &[
    "in", "on", "at", "by", "for", "with", "about", "of", "from", "into", "over", "under", "after",
    "before", "through", "during", "without", "between", "because", "if", "when", "while",
    "although", "than", "since", "until", "via", "per", "like",
];

const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "yet", "plus"];

const PARTICLES: &[&str] = &["not", "n't", "to", "never"];

const INTERJECTIONS: &[&str] = &["wow", "oh", "ugh", "lol", "yes", "yeah", "ok", "okay", "hey", "meh"];

const ADVERBS: &[&str] = &[
    "very", "really", "so", "too", "quite", "extremely", "pretty", "also", "just", "still", "even",
    "always", "ever", "often", "sometimes", "already", "again", "almost", "here", "there", "now",
    "then", "well", "highly", "barely", "hardly", "somewhat", "slightly", "absolutely", "totally",
    "completely", "only", "maybe", "probably", "definitely", "literally", "honestly", "kinda",
    "super", "fast", "soon", "instead", "overall",
];

const LY_ADJECTIVES: &[&str] = &[
    "friendly", "lovely", "ugly", "costly", "early", "daily", "weekly", "monthly", "silly",
];

const LY_NOUNS: &[&str] = &["family", "reply", "supply", "assembly", "anomaly", "italy", "july"];

const NOUN_VALENCE: &[&str] = &[
    "problem", "problems", "issue", "junk", "garbage", "trash", "waste", "crap", "scam", "failure",
    "lag", "fun", "joy", "thanks",
];

const SENTIMENT_VERBS: &[&str] = &[
    "love", "loved", "loves", "like", "liked", "hate", "hated", "enjoy", "enjoyed", "recommend",
    "recommended", "regret", "disappoint", "dislike", "fail", "failed", "fails", "broke", "sucks",
];

const ADJ_SUFFIXES: &[&str] = &["ful", "less", "ous", "ive", "able", "ible", "ic", "ish"];

const NUMBER_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "hundred",
    "thousand", "dozen",
];

const ORGANIZATIONS: &[&str] = &[
    "adt", "amazon", "apple", "arlo", "best buy", "comcast", "costco", "eufy", "google",
    "home depot", "honeywell", "logitech", "lorex", "microsoft", "netgear", "philips", "reddit",
    "reolink", "samsung", "simplisafe", "sony", "swann", "verizon", "vivint", "walmart", "wyze",
    "xfinity",
];

/// Organization names that are also common words; only matched when
/// capitalized in the source text.
const AMBIGUOUS_ORGANIZATIONS: &[&str] = &["blink", "nest", "ring", "target"];

const LOCATIONS: &[&str] = &[
    "america", "australia", "boston", "california", "canada", "chicago", "china", "england",
    "europe", "florida", "france", "germany", "india", "japan", "london", "los angeles", "mexico",
    "new york", "san francisco", "seattle", "texas", "uk", "united kingdom", "united states",
    "usa",
];

const HONORIFICS: &[&str] = &["mr", "mrs", "ms", "dr", "miss", "sir"];

const FIRST_NAMES: &[&str] = &[
    "alex", "amy", "anna", "brian", "chris", "david", "emily", "james", "jason", "jennifer",
    "jessica", "john", "kevin", "laura", "lisa", "mark", "mary", "matt", "michael", "mike", "paul",
    "robert", "sarah", "steve", "tom",
];

fn set(words: &'static [&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

struct WordLists {
    determiners: HashSet<&'static str>,
    pronouns: HashSet<&'static str>,
    auxiliaries: HashSet<&'static str>,
    be_forms: HashSet<&'static str>,
    adpositions: HashSet<&'static str>,
    conjunctions: HashSet<&'static str>,
    particles: HashSet<&'static str>,
    interjections: HashSet<&'static str>,
    adverbs: HashSet<&'static str>,
    ly_adjectives: HashSet<&'static str>,
    ly_nouns: HashSet<&'static str>,
    noun_valence: HashSet<&'static str>,
    sentiment_verbs: HashSet<&'static str>,
    number_words: HashSet<&'static str>,
    ambiguous_orgs: HashSet<&'static str>,
    honorifics: HashSet<&'static str>,
    first_names: HashSet<&'static str>,
}

static LISTS: LazyLock<WordLists> = LazyLock::new(|| WordLists {
    determiners: set(DETERMINERS),
    pronouns: set(PRONOUNS),
    auxiliaries: set(AUXILIARIES),
    be_forms: set(BE_FORMS),
    adpositions: set(ADPOSITIONS),
    conjunctions: set(CONJUNCTIONS),
    particles: set(PARTICLES),
    interjections: set(INTERJECTIONS),
    adverbs: set(ADVERBS),
    ly_adjectives: set(LY_ADJECTIVES),
    ly_nouns: set(LY_NOUNS),
    noun_valence: set(NOUN_VALENCE),
    sentiment_verbs: set(SENTIMENT_VERBS),
    number_words: set(NUMBER_WORDS),
    ambiguous_orgs: set(AMBIGUOUS_ORGANIZATIONS),
    honorifics: set(HONORIFICS),
    first_names: set(FIRST_NAMES),
});

/// Rule-based tagger and shallow dependency parser.
///
/// Parts of speech come from closed word lists, the sentiment lexicon, verb
/// bases and suffix rules, corrected by left context. Dependencies are
/// attached around the predicates of each sentence: noun runs become
/// compounds on their last token, adjectives modify the adjacent noun run or
/// complement the copula, adverbs modify the next adjective or verb (or a
/// passive auxiliary they follow), and predicates take the nearest noun run on
/// either side as subject and object.
#[derive(Debug, Default)]
pub struct HeuristicParser;

impl HeuristicParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LinguisticBackend for HeuristicParser {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn parse(&self, text: &str) -> ParsedText {
        let mut parsed = ParsedText::default();
        for sentence in text.unicode_sentences() {
            let words: Vec<&str> = sentence.unicode_words().collect();
            if words.is_empty() {
                continue;
            }
            let offset = parsed.tokens.len();
            let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
            let tags = tag_sentence(&words, &lower);
            let (deps, heads) = attach(&lower, &tags);

            for (i, word) in words.iter().enumerate() {
                parsed.tokens.push(Token {
                    text: (*word).to_string(),
                    lemma: lemma::lemmatize(&lower[i]),
                    pos: tags[i],
                    dep: deps[i],
                    head: heads[i] + offset,
                });
            }
            parsed.noun_chunks.extend(
                noun_chunks(&tags, &deps, &heads)
                    .into_iter()
                    .map(|r| r.start + offset..r.end + offset),
            );
            parsed.entities.extend(recognize_entities(&words, &lower));
        }
        parsed
    }
}

fn base_tag(word: &str, lower: &str, sentence_initial: bool) -> Pos {
    let lists = &*LISTS;
    if lower.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        || lists.number_words.contains(lower)
    {
        return Pos::Num;
    }
    if lists.determiners.contains(lower) {
        return Pos::Det;
    }
    if lists.pronouns.contains(lower) {
        return Pos::Pron;
    }
    if lists.auxiliaries.contains(lower) {
        return Pos::Aux;
    }
    if lists.particles.contains(lower) {
        return Pos::Part;
    }
    if lists.conjunctions.contains(lower) {
        return Pos::Cconj;
    }
    if lists.sentiment_verbs.contains(lower) {
        return Pos::Verb;
    }
    if lists.adpositions.contains(lower) {
        return Pos::Adp;
    }
    if lists.interjections.contains(lower) {
        return Pos::Intj;
    }
    if lists.adverbs.contains(lower) {
        return Pos::Adv;
    }
    if lists.noun_valence.contains(lower) {
        return Pos::Noun;
    }
    if lemma::is_verb_base(lower) || lemma::verb_base(lower).is_some() {
        return Pos::Verb;
    }
    if lists.ly_adjectives.contains(lower) {
        return Pos::Adj;
    }
    let ly_adverb = lower.len() > 4 && lower.ends_with("ly") && !lists.ly_nouns.contains(lower);
    if lexicon::valence(lower).is_some() {
        return if ly_adverb { Pos::Adv } else { Pos::Adj };
    }
    if ly_adverb {
        return Pos::Adv;
    }
    if lower.len() > 4 && ADJ_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return Pos::Adj;
    }
    if !sentence_initial && word.chars().next().is_some_and(char::is_uppercase) {
        return Pos::Propn;
    }
    if !lower.chars().all(char::is_alphabetic) {
        return Pos::X;
    }
    Pos::Noun
}

fn tag_sentence(words: &[&str], lower: &[String]) -> Vec<Pos> {
    let mut tags: Vec<Pos> = words
        .iter()
        .zip(lower)
        .enumerate()
        .map(|(i, (w, l))| base_tag(w, l, i == 0))
        .collect();

    for i in 1..tags.len() {
        if tags[i] == Pos::Noun && lower[i].ends_with("ed") {
            let mut k = i - 1;
            while k > 0 && tags[k] == Pos::Adv {
                k -= 1;
            }
            if tags[k] == Pos::Aux {
                tags[i] = Pos::Verb;
                continue;
            }
        }
        if tags[i] != Pos::Verb || LISTS.sentiment_verbs.contains(lower[i].as_str()) {
            continue;
        }
        if matches!(tags[i - 1], Pos::Det | Pos::Adj | Pos::Num) {
            let participle = lower[i].ends_with("ed") || lower[i].ends_with("ing");
            let next_nominal = tags
                .get(i + 1)
                .is_some_and(|t| matches!(t, Pos::Noun | Pos::Propn | Pos::Verb));
            tags[i] = if participle && next_nominal {
                Pos::Adj
            } else {
                Pos::Noun
            };
        }
    }
    tags
}

fn is_participle(word: &str) -> bool {
    if word.ends_with("ing") {
        return false;
    }
    word.ends_with("ed")
        || word.ends_with("en")
        || lemma::verb_base(word).is_some_and(|base| base != word && !word.ends_with('s'))
}

/// Runs of consecutive nominal tokens, as `start..end` ranges.
fn noun_runs(tags: &[Pos]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < tags.len() {
        if tags[i].is_nominal() {
            let start = i;
            while i < tags.len() && tags[i].is_nominal() {
                i += 1;
            }
            runs.push(start..i);
        } else {
            i += 1;
        }
    }
    runs
}

#[allow(clippy::too_many_lines)]
fn attach(lower: &[String], tags: &[Pos]) -> (Vec<DepLabel>, Vec<usize>) {
    let n = tags.len();
    let mut deps = vec![DepLabel::Dep; n];
    let mut heads: Vec<Option<usize>> = vec![None; n];

    // Auxiliaries governed by a following verb.
    let mut verb_of_aux: Vec<Option<usize>> = vec![None; n];
    for i in 0..n {
        if tags[i] != Pos::Aux {
            continue;
        }
        let mut j = i + 1;
        while j < n && matches!(tags[j], Pos::Adv | Pos::Part) {
            j += 1;
        }
        if j < n && tags[j] == Pos::Verb {
            verb_of_aux[i] = Some(j);
            heads[i] = Some(j);
            let passive = LISTS.be_forms.contains(lower[i].as_str()) && is_participle(&lower[j]);
            deps[i] = if passive { DepLabel::Auxpass } else { DepLabel::Dep };
        }
    }

    let predicates: Vec<usize> = (0..n)
        .filter(|&i| tags[i] == Pos::Verb || (tags[i] == Pos::Aux && verb_of_aux[i].is_none()))
        .collect();
    let runs = noun_runs(tags);
    let root = predicates
        .first()
        .copied()
        .or_else(|| runs.first().map(|r| r.end - 1))
        .or_else(|| tags.iter().position(|t| *t == Pos::Adj))
        .unwrap_or(0);

    // Noun runs: compounds hang off the last token.
    let mut run_head_of: Vec<Option<usize>> = vec![None; n];
    for run in &runs {
        let head = run.end - 1;
        for k in run.clone() {
            run_head_of[k] = Some(head);
            if k != head {
                deps[k] = DepLabel::Compound;
                heads[k] = Some(head);
            }
        }
    }

    // Auxpass labels are final once the auxiliary pass is done.
    let mut passive = vec![false; n];
    for (dep, head) in deps.iter().zip(heads.iter()) {
        if let (DepLabel::Auxpass, Some(v)) = (dep, *head) {
            passive[v] = true;
        }
    }

    // Subjects and objects.
    for &p in &predicates {
        let mut j = p;
        while j > 0 {
            j -= 1;
            if matches!(tags[j], Pos::Adv | Pos::Part) || verb_of_aux[j] == Some(p) {
                continue;
            }
            if (tags[j].is_nominal() || tags[j] == Pos::Pron) && heads[j].is_none() && j != root {
                deps[j] = if passive[p] {
                    DepLabel::Nsubjpass
                } else {
                    DepLabel::Nsubj
                };
                heads[j] = Some(p);
            }
            break;
        }

        if tags[p] != Pos::Verb {
            continue;
        }
        let mut j = p + 1;
        while j < n {
            match tags[j] {
                Pos::Det | Pos::Adj | Pos::Adv | Pos::Num => j += 1,
                Pos::Noun | Pos::Propn => {
                    let head = run_head_of[j].unwrap_or(j);
                    if heads[head].is_none() && head != root {
                        deps[head] = DepLabel::Dobj;
                        heads[head] = Some(p);
                    }
                    break;
                }
                Pos::Pron => {
                    if heads[j].is_none() {
                        deps[j] = DepLabel::Dobj;
                        heads[j] = Some(p);
                    }
                    break;
                }
                _ => break,
            }
        }
    }

    // Determiners attach to the next noun run.
    for i in 0..n {
        if tags[i] != Pos::Det {
            continue;
        }
        let mut j = i + 1;
        while j < n && matches!(tags[j], Pos::Adj | Pos::Adv | Pos::Num | Pos::Det) {
            j += 1;
        }
        if let Some(head) = run_head_of.get(j).copied().flatten() {
            deps[i] = DepLabel::Det;
            heads[i] = Some(head);
        }
    }

    // Adjectives: attributive, predicative, then post-nominal.
    for i in 0..n {
        if tags[i] != Pos::Adj || i == root {
            continue;
        }
        let mut j = i + 1;
        while j < n && matches!(tags[j], Pos::Adj | Pos::Adv) {
            j += 1;
        }
        if let Some(head) = run_head_of.get(j).copied().flatten() {
            deps[i] = DepLabel::Amod;
            heads[i] = Some(head);
            continue;
        }

        let mut k = i;
        let mut left = None;
        while k > 0 {
            k -= 1;
            if matches!(tags[k], Pos::Adv | Pos::Part) {
                continue;
            }
            left = Some(k);
            break;
        }
        match left {
            Some(k) if predicates.contains(&k) => {
                deps[i] = DepLabel::Acomp;
                heads[i] = Some(k);
            }
            Some(k) if tags[k].is_nominal() => {
                deps[i] = DepLabel::Amod;
                heads[i] = Some(run_head_of[k].unwrap_or(k));
            }
            _ => {}
        }
    }

    // Adverbs.
    for i in 0..n {
        if tags[i] != Pos::Adv || i == root {
            continue;
        }
        let prev_auxpass = i > 0 && deps[i - 1] == DepLabel::Auxpass;
        let target = if prev_auxpass {
            Some(i - 1)
        } else if i + 1 < n && matches!(tags[i + 1], Pos::Adj | Pos::Adv | Pos::Verb) {
            Some(i + 1)
        } else {
            predicates
                .iter()
                .rev()
                .find(|&&p| p < i)
                .or_else(|| predicates.iter().find(|&&p| p > i))
                .copied()
        };
        if let Some(t) = target {
            deps[i] = DepLabel::Advmod;
            heads[i] = Some(t);
        }
    }

    deps[root] = DepLabel::Root;
    let heads = heads
        .into_iter()
        .enumerate()
        .map(|(i, h)| if i == root { root } else { h.unwrap_or(root) })
        .collect();
    (deps, heads)
}

fn noun_chunks(tags: &[Pos], deps: &[DepLabel], heads: &[usize]) -> Vec<Range<usize>> {
    noun_runs(tags)
        .into_iter()
        .map(|run| {
            let head = run.end - 1;
            let mut start = run.start;
            while start > 0 {
                let prev = start - 1;
                let attached = match deps[prev] {
                    DepLabel::Det | DepLabel::Amod => heads[prev] == head,
                    DepLabel::Advmod => (start..run.end).contains(&heads[prev]),
                    _ => tags[prev] == Pos::Num,
                };
                if !attached {
                    break;
                }
                start = prev;
            }
            start..run.end
        })
        .collect()
}

fn recognize_entities(words: &[&str], lower: &[String]) -> Vec<EntitySpan> {
    let lists = &*LISTS;
    let mut spans = Vec::new();
    let mut i = 0;
    while i < words.len() {
        if let Some((len, kind)) = gazetteer_match(words, lower, i) {
            spans.push(EntitySpan {
                text: words[i..i + len].join(" "),
                kind,
            });
            i += len;
            continue;
        }

        let word = lower[i].as_str();
        if lists.honorifics.contains(word) && i + 1 < words.len() {
            spans.push(EntitySpan {
                text: words[i + 1].to_string(),
                kind: EntityKind::Person,
            });
            i += 2;
            continue;
        }

        if lists.first_names.contains(word) {
            let surname = words
                .get(i + 1)
                .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
                .filter(|_| gazetteer_match(words, lower, i + 1).is_none());
            let len = if surname.is_some() { 2 } else { 1 };
            spans.push(EntitySpan {
                text: words[i..i + len].join(" "),
                kind: EntityKind::Person,
            });
            i += len;
            continue;
        }

        i += 1;
    }
    spans
}

/// Longest gazetteer entry starting at `i`, as (token count, kind).
fn gazetteer_match(words: &[&str], lower: &[String], i: usize) -> Option<(usize, EntityKind)> {
    for len in (1..=3).rev() {
        if i + len > lower.len() {
            continue;
        }
        let candidate = lower[i..i + len].join(" ");
        if ORGANIZATIONS.contains(&candidate.as_str()) {
            return Some((len, EntityKind::Organization));
        }
        if len == 1
            && LISTS.ambiguous_orgs.contains(candidate.as_str())
            && words[i].chars().next().is_some_and(char::is_uppercase)
        {
            return Some((1, EntityKind::Organization));
        }
        if LOCATIONS.contains(&candidate.as_str()) {
            return Some((len, EntityKind::Location));
        }
    }
    None
}
