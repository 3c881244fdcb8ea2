//! Lexicon-based sentiment scorer for review and forum text.

use mrdb_core::{SentimentLabel, SentimentScores};

use crate::lexicon;

const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_BOOST: f64 = 0.292;
const QUESTION_BOOST: f64 = 0.18;
const CAPS_BOOST: f64 = 0.733;
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Stateless polarity scorer. Identical input always yields identical scores.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentScorer;

impl SentimentScorer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score a text span. Empty or token-free input yields all-zero scores.
    #[must_use]
    pub fn score(&self, text: &str) -> SentimentScores {
        let raw: Vec<&str> = text.split_whitespace().collect();
        let words: Vec<String> = raw
            .iter()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        if words.is_empty() {
            return SentimentScores::zero();
        }

        let mixed_case = words.iter().any(|w| is_all_caps(w))
            && words.iter().any(|w| !is_all_caps(w));
        let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

        let mut sentiments: Vec<f64> = Vec::with_capacity(lower.len());
        for (i, word) in lower.iter().enumerate() {
            if lexicon::booster(word).is_some() {
                sentiments.push(0.0);
                continue;
            }
            let Some(mut v) = lexicon::valence(word) else {
                sentiments.push(0.0);
                continue;
            };

            if mixed_case && is_all_caps(&words[i]) {
                v += CAPS_BOOST.copysign(v);
            }

            for distance in 1..=3 {
                if i < distance {
                    break;
                }
                let prev = &lower[i - distance];
                if let Some(scalar) = lexicon::booster(prev) {
                    let damp = match distance {
                        1 => 1.0,
                        2 => 0.95,
                        _ => 0.9,
                    };
                    v += scalar.copysign(v) * damp;
                }
            }

            if (1..=3).any(|d| i >= d && lexicon::is_negator(&lower[i - d])) {
                v *= NEGATION_SCALAR;
            }

            sentiments.push(v);
        }

        if let Some(but_idx) = lower.iter().position(|w| w == "but") {
            for (i, s) in sentiments.iter_mut().enumerate() {
                if i < but_idx {
                    *s *= 0.5;
                } else if i > but_idx {
                    *s *= 1.5;
                }
            }
        }

        let punct = punctuation_emphasis(text);
        let mut sum: f64 = sentiments.iter().sum();
        if sum > 0.0 {
            sum += punct;
        } else if sum < 0.0 {
            sum -= punct;
        }
        let compound = normalize(sum);

        let (mut pos_sum, mut neg_sum, mut neu_count) = (0.0_f64, 0.0_f64, 0.0_f64);
        for s in &sentiments {
            if *s > 0.0 {
                pos_sum += s + 1.0;
            } else if *s < 0.0 {
                neg_sum += s - 1.0;
            } else {
                neu_count += 1.0;
            }
        }
        if pos_sum > neg_sum.abs() {
            pos_sum += punct;
        } else if pos_sum < neg_sum.abs() {
            neg_sum -= punct;
        }

        let total = pos_sum + neg_sum.abs() + neu_count;
        if total == 0.0 {
            return SentimentScores {
                compound,
                ..SentimentScores::zero()
            };
        }

        SentimentScores {
            compound: round_to(compound, 4),
            positive: round_to((pos_sum / total).abs(), 3),
            neutral: round_to((neu_count / total).abs(), 3),
            negative: round_to((neg_sum / total).abs(), 3),
        }
    }

    /// Compound score of a single word, as used by aspect extraction.
    #[must_use]
    pub fn word_compound(&self, word: &str) -> f64 {
        self.score(word).compound
    }

    #[must_use]
    pub fn label(&self, compound: f64) -> SentimentLabel {
        SentimentLabel::from_compound(compound)
    }
}

fn is_all_caps(word: &str) -> bool {
    word.chars().any(char::is_alphabetic) && !word.chars().any(char::is_lowercase)
}

#[allow(clippy::cast_precision_loss)]
fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.chars().filter(|c| *c == '!').count().min(4);
    let questions = text.chars().filter(|c| *c == '?').count();
    let question_amp = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_BOOST,
        _ => 0.96,
    };
    exclamations as f64 * EXCLAMATION_BOOST + question_amp
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> SentimentScores {
        SentimentScorer::new().score(text)
    }

    #[test]
    fn empty_string_is_all_zero() {
        assert_eq!(score(""), SentimentScores::zero());
        assert_eq!(score("   "), SentimentScores::zero());
    }

    #[test]
    fn unknown_text_is_neutral() {
        let s = score("the brown fox sat on the fence");
        assert_eq!(s.compound, 0.0);
        assert_eq!(s.neutral, 1.0);
        assert_eq!(s.label(), SentimentLabel::Neutral);
    }

    #[test]
    fn positive_word_scores_positive() {
        let s = score("camera great");
        assert!(s.compound > 0.05, "expected positive, got {}", s.compound);
        assert_eq!(s.label(), SentimentLabel::Positive);
    }

    #[test]
    fn negation_flips_polarity() {
        let plain = score("this is good");
        let negated = score("this is not good");
        assert!(plain.compound > 0.0);
        assert!(negated.compound < 0.0, "got {}", negated.compound);
    }

    #[test]
    fn booster_intensifies() {
        assert!(score("very good").compound > score("good").compound);
    }

    #[test]
    fn but_shifts_weight_to_second_clause() {
        let s = score("the picture is great but the app is terrible");
        assert!(s.compound < 0.0, "got {}", s.compound);
    }

    #[test]
    fn exclamation_amplifies() {
        assert!(score("good!!!").compound > score("good").compound);
    }

    #[test]
    fn compound_stays_in_range() {
        let text = "amazing awesome best excellent superb terrific great love perfect wonderful";
        let s = score(text);
        assert!(s.compound <= 1.0 && s.compound > 0.9);
        let s = score("worst horrible terrible awful garbage useless hate broken dead");
        assert!(s.compound >= -1.0 && s.compound < -0.9);
    }

    #[test]
    fn proportions_sum_to_one() {
        let s = score("battery life is good but the mount is flimsy");
        let total = s.positive + s.neutral + s.negative;
        assert!((total - 1.0).abs() < 0.01, "sum was {total}");
    }

    #[test]
    fn word_compound_matches_single_word_score() {
        let scorer = SentimentScorer::new();
        assert!(scorer.word_compound("terrible") < -0.05);
        assert_eq!(scorer.word_compound("camera"), 0.0);
    }
}
