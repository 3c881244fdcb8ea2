//! Smoothed TF-IDF weighting over the shared count matrix.

use mrdb_core::TermWeight;

use super::round_to;
use super::vocabulary::{CountRow, Vocabulary};

/// Top `top_n` weighted terms per document, highest first. Rows are
/// L2-normalized before ranking and weights are rounded to four decimals.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn top_terms(rows: &[CountRow], vocab: &Vocabulary, top_n: usize) -> Vec<Vec<TermWeight>> {
    let n_docs = rows.len() as f64;
    let mut df = vec![0_usize; vocab.len()];
    for row in rows {
        for &(term, _) in row {
            df[term] += 1;
        }
    }
    let idf: Vec<f64> = df
        .iter()
        .map(|&d| ((1.0 + n_docs) / (1.0 + d as f64)).ln() + 1.0)
        .collect();

    rows.iter()
        .map(|row| {
            let mut weighted: Vec<(usize, f64)> =
                row.iter().map(|&(term, count)| (term, count * idf[term])).collect();
            let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, w) in &mut weighted {
                    *w /= norm;
                }
            }
            weighted.retain(|(_, w)| *w > 0.0);
            weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            weighted
                .into_iter()
                .take(top_n)
                .map(|(term, w)| TermWeight {
                    term: vocab.term(term).to_string(),
                    weight: round_to(w, 4),
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::vocabulary::{build, VocabularyLimits};
    use super::*;

    fn limits() -> VocabularyLimits {
        VocabularyLimits {
            min_df: 1,
            max_df: 1.0,
            max_features: 100,
        }
    }

    #[test]
    fn rare_terms_outweigh_common_ones() {
        let docs = ["camera camera lens", "camera battery", "camera app"];
        let (vocab, rows) = build(&docs, limits()).unwrap();
        let top = top_terms(&rows, &vocab, 10);
        assert_eq!(top.len(), 3);
        assert_eq!(top[1][0].term, "battery");
        assert_eq!(top[1][1].term, "camera");
        assert!(top[1][0].weight > top[1][1].weight);
    }

    #[test]
    fn rows_are_unit_length_before_rounding() {
        let docs = ["alpha beta", "beta gamma"];
        let (vocab, rows) = build(&docs, limits()).unwrap();
        for terms in top_terms(&rows, &vocab, 10) {
            let norm: f64 = terms.iter().map(|t| t.weight * t.weight).sum();
            assert!((norm - 1.0).abs() < 1e-3, "{norm}");
        }
    }

    #[test]
    fn top_n_bounds_the_list() {
        let docs = ["one two three four five six"];
        let (vocab, rows) = build(&docs, limits()).unwrap();
        assert_eq!(top_terms(&rows, &vocab, 3)[0].len(), 3);
    }
}
