//! Batch variational-Bayes latent Dirichlet allocation.
//!
//! Each pass runs the per-document E-step against the current topic-word
//! variational parameters, then replaces them with the accumulated
//! sufficient statistics plus the prior. After the final pass the E-step is
//! repeated once more to produce normalized document-topic distributions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::vocabulary::CountRow;
use crate::error::AnalysisError;

const MAX_DOC_ITERATIONS: usize = 100;
const MEAN_CHANGE_TOLERANCE: f64 = 1e-3;
const EPSILON: f64 = 1e-100;

#[derive(Debug, Clone, Copy)]
pub(crate) struct LdaParams {
    pub n_topics: usize,
    pub passes: usize,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct LdaFit {
    /// Row per document, summing to 1.
    pub doc_topic: Vec<Vec<f64>>,
    /// Row per topic, one column per vocabulary term.
    topic_word: Vec<Vec<f64>>,
}

impl LdaFit {
    /// Indices of the `n` heaviest terms of `topic`, heaviest first.
    pub(crate) fn top_term_indices(&self, topic: usize, n: usize) -> Vec<usize> {
        let row = &self.topic_word[topic];
        let mut order: Vec<usize> = (0..row.len()).collect();
        order.sort_by(|&a, &b| row[b].total_cmp(&row[a]));
        order.truncate(n);
        order
    }

    /// Dominant topic of document `doc` and its probability; ties go to the
    /// lower topic index.
    pub(crate) fn dominant(&self, doc: usize) -> Option<(usize, f64)> {
        self.doc_topic[doc]
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (k, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((k, p)),
            })
    }
}

/// Fit the model on `rows` over a vocabulary of `n_terms`.
///
/// # Errors
///
/// Returns [`AnalysisError::CorpusFeature`] for a zero topic count, an empty
/// vocabulary, or a non-finite model state.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn fit(rows: &[CountRow], n_terms: usize, params: LdaParams) -> Result<LdaFit, AnalysisError> {
    let fail = |detail: String| AnalysisError::CorpusFeature {
        stage: "topic_model",
        detail,
    };
    if params.n_topics == 0 {
        return Err(fail("n_topics must be at least 1".to_string()));
    }
    if n_terms == 0 {
        return Err(fail("vocabulary is empty".to_string()));
    }

    let prior = 1.0 / params.n_topics as f64;
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut lambda: Vec<Vec<f64>> = (0..params.n_topics)
        .map(|_| (0..n_terms).map(|_| rng.random_range(0.9..1.1)).collect())
        .collect();

    for _ in 0..params.passes {
        let exp_beta = exp_dirichlet_expectation_rows(&lambda);
        let mut sstats = vec![vec![0.0; n_terms]; params.n_topics];
        for row in rows {
            let (_, exp_theta, phi_norm) = e_step(row, &exp_beta, prior);
            for (k, stats) in sstats.iter_mut().enumerate() {
                for (&(term, count), norm) in row.iter().zip(&phi_norm) {
                    stats[term] += exp_theta[k] * count / norm;
                }
            }
        }
        for (k, row) in lambda.iter_mut().enumerate() {
            for (w, value) in row.iter_mut().enumerate() {
                *value = prior + sstats[k][w] * exp_beta[k][w];
            }
        }
    }

    if lambda.iter().flatten().any(|v| !v.is_finite()) {
        return Err(fail("topic-word parameters diverged".to_string()));
    }

    let exp_beta = exp_dirichlet_expectation_rows(&lambda);
    let doc_topic = rows
        .iter()
        .map(|row| {
            let (gamma, _, _) = e_step(row, &exp_beta, prior);
            let total: f64 = gamma.iter().sum();
            gamma.into_iter().map(|g| g / total).collect()
        })
        .collect();

    Ok(LdaFit {
        doc_topic,
        topic_word: lambda,
    })
}

/// Per-document variational update. Returns gamma, `exp(E[log theta])`,
/// and the per-term normalizers used for the sufficient statistics.
fn e_step(row: &CountRow, exp_beta: &[Vec<f64>], prior: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n_topics = exp_beta.len();
    let mut gamma = vec![1.0; n_topics];
    let mut exp_theta = exp_dirichlet_expectation(&gamma);
    let mut phi_norm = normalizers(row, exp_beta, &exp_theta);

    for _ in 0..MAX_DOC_ITERATIONS {
        let previous = gamma.clone();
        for (k, g) in gamma.iter_mut().enumerate() {
            let weighted: f64 = row
                .iter()
                .zip(&phi_norm)
                .map(|(&(term, count), norm)| count / norm * exp_beta[k][term])
                .sum();
            *g = prior + exp_theta[k] * weighted;
        }
        exp_theta = exp_dirichlet_expectation(&gamma);
        phi_norm = normalizers(row, exp_beta, &exp_theta);

        #[allow(clippy::cast_precision_loss)]
        let mean_change = gamma
            .iter()
            .zip(&previous)
            .map(|(a, b)| (a - b).abs())
            .sum::<f64>()
            / n_topics as f64;
        if mean_change < MEAN_CHANGE_TOLERANCE {
            break;
        }
    }

    (gamma, exp_theta, phi_norm)
}

fn normalizers(row: &CountRow, exp_beta: &[Vec<f64>], exp_theta: &[f64]) -> Vec<f64> {
    row.iter()
        .map(|&(term, _)| {
            exp_theta
                .iter()
                .zip(exp_beta)
                .map(|(t, beta)| t * beta[term])
                .sum::<f64>()
                + EPSILON
        })
        .collect()
}

fn exp_dirichlet_expectation(alpha: &[f64]) -> Vec<f64> {
    let total = digamma(alpha.iter().sum());
    alpha.iter().map(|&a| (digamma(a) - total).exp()).collect()
}

fn exp_dirichlet_expectation_rows(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    rows.iter().map(|r| exp_dirichlet_expectation(r)).collect()
}

/// Digamma via upward recurrence and the asymptotic series.
fn digamma(x: f64) -> f64 {
    let mut x = x;
    let mut result = 0.0;
    while x < 6.0 {
        result -= 1.0 / x;
        x += 1.0;
    }
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    result + x.ln() - 0.5 * inv
        - inv2 * (1.0 / 12.0 - inv2 * (1.0 / 120.0 - inv2 * (1.0 / 252.0 - inv2 * (1.0 / 240.0 - inv2 / 132.0))))
}
