use std::collections::HashMap;
use tracing::{debug, warn};

use crate::tokenize::Tokenizer;
use crate::types::ScoreSet;

/// Default bound on reference tokens x candidate tokens for ROUGE-L
pub const DEFAULT_LCS_CELL_LIMIT: usize = 25_000_000;

/// Reasons the overlap scorer can give up
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("LCS table of {reference} x {candidate} tokens exceeds the limit of {limit} cells")]
    InputTooLarge {
        reference: usize,
        candidate: usize,
        limit: usize,
    },
}

/// ROUGE-1, ROUGE-2 and ROUGE-L F-measures over stemmed tokens
#[derive(Debug)]
pub struct OverlapScorer {
    tokenizer: Tokenizer,
    lcs_cell_limit: usize,
}

impl OverlapScorer {
    pub fn new() -> Self {
        Self::with_lcs_cell_limit(DEFAULT_LCS_CELL_LIMIT)
    }

    pub fn with_lcs_cell_limit(lcs_cell_limit: usize) -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            lcs_cell_limit,
        }
    }

    /// Score `candidate` against `reference`
    ///
    /// An empty side yields `0.0` for every component.
    pub fn score(&self, reference: &str, candidate: &str) -> Result<ScoreSet, ScoringError> {
        let reference_tokens = self.tokenizer.tokenize(reference);
        let candidate_tokens = self.tokenizer.tokenize(candidate);

        let cells = reference_tokens.len().saturating_mul(candidate_tokens.len());
        if cells > self.lcs_cell_limit {
            return Err(ScoringError::InputTooLarge {
                reference: reference_tokens.len(),
                candidate: candidate_tokens.len(),
                limit: self.lcs_cell_limit,
            });
        }

        let unigram = ngram_f_measure(&reference_tokens, &candidate_tokens, 1);
        let bigram = ngram_f_measure(&reference_tokens, &candidate_tokens, 2);
        let lcs = lcs_f_measure(&reference_tokens, &candidate_tokens);

        debug!(
            "Overlap scored - ref tokens: {}, cand tokens: {}, r1={:.3}, r2={:.3}, rL={:.3}",
            reference_tokens.len(),
            candidate_tokens.len(),
            unigram,
            bigram,
            lcs
        );

        Ok(ScoreSet::new(unigram, bigram, lcs))
    }

    /// Score without failing: a scorer error becomes an all-null score set
    /// and is handed back as a warning for the caller to report.
    pub fn score_lenient(&self, reference: &str, candidate: &str) -> (ScoreSet, Option<ScoringError>) {
        match self.score(reference, candidate) {
            Ok(scores) => (scores, None),
            Err(e) => {
                warn!("Overlap scoring failed, continuing without scores: {}", e);
                (ScoreSet::unavailable(), Some(e))
            }
        }
    }
}

impl Default for OverlapScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn f_measure(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for gram in tokens.windows(n) {
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

/// Clipped n-gram overlap
fn ngram_f_measure(reference: &[String], candidate: &[String], n: usize) -> f64 {
    let reference_counts = ngram_counts(reference, n);
    let candidate_counts = ngram_counts(candidate, n);

    let reference_total: usize = reference_counts.values().sum();
    let candidate_total: usize = candidate_counts.values().sum();
    if reference_total == 0 || candidate_total == 0 {
        return 0.0;
    }

    let overlap: usize = candidate_counts
        .iter()
        .map(|(gram, count)| (*count).min(reference_counts.get(gram).copied().unwrap_or(0)))
        .sum();

    f_measure(
        overlap as f64 / candidate_total as f64,
        overlap as f64 / reference_total as f64,
    )
}

fn lcs_f_measure(reference: &[String], candidate: &[String]) -> f64 {
    if reference.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    let lcs = lcs_length(reference, candidate);
    f_measure(
        lcs as f64 / candidate.len() as f64,
        lcs as f64 / reference.len() as f64,
    )
}

/// Longest common subsequence length, two rows of DP
fn lcs_length(a: &[String], b: &[String]) -> usize {
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for token_a in a {
        for (j, token_b) in b.iter().enumerate() {
            current[j + 1] = if token_a == token_b {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
