use std::collections::HashSet;

use crate::round_to;
use crate::types::{BasicMetrics, ReadabilityMetrics};

const READABILITY_FLOOR: f64 = 20.0;
const READABILITY_CEILING: f64 = 100.0;

/// Length, compression and vocabulary overlap of `candidate` relative to `reference`
///
/// Degenerate inputs produce zeroed fields, never an error.
pub fn basic_metrics(reference: &str, candidate: &str) -> BasicMetrics {
    let reference_length = reference.chars().count();
    let candidate_length = candidate.chars().count();

    let compression_ratio = if reference_length > 0 {
        round_to(candidate_length as f64 / reference_length as f64 * 100.0, 2)
    } else {
        0.0
    };

    let reference_words = word_set(reference);
    let candidate_words = word_set(candidate);

    let word_overlap_pct = if reference_words.is_empty() {
        0.0
    } else {
        let shared = reference_words.intersection(&candidate_words).count();
        round_to(shared as f64 / reference_words.len() as f64 * 100.0, 2)
    };

    BasicMetrics {
        reference_length,
        candidate_length,
        compression_ratio,
        word_overlap_pct,
    }
}

/// Readability heuristic: shorter words and shorter sentences score higher
///
/// Sentences are the segments produced by splitting on `.`, including a
/// trailing empty segment, so `"One. Two."` counts three sentences.
pub fn readability(text: &str) -> ReadabilityMetrics {
    let words: Vec<&str> = text.split_whitespace().collect();
    let sentence_count = text.split('.').count();

    let avg_word_length = if words.is_empty() {
        0.0
    } else {
        let letters: usize = words.iter().map(|w| w.chars().count()).sum();
        letters as f64 / words.len() as f64
    };

    let avg_sentence_length = if sentence_count == 0 {
        0.0
    } else {
        words.len() as f64 / sentence_count as f64
    };

    let raw = ((5.0 - avg_word_length + 10.0 - avg_sentence_length) * 5.0).round_ties_even();
    let readability_score = raw.clamp(READABILITY_FLOOR, READABILITY_CEILING) as u32;

    ReadabilityMetrics {
        avg_word_length: round_to(avg_word_length, 2),
        avg_sentence_length: round_to(avg_sentence_length, 2),
        readability_score,
    }
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
