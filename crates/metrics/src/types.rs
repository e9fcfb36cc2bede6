use serde::Serialize;

use crate::round_to;

/// ROUGE-family overlap scores for one (reference, candidate) pair
///
/// Every component lies in [0, 1]. All fields are `None` together when
/// scoring failed; `average` is never present without its components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSet {
    unigram_overlap: Option<f64>,
    bigram_overlap: Option<f64>,
    longest_common_subseq_overlap: Option<f64>,
    average: Option<f64>,
}

impl ScoreSet {
    /// Build from unrounded F-measures; components and average are rounded to 3 places
    pub fn new(unigram: f64, bigram: f64, lcs: f64) -> Self {
        Self {
            unigram_overlap: Some(round_to(unigram, 3)),
            bigram_overlap: Some(round_to(bigram, 3)),
            longest_common_subseq_overlap: Some(round_to(lcs, 3)),
            average: Some(round_to((unigram + bigram + lcs) / 3.0, 3)),
        }
    }

    /// Rebuild a score set exactly as it was persisted
    pub fn from_persisted(unigram: f64, bigram: f64, lcs: f64, average: f64) -> Self {
        Self {
            unigram_overlap: Some(unigram),
            bigram_overlap: Some(bigram),
            longest_common_subseq_overlap: Some(lcs),
            average: Some(average),
        }
    }

    /// Score set for a failed computation
    pub fn unavailable() -> Self {
        Self {
            unigram_overlap: None,
            bigram_overlap: None,
            longest_common_subseq_overlap: None,
            average: None,
        }
    }

    pub fn unigram_overlap(&self) -> Option<f64> {
        self.unigram_overlap
    }

    pub fn bigram_overlap(&self) -> Option<f64> {
        self.bigram_overlap
    }

    pub fn longest_common_subseq_overlap(&self) -> Option<f64> {
        self.longest_common_subseq_overlap
    }

    pub fn average(&self) -> Option<f64> {
        self.average
    }

    pub fn is_available(&self) -> bool {
        self.average.is_some()
    }
}

/// Length and vocabulary overlap between a reference and a candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BasicMetrics {
    pub reference_length: usize,
    pub candidate_length: usize,
    /// Candidate length as a percentage of the reference length
    pub compression_ratio: f64,
    /// Share of the reference vocabulary found in the candidate, in percent
    pub word_overlap_pct: f64,
}

/// Heuristic readability figures for one text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadabilityMetrics {
    pub avg_word_length: f64,
    pub avg_sentence_length: f64,
    /// 20 (hard) ..= 100 (easy)
    pub readability_score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_is_mean_of_components() {
        let scores = ScoreSet::new(0.5, 0.25, 0.75);
        assert_eq!(scores.unigram_overlap(), Some(0.5));
        assert_eq!(scores.bigram_overlap(), Some(0.25));
        assert_eq!(scores.longest_common_subseq_overlap(), Some(0.75));
        assert_eq!(scores.average(), Some(0.5));
    }

    #[test]
    fn test_average_uses_unrounded_components() {
        let scores = ScoreSet::new(2.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0);
        assert_eq!(scores.unigram_overlap(), Some(0.667));
        assert_eq!(scores.average(), Some(0.667));
    }

    #[test]
    fn test_unavailable_is_all_null() {
        let scores = ScoreSet::unavailable();
        assert!(!scores.is_available());
        assert_eq!(scores.unigram_overlap(), None);
        assert_eq!(scores.bigram_overlap(), None);
        assert_eq!(scores.longest_common_subseq_overlap(), None);
        assert_eq!(scores.average(), None);
    }

    #[test]
    fn test_serializes_nulls() {
        let json = serde_json::to_value(ScoreSet::unavailable()).unwrap();
        assert!(json["average"].is_null());
    }
}
