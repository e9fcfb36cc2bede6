use rust_stemmers::{Algorithm, Stemmer};
use std::fmt;

/// Tokens of this length or shorter are kept verbatim
const MIN_STEM_LENGTH: usize = 3;

/// Stemming tokenizer used for overlap scoring
///
/// Lowercases, treats anything outside `[a-z0-9]` as a separator, and
/// reduces tokens longer than three characters to their English stem.
///
/// The stemmer is Snowball English (Porter2). rouge_score stems with
/// NLTK's original Porter algorithm, and the two disagree on some words,
/// so scores can differ slightly from rouge_score output and from logs
/// written by it.
pub struct Tokenizer {
    stemmer: Stemmer,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { ' ' })
            .collect();

        normalized
            .split_whitespace()
            .map(|token| {
                if token.len() > MIN_STEM_LENGTH {
                    self.stemmer.stem(token).into_owned()
                } else {
                    token.to_string()
                }
            })
            .filter(|token| !token.is_empty())
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer").field("algorithm", &"english").finish()
    }
}
