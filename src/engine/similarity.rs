use crate::engine::normalize::normalize;

/// Similarity floor for fuzzy word equality.
pub const DEFAULT_WORD_SIMILARITY: f64 = 0.85;

/// Words this short (in chars) only ever match exactly.
const MIN_FUZZY_LEN: usize = 3;

/// Unit-cost edit distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// `1 - distance / max_len`, or 1.0 when both strings are empty.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Fuzzy equality for already-normalized words.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WordMatcher {
    pub min_similarity: f64,
}

impl Default for WordMatcher {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_WORD_SIMILARITY,
        }
    }
}

impl WordMatcher {
    pub fn new(min_similarity: f64) -> Self {
        Self { min_similarity }
    }

    pub fn matches(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        let shorter = a.chars().count().min(b.chars().count());
        if shorter < MIN_FUZZY_LEN {
            return false;
        }
        edit_similarity(a, b) >= self.min_similarity
    }
}

/// Normalizes both sides, then applies the default [`WordMatcher`].
pub fn words_match(a: &str, b: &str) -> bool {
    WordMatcher::default().matches(&normalize(a), &normalize(b))
}
