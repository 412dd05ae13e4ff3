use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::engine::align::{lcs, sequence_match};
use crate::engine::similarity::{WordMatcher, edit_similarity};
use crate::engine::window::Window;

const SEQUENCE_WEIGHT: f64 = 0.5;
const OVERLAP_WEIGHT: f64 = 0.3;
const EDIT_WEIGHT: f64 = 0.2;

const RANK_CONFIDENCE_WEIGHT: f64 = 0.4;
const RANK_ACCURACY_WEIGHT: f64 = 0.4;
const RANK_ALIGNMENT_WEIGHT: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowScore {
    /// Likelihood this window is what was recited.
    pub confidence: f64,
    /// Fraction of expected words reproduced in order.
    pub accuracy: f64,
    pub matched_words: usize,
    pub total_words: usize,
    /// Rewards early, in-place matches.
    pub alignment_score: f64,
}

impl WindowScore {
    pub fn rank(&self) -> f64 {
        RANK_CONFIDENCE_WEIGHT * self.confidence
            + RANK_ACCURACY_WEIGHT * self.accuracy
            + RANK_ALIGNMENT_WEIGHT * self.alignment_score
    }
}

/// Exact-word set intersection over the larger set.
pub fn overlap_score(transcribed: &[String], window: &[String]) -> f64 {
    let spoken: HashSet<&str> = transcribed.iter().map(String::as_str).collect();
    let expected: HashSet<&str> = window.iter().map(String::as_str).collect();
    let larger = spoken.len().max(expected.len());
    if larger == 0 {
        return 0.0;
    }
    spoken.intersection(&expected).count() as f64 / larger as f64
}

/// Mean weight of position-wise fuzzy matches, where position `i` of `n` weighs `(n - i) / n`.
pub fn positional_alignment(transcribed: &[String], window: &[String], matcher: &WordMatcher) -> f64 {
    let min_len = transcribed.len().min(window.len());
    if min_len == 0 {
        return 0.0;
    }

    let mut weight_sum = 0.0;
    let mut hits = 0usize;
    for i in 0..min_len {
        if matcher.matches(&transcribed[i], &window[i]) {
            weight_sum += (min_len - i) as f64 / min_len as f64;
            hits += 1;
        }
    }

    if hits == 0 {
        0.0
    } else {
        weight_sum / hits as f64
    }
}

/// Score normalized transcribed words against one window.
pub fn score_window(transcribed: &[String], window: &Window, matcher: &WordMatcher) -> WindowScore {
    let matched = lcs(transcribed, &window.words, matcher);
    let sequence = sequence_match(matched.len(), transcribed.len(), window.words.len());
    let overlap = overlap_score(transcribed, &window.words);
    let edit = edit_similarity(&transcribed.join(" "), &window.normalized_text);

    WindowScore {
        confidence: SEQUENCE_WEIGHT * sequence + OVERLAP_WEIGHT * overlap + EDIT_WEIGHT * edit,
        accuracy: sequence,
        matched_words: matched.len(),
        total_words: window.words.len(),
        alignment_score: positional_alignment(transcribed, &window.words, matcher),
    }
}

/// Best window at or above `threshold`, by rank.
///
/// Returns the window's index in `windows`. Equal ranks keep the earliest window.
pub fn best_match(
    transcribed: &[String],
    windows: &[Window],
    threshold: f64,
    matcher: &WordMatcher,
) -> Option<(usize, WindowScore)> {
    let mut best: Option<(usize, WindowScore)> = None;
    for (index, window) in windows.iter().enumerate() {
        let score = score_window(transcribed, window, matcher);
        if score.confidence < threshold {
            continue;
        }
        if best.is_none_or(|(_, top)| score.rank() > top.rank()) {
            best = Some((index, score));
        }
    }
    best
}
