use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::scoring::WindowScore;
use crate::engine::window::Window;

/// One accepted scoring pass. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Index into the session's window set at the time of the match.
    pub window_index: usize,
    pub sura_index: u32,
    pub start_verse: usize,
    pub end_verse: usize,
    pub confidence: f64,
    pub accuracy: f64,
    pub matched_words: usize,
    pub total_words: usize,
    pub alignment_score: f64,
    /// Normalized utterance that produced the match.
    pub transcript: String,
    pub timestamp: DateTime<Utc>,
}

impl MatchResult {
    pub fn from_window(
        window_index: usize,
        window: &Window,
        score: WindowScore,
        transcript: String,
    ) -> Self {
        Self {
            window_index,
            sura_index: window.sura_index,
            start_verse: window.start_verse,
            end_verse: window.end_verse,
            confidence: score.confidence,
            accuracy: score.accuracy,
            matched_words: score.matched_words,
            total_words: score.total_words,
            alignment_score: score.alignment_score,
            transcript,
            timestamp: Utc::now(),
        }
    }

    /// Number of verses the match covers.
    pub fn span_len(&self) -> usize {
        self.end_verse + 1 - self.start_verse
    }
}

/// Where the cursor stands relative to the end of the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    InProgress,
    /// Cursor is past the last verse of the session's sura.
    SuraComplete,
    /// Cursor is past the last verse of the last sura in the corpus.
    CorpusComplete,
}

/// Parameters in effect after the recovery heuristic ran.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recovery {
    pub confidence_threshold: f64,
    pub window_size: usize,
    pub position: usize,
}

/// What a transition reports back to its caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Matched {
        result: MatchResult,
        next_position: usize,
        completion: Completion,
    },
    NoMatch {
        consecutive_failures: u32,
        recovery: Option<Recovery>,
    },
}

/// Snapshot for display and telemetry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub sura_index: u32,
    pub current_position: usize,
    pub verse_count: usize,
    pub total_matches: usize,
    pub average_confidence: f64,
    pub consecutive_failures: u32,
    pub confidence_threshold: f64,
    pub window_size: usize,
}

impl SessionStats {
    /// Fraction of the sura's verses already recited.
    pub fn progress(&self) -> f64 {
        if self.verse_count == 0 {
            return 0.0;
        }
        ((self.current_position.saturating_sub(1)) as f64 / self.verse_count as f64).clamp(0.0, 1.0)
    }
}
