use crate::engine::window::Window;
use crate::session::result::{MatchResult, SessionStats};

/// Practice-run state. Owned by the caller and read through accessors; only
/// [`crate::engine::Engine`] transitions produce new values of it.
#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) sura_index: u32,
    pub(crate) verse_count: usize,
    /// Next verse the reciter is expected to start.
    pub(crate) current_position: usize,
    pub(crate) window_size: usize,
    pub(crate) confidence_threshold: f64,
    pub(crate) sliding_windows: Vec<Window>,
    pub(crate) history: Vec<MatchResult>,
    pub(crate) last_successful_match: Option<MatchResult>,
    pub(crate) consecutive_failures: u32,
    pub(crate) is_active: bool,
}

impl Session {
    pub(crate) fn new(
        sura_index: u32,
        verse_count: usize,
        start_verse: usize,
        window_size: usize,
        confidence_threshold: f64,
    ) -> Self {
        Self {
            sura_index,
            verse_count,
            current_position: start_verse,
            window_size,
            confidence_threshold,
            sliding_windows: Vec::new(),
            history: Vec::new(),
            last_successful_match: None,
            consecutive_failures: 0,
            is_active: true,
        }
    }

    pub fn sura_index(&self) -> u32 {
        self.sura_index
    }

    pub fn verse_count(&self) -> usize {
        self.verse_count
    }

    pub fn current_position(&self) -> usize {
        self.current_position
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Candidate windows around the cursor, in scoring order.
    pub fn windows(&self) -> &[Window] {
        &self.sliding_windows
    }

    pub fn history(&self) -> &[MatchResult] {
        &self.history
    }

    pub fn last_successful_match(&self) -> Option<&MatchResult> {
        self.last_successful_match.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Cursor has moved past the sura's last verse.
    pub fn is_complete(&self) -> bool {
        self.current_position > self.verse_count
    }

    pub fn average_confidence(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().map(|m| m.confidence).sum::<f64>() / self.history.len() as f64
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            sura_index: self.sura_index,
            current_position: self.current_position,
            verse_count: self.verse_count,
            total_matches: self.history.len(),
            average_confidence: self.average_confidence(),
            consecutive_failures: self.consecutive_failures,
            confidence_threshold: self.confidence_threshold,
            window_size: self.window_size,
        }
    }
}
