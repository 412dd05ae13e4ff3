use serde::{Deserialize, Serialize};

use crate::corpus::{Sura, Verse};
use crate::engine::normalize::{normalize, tokenize};

pub const DEFAULT_MIN_RADIUS: usize = 5;

/// A candidate contiguous span of verses within one sura.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub sura_index: u32,
    pub start_verse: usize,
    pub end_verse: usize,
    pub raw_text: String,
    pub normalized_text: String,
    pub words: Vec<String>,
}

impl Window {
    /// `verses` must be contiguous and from one sura; `None` when empty.
    pub fn from_verses(verses: &[Verse]) -> Option<Self> {
        let first = verses.first()?;
        let last = verses.last()?;
        let raw_text = verses
            .iter()
            .map(|v| v.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let normalized_text = normalize(&raw_text);
        let words = tokenize(&normalized_text);
        Some(Self {
            sura_index: first.sura_index,
            start_verse: first.verse_index,
            end_verse: last.verse_index,
            raw_text,
            normalized_text,
            words,
        })
    }

    pub fn verse_count(&self) -> usize {
        self.end_verse + 1 - self.start_verse
    }
}

/// Verses searched on either side of the cursor.
pub fn search_radius(window_size: usize, min_radius: usize) -> usize {
    min_radius.max(window_size * 2)
}

/// Every window of 1..=`window_size` verses starting within the search radius of
/// `position`, clipped to the sura.
///
/// Order is start verse ascending, then length ascending. Ranking ties resolve to
/// the earliest window in this order.
pub fn build_windows(
    sura: &Sura,
    position: usize,
    window_size: usize,
    min_radius: usize,
) -> Vec<Window> {
    let verse_count = sura.verse_count();
    if verse_count == 0 || window_size == 0 {
        return Vec::new();
    }

    let radius = search_radius(window_size, min_radius);
    let first_start = position.saturating_sub(radius).max(1);
    let last_start = position.saturating_add(radius).min(verse_count);

    let mut windows = Vec::new();
    for start in first_start..=last_start {
        for len in 1..=window_size {
            let end = start + len - 1;
            if end > verse_count {
                break;
            }
            if let Some(window) = Window::from_verses(sura.span(start, end)) {
                windows.push(window);
            }
        }
    }
    windows
}
