use thiserror::Error;

pub type HifzResult<T> = Result<T, HifzError>;

#[derive(Debug, Error)]
pub enum HifzError {
    #[error("sura {sura} not found in corpus")]
    SuraNotFound { sura: u32 },

    #[error("verse {verse} is out of range for sura {sura} (1..={verse_count}, or one past the end)")]
    VerseOutOfRange {
        sura: u32,
        verse: usize,
        verse_count: usize,
    },

    #[error("window size {window_size} must be between 1 and {max}")]
    InvalidWindowSize { window_size: usize, max: usize },

    #[error("invalid corpus: {0}")]
    InvalidCorpus(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),
}
