// The `hifz` binary in main.rs is a thin driver over this library; integration
// tests and criterion benchmarks use the same paths (`hifz::engine::*`, `hifz::session::*`).

pub mod app;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod event;
pub mod logging;
pub mod session;

pub use corpus::{Corpus, Sura, Verse};
pub use engine::{Engine, MatchingParams, Rejected};
pub use error::{HifzError, HifzResult};
pub use session::{Completion, MatchResult, Session, SessionEvent, SessionStats};
