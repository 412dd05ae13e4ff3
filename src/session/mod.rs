pub mod result;
pub mod state;

pub use result::{Completion, MatchResult, Recovery, SessionEvent, SessionStats};
pub use state::Session;
