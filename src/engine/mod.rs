pub mod align;
pub mod normalize;
pub mod scoring;
pub mod similarity;
pub mod window;

use tracing::{debug, info, warn};

use crate::corpus::{Corpus, Sura};
use crate::engine::normalize::{normalize, tokenize};
use crate::engine::scoring::best_match;
use crate::engine::similarity::{DEFAULT_WORD_SIMILARITY, WordMatcher};
use crate::engine::window::{DEFAULT_MIN_RADIUS, build_windows, search_radius};
use crate::error::{HifzError, HifzResult};
use crate::session::{Completion, MatchResult, Recovery, Session, SessionEvent};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchingParams {
    pub initial_confidence_threshold: f64,
    pub confidence_floor: f64,
    pub threshold_step: f64,
    pub default_window_size: usize,
    pub max_window_size: usize,
    pub recovery_after_failures: u32,
    pub min_search_radius: usize,
    pub word_similarity: f64,
}

impl Default for MatchingParams {
    fn default() -> Self {
        Self {
            initial_confidence_threshold: 0.7,
            confidence_floor: 0.5,
            threshold_step: 0.1,
            default_window_size: 3,
            max_window_size: 5,
            recovery_after_failures: 3,
            min_search_radius: DEFAULT_MIN_RADIUS,
            word_similarity: DEFAULT_WORD_SIMILARITY,
        }
    }
}

/// Keeps thresholds free of accumulated float error (0.7 - 0.1 stays 0.6).
fn round_threshold(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// A transition the engine refused. The session comes back untouched.
#[derive(Debug)]
pub struct Rejected {
    pub session: Box<Session>,
    pub error: HifzError,
}

impl Rejected {
    fn new(session: Session, error: HifzError) -> Self {
        Self {
            session: Box::new(session),
            error,
        }
    }

    pub fn into_session(self) -> Session {
        *self.session
    }
}

impl From<Rejected> for HifzError {
    fn from(rejected: Rejected) -> Self {
        rejected.error
    }
}

/// Alignment engine over a fixed corpus.
///
/// Every transition consumes a [`Session`] and hands back the next one; the
/// engine holds no per-session state and performs no I/O.
pub struct Engine {
    corpus: Corpus,
    params: MatchingParams,
    matcher: WordMatcher,
}

impl Engine {
    pub fn new(corpus: Corpus) -> Self {
        Self::with_params(corpus, MatchingParams::default())
    }

    pub fn with_params(corpus: Corpus, params: MatchingParams) -> Self {
        Self {
            corpus,
            matcher: WordMatcher::new(params.word_similarity),
            params,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn params(&self) -> &MatchingParams {
        &self.params
    }

    fn sura(&self, index: u32) -> HifzResult<&Sura> {
        self.corpus
            .sura(index)
            .ok_or(HifzError::SuraNotFound { sura: index })
    }

    fn check_position(sura: &Sura, verse: usize) -> HifzResult<()> {
        if verse == 0 || verse > sura.verse_count() + 1 {
            return Err(HifzError::VerseOutOfRange {
                sura: sura.index,
                verse,
                verse_count: sura.verse_count(),
            });
        }
        Ok(())
    }

    fn rebuild_windows(&self, session: &mut Session) {
        session.sliding_windows = match self.corpus.sura(session.sura_index) {
            Some(sura) => build_windows(
                sura,
                session.current_position,
                session.window_size,
                self.params.min_search_radius,
            ),
            None => Vec::new(),
        };
        debug!(
            sura = session.sura_index,
            position = session.current_position,
            window_size = session.window_size,
            radius = search_radius(session.window_size, self.params.min_search_radius),
            windows = session.sliding_windows.len(),
            "rebuilt candidate windows"
        );
    }

    fn completion(&self, session: &Session) -> Completion {
        if !session.is_complete() {
            Completion::InProgress
        } else if self.corpus.is_last_sura(session.sura_index) {
            Completion::CorpusComplete
        } else {
            Completion::SuraComplete
        }
    }

    /// Start a session at `start_verse` of `sura_index`.
    pub fn initialize(
        &self,
        sura_index: u32,
        start_verse: usize,
        window_size: usize,
    ) -> HifzResult<Session> {
        let sura = self.sura(sura_index)?;
        Self::check_position(sura, start_verse)?;
        if window_size == 0 || window_size > self.params.max_window_size {
            return Err(HifzError::InvalidWindowSize {
                window_size,
                max: self.params.max_window_size,
            });
        }

        let mut session = Session::new(
            sura_index,
            sura.verse_count(),
            start_verse,
            window_size,
            self.params.initial_confidence_threshold,
        );
        self.rebuild_windows(&mut session);
        info!(
            sura = sura_index,
            start = start_verse,
            window_size,
            "session initialized"
        );
        Ok(session)
    }

    /// Score one transcribed utterance against the current windows.
    ///
    /// Returns no event when the session is inactive or the utterance is empty
    /// after normalization; the session comes back unchanged in that case.
    pub fn process_utterance(
        &self,
        mut session: Session,
        transcribed: &str,
    ) -> (Session, Option<SessionEvent>) {
        if !session.is_active {
            debug!("utterance ignored: session inactive");
            return (session, None);
        }
        let normalized = normalize(transcribed);
        if normalized.is_empty() {
            debug!("utterance ignored: empty after normalization");
            return (session, None);
        }
        let words = tokenize(&normalized);

        let best = best_match(
            &words,
            &session.sliding_windows,
            session.confidence_threshold,
            &self.matcher,
        );

        let event = match best {
            Some((index, score)) => {
                let window = &session.sliding_windows[index];
                let result = MatchResult::from_window(index, window, score, normalized);

                session.current_position = result.end_verse + 1;
                session.consecutive_failures = 0;
                session.last_successful_match = Some(result.clone());
                session.history.push(result.clone());
                self.rebuild_windows(&mut session);

                let completion = self.completion(&session);
                info!(
                    start = result.start_verse,
                    end = result.end_verse,
                    verses = result.span_len(),
                    confidence = result.confidence,
                    accuracy = result.accuracy,
                    next = session.current_position,
                    "recitation matched"
                );
                SessionEvent::Matched {
                    result,
                    next_position: session.current_position,
                    completion,
                }
            }
            None => {
                session.consecutive_failures += 1;
                debug!(
                    failures = session.consecutive_failures,
                    threshold = session.confidence_threshold,
                    "no window above threshold"
                );
                let recovery = if session.consecutive_failures
                    >= self.params.recovery_after_failures
                {
                    Some(self.recover(&mut session))
                } else {
                    None
                };
                SessionEvent::NoMatch {
                    consecutive_failures: session.consecutive_failures,
                    recovery,
                }
            }
        };

        (session, Some(event))
    }

    /// Loosen the threshold, widen the windows and rewind to the last known-good verse.
    fn recover(&self, session: &mut Session) -> Recovery {
        session.confidence_threshold = round_threshold(
            (session.confidence_threshold - self.params.threshold_step)
                .max(self.params.confidence_floor),
        );
        session.window_size = (session.window_size + 1).min(self.params.max_window_size);
        session.current_position = session
            .last_successful_match
            .as_ref()
            .map(|m| m.start_verse)
            .unwrap_or(1);
        self.rebuild_windows(session);

        warn!(
            failures = session.consecutive_failures,
            threshold = session.confidence_threshold,
            window_size = session.window_size,
            position = session.current_position,
            "recovery triggered"
        );
        Recovery {
            confidence_threshold: session.confidence_threshold,
            window_size: session.window_size,
            position: session.current_position,
        }
    }

    /// Manual skip or rewind. Restores the initial threshold and clears failures.
    ///
    /// An out-of-range verse hands the session back unchanged inside [`Rejected`].
    pub fn jump_to_position(&self, mut session: Session, verse: usize) -> Result<Session, Rejected> {
        let checked = self
            .sura(session.sura_index)
            .and_then(|sura| Self::check_position(sura, verse));
        if let Err(error) = checked {
            return Err(Rejected::new(session, error));
        }

        session.current_position = verse;
        session.consecutive_failures = 0;
        session.confidence_threshold = self.params.initial_confidence_threshold;
        self.rebuild_windows(&mut session);
        info!(sura = session.sura_index, position = verse, "jumped to verse");
        Ok(session)
    }

    /// Drop adaptive state back to defaults, keeping the cursor.
    pub fn reset_session(&self, mut session: Session) -> Session {
        session.consecutive_failures = 0;
        session.confidence_threshold = self.params.initial_confidence_threshold;
        session.window_size = self.params.default_window_size;
        self.rebuild_windows(&mut session);
        info!(position = session.current_position, "session reset");
        session
    }

    pub fn stop_session(&self, mut session: Session) -> Session {
        session.is_active = false;
        info!(
            sura = session.sura_index,
            matches = session.history.len(),
            "session stopped"
        );
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Sura;

    fn two_verse_engine() -> Engine {
        let corpus = Corpus::new(vec![Sura::new(
            1,
            None,
            vec!["بسم الله الرحمن الرحيم", "الحمد لله رب العالمين"],
        )])
        .unwrap();
        Engine::new(corpus)
    }

    fn sample_engine() -> Engine {
        Engine::new(Corpus::sample().unwrap())
    }

    #[test]
    fn test_initialize_sets_defaults() {
        let engine = two_verse_engine();
        let session = engine.initialize(1, 1, 3).unwrap();
        assert!(session.is_active);
        assert_eq!(session.current_position, 1);
        assert_eq!(session.confidence_threshold, 0.7);
        assert_eq!(session.consecutive_failures, 0);
        assert_eq!(session.sliding_windows.len(), 3);
    }

    #[test]
    fn test_initialize_unknown_sura_fails() {
        let engine = two_verse_engine();
        let err = engine.initialize(2, 1, 3).unwrap_err();
        assert!(matches!(err, HifzError::SuraNotFound { sura: 2 }));
    }

    #[test]
    fn test_initialize_validates_position_and_window() {
        let engine = two_verse_engine();
        assert!(matches!(
            engine.initialize(1, 0, 3),
            Err(HifzError::VerseOutOfRange { .. })
        ));
        assert!(matches!(
            engine.initialize(1, 4, 3),
            Err(HifzError::VerseOutOfRange { .. })
        ));
        assert!(matches!(
            engine.initialize(1, 1, 6),
            Err(HifzError::InvalidWindowSize { .. })
        ));
        assert!(engine.initialize(1, 3, 1).is_ok());
    }

    #[test]
    fn test_match_advances_cursor() {
        let engine = two_verse_engine();
        let session = engine.initialize(1, 1, 3).unwrap();
        let (session, event) = engine.process_utterance(session, "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ");
        match event {
            Some(SessionEvent::Matched {
                result,
                next_position,
                completion,
            }) => {
                assert_eq!((result.start_verse, result.end_verse), (1, 1));
                assert_eq!(result.accuracy, 1.0);
                assert_eq!(next_position, 2);
                assert_eq!(completion, Completion::InProgress);
            }
            other => panic!("expected match, got {other:?}"),
        }
        assert_eq!(session.current_position, 2);
        assert_eq!(session.history.len(), 1);
        assert!(session.last_successful_match.is_some());
    }

    #[test]
    fn test_empty_or_inactive_is_a_no_op() {
        let engine = two_verse_engine();
        let session = engine.initialize(1, 1, 3).unwrap();

        let (session, event) = engine.process_utterance(session, "   \n ");
        assert!(event.is_none());
        assert_eq!(session.consecutive_failures, 0);

        let (session, event) = engine.process_utterance(session, "\u{064E}\u{0650}");
        assert!(event.is_none());

        let session = engine.stop_session(session);
        let (session, event) = engine.process_utterance(session, "بسم الله الرحمن الرحيم");
        assert!(event.is_none());
        assert_eq!(session.current_position, 1);
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_failures_count_and_reset_on_success() {
        let engine = two_verse_engine();
        let session = engine.initialize(1, 1, 3).unwrap();
        let (session, _) = engine.process_utterance(session, "xyz abc");
        assert_eq!(session.consecutive_failures, 1);
        let (session, _) = engine.process_utterance(session, "xyz abc");
        assert_eq!(session.consecutive_failures, 2);
        assert_eq!(session.confidence_threshold, 0.7);
        let (session, _) = engine.process_utterance(session, "بسم الله الرحمن الرحيم");
        assert_eq!(session.consecutive_failures, 0);
    }

    #[test]
    fn test_recovery_on_third_failure() {
        let engine = two_verse_engine();
        let mut session = engine.initialize(1, 1, 3).unwrap();
        let mut events = Vec::new();
        for _ in 0..3 {
            let (next, event) = engine.process_utterance(session, "xyz abc");
            session = next;
            events.push(event.unwrap());
        }
        assert!(matches!(
            events[0],
            SessionEvent::NoMatch { recovery: None, .. }
        ));
        assert!(matches!(
            events[1],
            SessionEvent::NoMatch { recovery: None, .. }
        ));
        match &events[2] {
            SessionEvent::NoMatch {
                consecutive_failures,
                recovery: Some(recovery),
            } => {
                assert_eq!(*consecutive_failures, 3);
                assert_eq!(recovery.window_size, 4);
                assert!((recovery.confidence_threshold - 0.6).abs() < 1e-9);
                assert_eq!(recovery.position, 1);
            }
            other => panic!("expected recovery, got {other:?}"),
        }
        assert!((session.confidence_threshold - 0.6).abs() < 1e-9);
        assert_eq!(session.window_size, 4);
    }

    #[test]
    fn test_recovery_respects_floor_and_cap() {
        let engine = two_verse_engine();
        let mut session = engine.initialize(1, 1, 3).unwrap();
        for _ in 0..10 {
            session = engine.process_utterance(session, "xyz abc").0;
        }
        assert!((session.confidence_threshold - 0.5).abs() < 1e-9);
        assert_eq!(session.window_size, 5);
        assert_eq!(session.consecutive_failures, 10);
    }

    #[test]
    fn test_recovery_rewinds_to_last_match_start() {
        let engine = sample_engine();
        let session = engine.initialize(1, 1, 3).unwrap();
        let (session, _) = engine.process_utterance(session, "بسم الله الرحمن الرحيم");
        let (mut session, _) = engine.process_utterance(session, "الحمد لله رب العالمين");
        assert_eq!(session.current_position, 3);
        for _ in 0..3 {
            session = engine.process_utterance(session, "xyz abc").0;
        }
        assert_eq!(session.current_position, 2);
    }

    #[test]
    fn test_jump_resets_threshold_and_failures() {
        let engine = two_verse_engine();
        let mut session = engine.initialize(1, 1, 3).unwrap();
        for _ in 0..4 {
            session = engine.process_utterance(session, "xyz abc").0;
        }
        assert!(session.confidence_threshold < 0.7);

        let window_size = session.window_size;

        let jumped = engine.jump_to_position(session, 2).unwrap();
        assert_eq!(jumped.current_position, 2);
        assert_eq!(jumped.confidence_threshold, 0.7);
        assert_eq!(jumped.consecutive_failures, 0);
        // window size is left alone
        assert_eq!(jumped.window_size, window_size);
    }

    #[test]
    fn test_rejected_jump_returns_session_unchanged() {
        let engine = two_verse_engine();
        let session = engine.process_utterance(engine.initialize(1, 1, 3).unwrap(), "xyz abc").0;

        let rejected = engine.jump_to_position(session, 9).unwrap_err();
        assert!(matches!(
            rejected.error,
            HifzError::VerseOutOfRange {
                verse: 9,
                verse_count: 2,
                ..
            }
        ));
        let session = rejected.into_session();
        assert_eq!(session.current_position, 1);
        assert_eq!(session.consecutive_failures, 1);

        let err: HifzError = engine.jump_to_position(session, 0).unwrap_err().into();
        assert!(matches!(err, HifzError::VerseOutOfRange { verse: 0, .. }));
    }

    #[test]
    fn test_recovery_without_prior_match_rewinds_to_first_verse() {
        let engine = sample_engine();
        let mut session = engine.initialize(1, 4, 3).unwrap();
        for _ in 0..2 {
            session = engine.process_utterance(session, "xyz abc").0;
        }
        assert_eq!(session.current_position, 4);

        let (session, event) = engine.process_utterance(session, "xyz abc");
        assert!(matches!(
            event,
            Some(SessionEvent::NoMatch {
                recovery: Some(Recovery { position: 1, .. }),
                ..
            })
        ));
        assert_eq!(session.current_position, 1);
        assert!(session.last_successful_match.is_none());
        assert_eq!(session.sliding_windows[0].start_verse, 1);
    }

    #[test]
    fn test_reset_keeps_position() {
        let engine = sample_engine();
        let mut session = engine.initialize(1, 4, 3).unwrap();
        for _ in 0..3 {
            session = engine.process_utterance(session, "xyz abc").0;
        }
        // recovery with no prior match rewound the cursor
        assert_eq!(session.current_position, 1);
        session = engine.jump_to_position(session, 5).unwrap();
        session = engine.process_utterance(session, "xyz abc").0;
        let session = engine.reset_session(session);
        assert_eq!(session.current_position, 5);
        assert_eq!(session.window_size, 3);
        assert_eq!(session.confidence_threshold, 0.7);
        assert_eq!(session.consecutive_failures, 0);
    }

    #[test]
    fn test_completion_is_reported_at_sura_and_corpus_end() {
        let engine = sample_engine();

        let session = engine.initialize(1, 7, 3).unwrap();
        let (_, event) = engine.process_utterance(
            session,
            "صراط الذين أنعمت عليهم غير المغضوب عليهم ولا الضالين",
        );
        assert!(matches!(
            event,
            Some(SessionEvent::Matched {
                completion: Completion::SuraComplete,
                ..
            })
        ));

        let session = engine.initialize(112, 4, 3).unwrap();
        let (session, event) = engine.process_utterance(session, "ولم يكن له كفوا أحد");
        assert!(matches!(
            event,
            Some(SessionEvent::Matched {
                completion: Completion::CorpusComplete,
                ..
            })
        ));
        assert!(session.is_complete());
    }

    #[test]
    fn test_round_threshold_removes_float_noise() {
        assert_eq!(round_threshold(0.7 - 0.1), 0.6);
        assert_eq!(round_threshold(0.6 - 0.1), 0.5);
    }
}
