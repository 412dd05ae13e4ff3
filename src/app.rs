use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::Engine;
use crate::event::{AppEvent, Command};
use crate::session::{Completion, Session, SessionEvent, SessionStats};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Non-event lines for JSON output.
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Report {
    Stats(SessionStats),
    Error { message: String },
}

/// Caller side of the engine: holds the current session and applies one input
/// event at a time.
pub struct App {
    engine: Engine,
    /// Moved into each engine transition and put back with its result.
    session: Option<Session>,
    window_size: usize,
    format: OutputFormat,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        engine: Engine,
        sura: u32,
        start_verse: usize,
        window_size: usize,
        format: OutputFormat,
    ) -> Result<Self> {
        let session = engine.initialize(sura, start_verse, window_size)?;
        Ok(Self {
            engine,
            session: Some(session),
            window_size,
            format,
            should_quit: false,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Run one by-value transition on the held session.
    fn transition<T>(&mut self, apply: impl FnOnce(&Engine, Session) -> (Session, T)) -> Option<T> {
        let session = self.session.take()?;
        let (session, output) = apply(&self.engine, session);
        self.session = Some(session);
        Some(output)
    }

    pub fn handle<W: Write>(&mut self, event: AppEvent, out: &mut W) -> Result<()> {
        match event {
            AppEvent::Utterance(text) => self.handle_utterance(&text, out),
            AppEvent::Command(command) => self.handle_command(command, out),
            AppEvent::Invalid(line) => {
                warn!(line = %line, "unrecognized command");
                self.write_error(out, &format!("unrecognized command: {line}"))
            }
            AppEvent::End => {
                self.should_quit = true;
                self.write_stats(out)
            }
        }
    }

    fn handle_utterance<W: Write>(&mut self, text: &str, out: &mut W) -> Result<()> {
        let event = self
            .transition(|engine, session| engine.process_utterance(session, text))
            .flatten();
        match event {
            Some(event) => self.write_event(out, &event),
            None => {
                debug!("no event for utterance");
                Ok(())
            }
        }
    }

    fn handle_command<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Jump(verse) => {
                let rejected = self
                    .transition(|engine, session| match engine.jump_to_position(session, verse) {
                        Ok(session) => (session, None),
                        Err(rejected) => (*rejected.session, Some(rejected.error)),
                    })
                    .flatten();
                match rejected {
                    Some(err) => self.write_error(out, &err.to_string()),
                    None => self.write_stats(out),
                }
            }
            Command::Reset => {
                self.transition(|engine, session| (engine.reset_session(session), ()));
                self.write_stats(out)
            }
            Command::Stats => self.write_stats(out),
            Command::Stop => {
                self.transition(|engine, session| (engine.stop_session(session), ()));
                self.write_stats(out)
            }
            Command::Sura { index, start } => {
                match self.engine.initialize(index, start, self.window_size) {
                    Ok(session) => {
                        self.session = Some(session);
                        self.write_stats(out)
                    }
                    Err(err) => self.write_error(out, &err.to_string()),
                }
            }
        }
    }

    fn write_event<W: Write>(&self, out: &mut W, event: &SessionEvent) -> Result<()> {
        if self.format == OutputFormat::Json {
            writeln!(out, "{}", serde_json::to_string(event)?)?;
            return Ok(());
        }

        match event {
            SessionEvent::Matched {
                result,
                next_position,
                completion,
            } => {
                let verses = match result.span_len() {
                    1 => "1 verse".to_string(),
                    n => format!("{n} verses"),
                };
                writeln!(
                    out,
                    "match {}:{}-{} ({verses})  confidence {:.2}  accuracy {:.0}%  ({}/{} words)  next {}",
                    result.sura_index,
                    result.start_verse,
                    result.end_verse,
                    result.confidence,
                    result.accuracy * 100.0,
                    result.matched_words,
                    result.total_words,
                    next_position
                )?;
                match completion {
                    Completion::InProgress => {}
                    Completion::SuraComplete => {
                        writeln!(out, "sura {} complete", result.sura_index)?
                    }
                    Completion::CorpusComplete => writeln!(out, "recitation complete")?,
                }
            }
            SessionEvent::NoMatch {
                consecutive_failures,
                recovery,
            } => {
                writeln!(out, "no match  (failures: {consecutive_failures})")?;
                if let Some(recovery) = recovery {
                    writeln!(
                        out,
                        "recovering: threshold {:.2}  window {}  back to verse {}",
                        recovery.confidence_threshold, recovery.window_size, recovery.position
                    )?;
                }
            }
        }
        Ok(())
    }

    fn write_stats<W: Write>(&self, out: &mut W) -> Result<()> {
        let Some(session) = &self.session else {
            return self.write_error(out, "no active session");
        };
        let stats = session.stats();
        if self.format == OutputFormat::Json {
            writeln!(out, "{}", serde_json::to_string(&Report::Stats(stats))?)?;
            return Ok(());
        }
        writeln!(
            out,
            "sura {}  verse {}/{} ({:.0}%)  matches {}  avg confidence {:.2}  failures {}  threshold {:.2}  window {}{}",
            stats.sura_index,
            stats.current_position,
            stats.verse_count,
            stats.progress() * 100.0,
            stats.total_matches,
            stats.average_confidence,
            stats.consecutive_failures,
            stats.confidence_threshold,
            stats.window_size,
            if session.is_active() { "" } else { "  (stopped)" }
        )?;
        Ok(())
    }

    fn write_error<W: Write>(&self, out: &mut W, message: &str) -> Result<()> {
        if self.format == OutputFormat::Json {
            let report = Report::Error {
                message: message.to_string(),
            };
            writeln!(out, "{}", serde_json::to_string(&report)?)?;
        } else {
            writeln!(out, "error: {message}")?;
        }
        Ok(())
    }
}
