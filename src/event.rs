use std::io::BufRead;
use std::sync::mpsc;
use std::thread;

use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Jump(usize),
    Reset,
    Stats,
    Stop,
    Sura { index: u32, start: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEvent {
    /// Already-transcribed text for one utterance.
    Utterance(String),
    Command(Command),
    /// A `:` line that did not parse.
    Invalid(String),
    /// Input exhausted.
    End,
}

/// Lines starting with `:` are commands, everything else is an utterance.
pub fn parse_line(line: &str) -> AppEvent {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix(':') else {
        return AppEvent::Utterance(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let command = match (parts.next(), parts.next(), parts.next()) {
        (Some("jump"), Some(n), None) => n.parse().ok().map(Command::Jump),
        (Some("reset"), None, None) => Some(Command::Reset),
        (Some("stats"), None, None) => Some(Command::Stats),
        (Some("stop"), None, None) => Some(Command::Stop),
        (Some("sura"), Some(n), start) => {
            let start = match start {
                Some(s) => s.parse().ok(),
                None => Some(1),
            };
            match (n.parse().ok(), start, parts.next()) {
                (Some(index), Some(start), None) => Some(Command::Sura { index, start }),
                _ => None,
            }
        }
        _ => None,
    };

    command
        .map(AppEvent::Command)
        .unwrap_or_else(|| AppEvent::Invalid(trimmed.to_string()))
}

/// Feeds input lines to the caller strictly one at a time, in arrival order.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(parse_line(&line)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "stopped reading input");
                        break;
                    }
                }
            }
            let _ = tx.send(AppEvent::End);
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
