use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use hifz::app::{App, OutputFormat};
use hifz::config::Config;
use hifz::event::EventHandler;
use hifz::logging::{self, LogFormat};
use hifz::{Corpus, Engine};

#[derive(Parser)]
#[command(
    name = "hifz",
    version,
    about = "Follow a memorized Quran recitation from transcribed utterances"
)]
struct Cli {
    #[arg(short, long, help = "Sura to recite (defaults to the configured sura)")]
    sura: Option<u32>,

    #[arg(long, default_value_t = 1, help = "Verse to start from")]
    start: usize,

    #[arg(short, long, help = "Verses per candidate window")]
    window: Option<usize>,

    #[arg(short, long, help = "JSON corpus file (defaults to the bundled sample)")]
    corpus: Option<PathBuf>,

    #[arg(short, long, help = "Read transcribed lines from a file instead of stdin")]
    input: Option<PathBuf>,

    #[arg(long, help = "Print events as JSON lines")]
    json: bool,

    #[arg(short, long, help = "Log window rebuilds and scoring to stderr")]
    verbose: bool,

    #[arg(long, help = "Write the effective config file and exit")]
    save_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose {
        logging::VERBOSE_FILTER
    } else {
        logging::DEFAULT_FILTER
    };
    logging::init(filter, LogFormat::from_env());

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(err) if cli.save_config => {
            return Err(err.context("not overwriting an unreadable config"));
        }
        Err(err) => {
            warn!(error = %err, "could not read config, using defaults");
            Config::default()
        }
    };
    let fixed = config.validate();
    if !fixed.is_empty() {
        warn!(keys = ?fixed, "reset invalid config values to defaults");
    }
    if cli.save_config {
        let path = config.save()?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let corpus_path = cli
        .corpus
        .or_else(|| config.corpus_path.as_ref().map(PathBuf::from));
    let corpus = match corpus_path {
        Some(path) => Corpus::load(&path)
            .with_context(|| format!("loading corpus from {}", path.display()))?,
        None => Corpus::sample()?,
    };
    info!(
        suras = corpus.suras().len(),
        verses = corpus.total_verses(),
        "corpus loaded"
    );

    let engine = Engine::with_params(corpus, config.matching_params());
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut app = App::new(
        engine,
        cli.sura.unwrap_or(config.default_sura),
        cli.start,
        cli.window.unwrap_or(config.default_window_size),
        format,
    )?;

    let events = match cli.input {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("opening input {}", path.display()))?;
            EventHandler::new(BufReader::new(file))
        }
        None => EventHandler::new(BufReader::new(io::stdin())),
    };

    run_app(&mut app, &events)
}

fn run_app(app: &mut App, events: &EventHandler) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    while !app.should_quit {
        let event = events.next()?;
        app.handle(event, &mut out)?;
        out.flush()?;
    }
    Ok(())
}
