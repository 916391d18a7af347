use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fingerspell::config::{Config, SpeechEngineKind};
use fingerspell::frames::{self, ControlCommand, FrameRecord, Input};
use fingerspell::resolver::Symbol;
use fingerspell::session::{FrameOutcome, Session};
use fingerspell::speech::{CommandEngine, SilentEngine, Speech, SpeechEngine};
use fingerspell::stats::AccuracyReport;
use fingerspell::suggest::{Dictionary, SuggestionProvider};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "fingerspell", version, about = "Finger-spelling to text")]
struct Cli {
    /// Config file (default: ./fingerspell.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Recognize a live JSON-lines frame stream (default)
    Run {
        /// Read frames from a file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Replay a labelled recording and report per-letter accuracy
    Eval {
        file: PathBuf,
        /// Write the report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[hotpath::main]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "fingerspell=debug"
    } else {
        "fingerspell=info"
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let config = Config::load(cli.config.as_deref());

    match cli.command.unwrap_or(Command::Run { input: None }) {
        Command::Run { input } => run(&config, input),
        Command::Eval { file, report } => eval(&config, &file, report.as_deref()),
    }
}

fn build_speech(config: &Config) -> Speech {
    let speech = &config.speech;
    let engine: Box<dyn SpeechEngine> = match speech.engine {
        SpeechEngineKind::Command => match &speech.program {
            Some(program) => Box::new(CommandEngine::new(program.clone(), speech.args.clone())),
            None => Box::new(CommandEngine::system_default(speech.rate)),
        },
        SpeechEngineKind::Silent => Box::new(SilentEngine),
    };
    Speech::spawn(engine, speech.enabled)
}

fn build_suggester(config: &Config) -> Result<Box<dyn SuggestionProvider>> {
    let max = config.suggestions.max;
    let dictionary = match &config.suggestions.dictionary {
        Some(path) => Dictionary::load(path, max)?,
        None => Dictionary::builtin(max),
    };
    tracing::info!("dictionary: {} words", dictionary.len());
    Ok(Box::new(dictionary))
}

// ============================================================================
// Live mode
// ============================================================================

fn run(config: &Config, input: Option<PathBuf>) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))?;

    let reader: Box<dyn BufRead + Send> = match &input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let (line_tx, line_rx) = flume::bounded::<String>(64);
    thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("input read failed: {}", e);
                    break;
                }
            }
        }
    });

    let mut session = Session::new(Box::new(build_speech(config)), build_suggester(config)?);
    tracing::info!(
        "ready, reading frames from {}",
        input
            .as_deref()
            .map_or("stdin".to_string(), |p| p.display().to_string())
    );

    let mut line_no = 0usize;
    let mut last_printed: Option<(Symbol, String)> = None;
    while running.load(Ordering::SeqCst) {
        let line = match line_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => line,
            Err(flume::RecvTimeoutError::Timeout) => continue,
            Err(flume::RecvTimeoutError::Disconnected) => break,
        };
        line_no += 1;

        match frames::parse_line(&line) {
            Ok(Some(Input::Frame(frame))) => {
                handle_frame(&mut session, &frame, line_no, &mut last_printed)
            }
            Ok(Some(Input::Command(command))) => {
                apply_command(&mut session, command);
                print_text(&session);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("line {}: {:#}", line_no, e),
        }
    }

    println!("{}", session.text());
    eprint!("{}", session.stats().summary());
    Ok(())
}

fn handle_frame(
    session: &mut Session,
    frame: &FrameRecord,
    line_no: usize,
    last_printed: &mut Option<(Symbol, String)>,
) {
    let observation = frame.observation();
    match session.process_frame(observation.as_ref()) {
        Ok(FrameOutcome::Recognized { symbol, text, .. }) => {
            // only print when something visible changed
            if last_printed.as_ref() != Some(&(symbol, text.clone())) {
                println!("{:>9} | {}", symbol.label(), text);
                if !session.suggestions().is_empty() {
                    println!("{:>9} | {}", "", session.suggestions().join("  "));
                }
                *last_printed = Some((symbol, text));
            }
        }
        Ok(FrameOutcome::NoHand) => {}
        Err(e) => tracing::warn!("line {}: frame skipped: {}", line_no, e),
    }
}

fn apply_command(session: &mut Session, command: ControlCommand) {
    tracing::debug!(?command, "control command");
    match command {
        ControlCommand::Space => session.add_space(),
        ControlCommand::Backspace => {
            session.backspace();
        }
        ControlCommand::Clear => session.clear(),
        ControlCommand::Speak => session.speak_text(),
        ControlCommand::ToggleSpeech => {
            let enabled = session.toggle_speech();
            println!("speech {}", if enabled { "on" } else { "off" });
        }
        ControlCommand::Pick { index } => {
            session.pick_suggestion(index);
        }
        ControlCommand::Replace { word } => {
            session.replace_active_word(&word);
        }
    }
}

fn print_text(session: &Session) {
    println!("{:>9} | {}", "", session.text());
}

// ============================================================================
// Evaluation mode
// ============================================================================

#[derive(Serialize)]
struct EvalReport<'a> {
    timestamp: String,
    file: String,
    frames: usize,
    accuracy: f64,
    text: &'a str,
    #[serde(flatten)]
    report: &'a AccuracyReport,
}

fn eval(config: &Config, file: &Path, report_path: Option<&Path>) -> Result<()> {
    let contents =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let inputs = frames::parse_all(&contents).with_context(|| format!("parsing {}", file.display()))?;

    let speech = Speech::spawn(Box::new(SilentEngine), false);
    let mut session = Session::new(Box::new(speech), build_suggester(config)?);
    let mut report = AccuracyReport::default();
    let mut frames = 0usize;

    for input in inputs {
        match input {
            Input::Frame(frame) => {
                frames += 1;
                let recognized = match session.process_frame(frame.observation().as_ref()) {
                    Ok(FrameOutcome::Recognized { symbol, .. }) => symbol.label(),
                    Ok(FrameOutcome::NoHand) => "none".to_string(),
                    Err(e) => {
                        tracing::debug!("frame {} rejected: {}", frames, e);
                        "invalid".to_string()
                    }
                };
                if let Some(expected) = &frame.expected {
                    report.record(&normalize_label(expected), &recognized);
                }
            }
            Input::Command(command) => apply_command(&mut session, command),
        }
    }

    print!("{}", report.summary());
    println!("Text: {:?}", session.text());
    eprint!("{}", session.stats().summary());

    if let Some(path) = report_path {
        let json = EvalReport {
            timestamp: chrono::Local::now().to_rfc3339(),
            file: file.display().to_string(),
            frames,
            accuracy: report.overall().accuracy(),
            text: session.text(),
            report: &report,
        };
        let json = serde_json::to_string_pretty(&json)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("report written to {}", path.display());
    }
    Ok(())
}

/// Labels in recordings are case-insensitive: `a` means `A`, `Space` means
/// `space`
fn normalize_label(label: &str) -> String {
    let label = label.trim();
    let mut chars = label.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_uppercase().to_string(),
        _ => label.to_lowercase(),
    }
}
