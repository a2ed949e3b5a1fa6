//! PlanPal interactive entry point.
//!
//! # Responsibility
//! - Build the session config from flags and environment.
//! - Replay stored command logs, then run the read-execute-print loop.
//! - Exit with status 0 on `bye` or end of input.

use clap::Parser;
use log::{info, warn};
use planpal_core::config::DEFAULT_DATA_DIR;
use planpal_core::{
    init_logging, restore, AppConfig, CommandOutcome, ContactManager, ExecMode, FileLogStore,
    Interpreter, Reply,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const LINE_SEPARATOR: &str = "_________________________________________________________";

#[derive(Debug, Parser)]
#[command(name = "planpal", version, about = "Line-oriented contact manager")]
struct Cli {
    /// Storage root holding one directory per entity type.
    #[arg(long, env = "PLANPAL_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Rolling log directory (defaults to <data-dir>/logs).
    #[arg(long, env = "PLANPAL_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "PLANPAL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Start without the emergency/friend/family categories.
    #[arg(long)]
    no_default_categories: bool,
}

fn main() {
    let cli = Cli::parse();
    let config = match build_config(cli) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            std::process::exit(2);
        }
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    match run(&config, &mut input, &mut stdout) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn build_config(cli: Cli) -> Result<AppConfig, String> {
    let mut config = AppConfig {
        data_dir: cli.data_dir,
        log_dir: cli.log_dir,
        ..AppConfig::default()
    };
    if let Some(level) = cli.log_level.as_deref() {
        config = config.with_log_level(level).map_err(|err| err.to_string())?;
    }
    if cli.no_default_categories {
        config.default_categories.clear();
    }
    config.validate().map_err(|err| err.to_string())?;

    let cwd = std::env::current_dir().map_err(|err| err.to_string())?;
    Ok(config.resolve_paths(&cwd))
}

fn run<R: BufRead, W: Write>(config: &AppConfig, input: &mut R, out: &mut W) -> io::Result<()> {
    if let Err(err) = init_logging(config.log_level, &config.effective_log_dir()) {
        // Logging is optional; keep going without it.
        eprintln!("warning: logging disabled: {err}");
    }

    let store = FileLogStore::new(&config.data_dir);
    let manager = ContactManager::with_categories(store, &config.default_categories)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
    let mut interpreter = Interpreter::new(manager);

    print_block(out, &["Hello! I'm PlanPal.", "How can I be of service?"])?;
    match restore(&mut interpreter) {
        Ok(report) => {
            for source in &report.sources {
                print_block(out, &[format!("data loaded from {source}")])?;
            }
            for warning in &report.warnings {
                print_block(
                    out,
                    &[format!(
                        "skipped {} line {}: {}",
                        warning.source, warning.line_number, warning.message
                    )],
                )?;
            }
            for skipped in &report.skipped {
                print_block(
                    out,
                    &[format!(
                        "left {} untouched: {} lines are not contact records",
                        skipped.source, skipped.lines
                    )],
                )?;
            }
        }
        Err(err) => {
            warn!("event=replay module=cli status=error error_code={}", err.code());
            print_block(out, &[format!("could not load saved data: {err}")])?;
        }
    }

    let mut awaiting_category = false;
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            info!("event=input_closed module=cli status=ok");
            return Ok(());
        }

        let result = if awaiting_category {
            awaiting_category = false;
            interpreter.execute_category(&line, ExecMode::Interactive)
        } else {
            interpreter.execute(&line, ExecMode::Interactive)
        };

        match result {
            Ok(Reply { outcome, messages }) => {
                if !messages.is_empty() {
                    print_block(out, messages.as_slice())?;
                }
                match outcome {
                    CommandOutcome::Continue => {}
                    CommandOutcome::AwaitCategory => awaiting_category = true,
                    CommandOutcome::Exit => return Ok(()),
                }
            }
            Err(err) => print_block(out, &[err.to_string()])?,
        }
    }
}

fn print_block<W: Write, T: AsRef<str>>(out: &mut W, messages: &[T]) -> io::Result<()> {
    writeln!(out, "{LINE_SEPARATOR}")?;
    for message in messages {
        writeln!(out, "{}", message.as_ref())?;
    }
    writeln!(out, "{LINE_SEPARATOR}")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::run;
    use planpal_core::AppConfig;
    use std::io::Cursor;

    fn session(dir: &std::path::Path, script: &str) -> String {
        let config = AppConfig {
            data_dir: dir.join("data"),
            log_dir: Some(dir.join("logs")),
            default_categories: Vec::new(),
            ..AppConfig::default()
        };
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run(&config, &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn session_survives_errors_and_stops_on_bye() {
        let dir = tempfile::tempdir().unwrap();
        let output = session(dir.path(), "add Alice\ndelete abc\nlist\nbye\nadd Ghost\n");
        assert!(output.contains("invalid index"));
        assert!(output.contains("1. Alice"));
        assert!(output.contains("Bye. Hope to see you again!"));
        assert!(!output.contains("Ghost"));
    }

    #[test]
    fn category_sub_prompt_reads_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let output = session(
            dir.path(),
            "add Alice\ncategory\nadd friend\ncategory\nedit 1 friend\nsearch friend\n",
        );
        assert!(output.contains("Successfully added category: 'friend'"));
        assert!(output.contains("Contacts in `friend`:"));
    }

    #[test]
    fn second_session_replays_first() {
        let dir = tempfile::tempdir().unwrap();
        session(dir.path(), "add Alice\nadd Bob /phone:1\nbye\n");
        let output = session(dir.path(), "list\nbye\n");
        assert!(output.contains("data loaded from list.txt"));
        assert!(output.contains("2. Bob | phone: 1"));
    }
}
