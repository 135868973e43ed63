use std::fmt;
use std::io;
use std::path::PathBuf;

use quiz_core::model::{CategoryId, QuizId};
use services::{AppServices, Clock};
use storage::Catalog;
use storage::json::load_catalog_file;
use tracing_subscriber::{
    EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

mod config;
mod console;

use config::Config;
use console::Console;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidId { raw } => write!(f, "invalid id: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Browse,
    Categories,
    Quizzes(CategoryId),
    Play(QuizId),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Bundled,
    File(PathBuf),
    /// `SQLite` database, optionally seeded from a catalog file first.
    Sqlite { url: String, seed: Option<PathBuf> },
}

#[derive(Debug)]
struct Args {
    command: Command,
    source: Source,
}

impl Args {
    fn parse(
        config: &Config,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = config.db_url.clone();
        let mut catalog = config.catalog.clone();
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(value);
                }
                "--catalog" => {
                    catalog = Some(PathBuf::from(require_value(&mut args, "--catalog")?));
                }
                "--help" | "-h" => positional.insert(0, "help".to_string()),
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let command = match positional.next().as_deref() {
            None | Some("browse") => Command::Browse,
            Some("help") => Command::Help,
            Some("categories") => Command::Categories,
            Some("quizzes") => {
                let raw = positional.next().ok_or(ArgsError::MissingValue {
                    flag: "quizzes <category>",
                })?;
                Command::Quizzes(raw.parse().map_err(|_| ArgsError::InvalidId { raw })?)
            }
            Some("play") => {
                let raw = positional.next().ok_or(ArgsError::MissingValue {
                    flag: "play <quiz-id>",
                })?;
                Command::Play(raw.parse().map_err(|_| ArgsError::InvalidId { raw })?)
            }
            Some(other) => return Err(ArgsError::UnknownCommand(other.to_string())),
        };
        if let Some(extra) = positional.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        let source = match (db_url, catalog) {
            (Some(url), seed) => Source::Sqlite { url, seed },
            (None, Some(path)) => Source::File(path),
            (None, None) => Source::Bundled,
        };

        Ok(Self { command, source })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [browse]               pick a category and quiz interactively");
    eprintln!("  quiz categories             list categories");
    eprintln!("  quiz quizzes <category>     list quizzes in a category");
    eprintln!("  quiz play <quiz-id>         play a quiz");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>     read content from SQLite");
    eprintln!("  --catalog <path>      JSON catalog (imported into --db when both are given)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_CATALOG, RUST_LOG");
}

async fn build_services(
    source: &Source,
    clock: Clock,
) -> Result<AppServices, Box<dyn std::error::Error>> {
    let app = match source {
        Source::Bundled => AppServices::in_memory(clock)?,
        Source::File(path) => AppServices::from_catalog_file(path, clock)?,
        Source::Sqlite { url, seed } => {
            let seed: Option<Catalog> = seed.as_deref().map(load_catalog_file).transpose()?;
            AppServices::sqlite(url, clock, seed.as_ref()).await?
        }
    };
    Ok(app)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.rust_log))
        .with(log_fmt::layer().with_writer(io::stderr).with_target(false))
        .init();

    let args = Args::parse(&config, std::env::args().skip(1)).map_err(|e| {
        print_usage();
        e
    })?;
    if args.command == Command::Help {
        print_usage();
        return Ok(());
    }

    tracing::info!(source = ?args.source, command = ?args.command, "starting");
    let app = build_services(&args.source, Clock::default_clock()).await?;
    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());

    match &args.command {
        Command::Browse => {
            console.browse(&app).await?;
        }
        Command::Categories => {
            let categories = app.catalog().list_categories().await?;
            console.print_categories(&categories)?;
        }
        Command::Quizzes(category) => {
            console.show_category(&app.catalog(), category).await?;
        }
        Command::Play(quiz_id) => {
            if let Err(err) = console.play(&app.sessions(), quiz_id).await {
                tracing::warn!(quiz = %quiz_id, error = %err, "could not play quiz");
                return Err(err);
            }
        }
        Command::Help => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            db_url: None,
            catalog: None,
            rust_log: "info".into(),
        }
    }

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(&config(), args.iter().map(ToString::to_string))
    }

    #[test]
    fn no_arguments_browses_bundled_catalog() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.command, Command::Browse);
        assert_eq!(args.source, Source::Bundled);
    }

    #[test]
    fn play_takes_a_quiz_id() {
        let args = parse(&["play", "world-wars"]).unwrap();
        assert_eq!(args.command, Command::Play(QuizId::new("world-wars")));
    }

    #[test]
    fn quizzes_requires_a_category() {
        assert!(matches!(
            parse(&["quizzes"]),
            Err(ArgsError::MissingValue { .. })
        ));
    }

    #[test]
    fn db_flag_overrides_environment_and_keeps_catalog_as_seed() {
        let config = Config {
            db_url: Some("sqlite:env.sqlite3".into()),
            catalog: Some(PathBuf::from("catalog.json")),
            rust_log: "info".into(),
        };
        let args = Args::parse(
            &config,
            ["--db", "sqlite::memory:", "categories"].map(String::from),
        )
        .unwrap();
        assert_eq!(
            args.source,
            Source::Sqlite {
                url: "sqlite::memory:".into(),
                seed: Some(PathBuf::from("catalog.json")),
            }
        );
        assert_eq!(args.command, Command::Categories);
    }

    #[test]
    fn catalog_alone_reads_the_file() {
        let args = parse(&["--catalog", "my.json", "categories"]).unwrap();
        assert_eq!(args.source, Source::File(PathBuf::from("my.json")));
    }

    #[test]
    fn rejects_unknown_flags_and_commands() {
        assert!(matches!(parse(&["--verbose"]), Err(ArgsError::UnknownArg(_))));
        assert!(matches!(parse(&["shuffle"]), Err(ArgsError::UnknownCommand(_))));
        assert!(matches!(parse(&["--db", " "]), Err(ArgsError::InvalidDbUrl { .. })));
    }
}
