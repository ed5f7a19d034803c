use std::fmt;

use coach_core::model::{ConversationId, RecallQuality, ScenarioCategory};
use services::{AppConfig, AppServices, Clock};

mod commands;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidQuality { raw: String },
    InvalidCategory { raw: String },
    InvalidConversationId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing argument: <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidQuality { raw } => {
                write!(f, "invalid quality: {raw} (expected 0-5)")
            }
            ArgsError::InvalidCategory { raw } => write!(f, "invalid --category value: {raw}"),
            ArgsError::InvalidConversationId { raw } => {
                write!(f, "invalid conversation id: {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  level-test                              take the CEFR placement test");
    eprintln!("  vocab [--level L] [--count N] [--save]  show (and optionally save) words");
    eprintln!("  review <word> <quality>                 grade a recall from 0 to 5");
    eprintln!("  due                                     list words due today");
    eprintln!("  chat --scenario S [--new] <message...>  talk in a scenario");
    eprintln!("  history --scenario S                    list saved dialogues");
    eprintln!("  forget <conversation-id>                delete a saved dialogue");
    eprintln!("  write <text...>                         get a grammar correction");
    eprintln!("  sentences                               list corrected writing");
    eprintln!("  scenarios [--category C]                list conversation scenarios");
    eprintln!("  progress                                show streak and level");
    eprintln!("  reset                                   delete all learner data");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COACH_DB_URL, AI_PROVIDER, OPENAI_API_KEY, OPENAI_BASE_URL, OPENAI_MODEL,");
    eprintln!("  GEMINI_API_KEY, GEMINI_BASE_URL, GEMINI_MODEL, LEVEL_TEST_PACING_MS, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    LevelTest,
    Vocab {
        level: Option<String>,
        count: Option<usize>,
        save: bool,
    },
    Review {
        word: String,
        quality: RecallQuality,
    },
    Due,
    Chat {
        scenario: String,
        new: bool,
        message: String,
    },
    History {
        scenario: String,
    },
    Forget {
        id: ConversationId,
    },
    Scenarios {
        category: Option<ScenarioCategory>,
    },
    Write {
        text: String,
    },
    Sentences,
    Progress,
    Reset,
}

struct Args {
    db_url: Option<String>,
    command: Command,
}

impl Args {
    fn parse(argv: Vec<String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = None;
        let mut rest = Vec::with_capacity(argv.len());
        let mut iter = argv.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut iter, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value));
                }
                "--help" | "-h" => return Ok(None),
                _ => rest.push(arg),
            }
        }

        let mut iter = rest.into_iter();
        let Some(name) = iter.next() else {
            return Ok(None);
        };
        let command = match name.as_str() {
            "level-test" => no_more_args(&mut iter, Command::LevelTest)?,
            "vocab" => parse_vocab(&mut iter)?,
            "review" => parse_review(&mut iter)?,
            "due" => no_more_args(&mut iter, Command::Due)?,
            "chat" => parse_chat(&mut iter)?,
            "history" => {
                let scenario = parse_scenario_only(&mut iter)?;
                Command::History { scenario }
            }
            "forget" => {
                let raw = iter
                    .next()
                    .ok_or(ArgsError::MissingArgument { name: "conversation-id" })?;
                let id = raw
                    .parse()
                    .map_err(|_| ArgsError::InvalidConversationId { raw: raw.clone() })?;
                no_more_args(&mut iter, Command::Forget { id })?
            }
            "scenarios" => parse_scenarios(&mut iter)?,
            "write" => {
                let words: Vec<String> = iter.by_ref().collect();
                if words.is_empty() {
                    return Err(ArgsError::MissingArgument { name: "text" });
                }
                Command::Write {
                    text: words.join(" "),
                }
            }
            "sentences" => no_more_args(&mut iter, Command::Sentences)?,
            "progress" => no_more_args(&mut iter, Command::Progress)?,
            "reset" => no_more_args(&mut iter, Command::Reset)?,
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        Ok(Some(Self { db_url, command }))
    }
}

fn no_more_args(
    args: &mut impl Iterator<Item = String>,
    command: Command,
) -> Result<Command, ArgsError> {
    match args.next() {
        Some(extra) => Err(ArgsError::UnknownArg(extra)),
        None => Ok(command),
    }
}

fn parse_vocab(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut level = None;
    let mut count = None;
    let mut save = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--level" => level = Some(require_value(args, "--level")?),
            "--count" => {
                let value = require_value(args, "--count")?;
                let parsed: usize = value.parse().map_err(|_| ArgsError::InvalidNumber {
                    flag: "--count",
                    raw: value.clone(),
                })?;
                count = Some(parsed);
            }
            "--save" => save = true,
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Vocab { level, count, save })
}

fn parse_review(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let word = args.next().ok_or(ArgsError::MissingArgument { name: "word" })?;
    let raw = args
        .next()
        .ok_or(ArgsError::MissingArgument { name: "quality" })?;
    let quality = raw
        .parse::<u8>()
        .ok()
        .and_then(|value| RecallQuality::new(value).ok())
        .ok_or_else(|| ArgsError::InvalidQuality { raw: raw.clone() })?;
    no_more_args(args, Command::Review { word, quality })
}

fn parse_chat(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut scenario = None;
    let mut new = false;
    let mut words = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scenario" => scenario = Some(require_value(args, "--scenario")?),
            "--new" => new = true,
            _ => words.push(arg),
        }
    }
    let scenario = scenario.ok_or(ArgsError::MissingValue { flag: "--scenario" })?;
    if words.is_empty() {
        return Err(ArgsError::MissingArgument { name: "message" });
    }
    Ok(Command::Chat {
        scenario,
        new,
        message: words.join(" "),
    })
}

fn parse_scenario_only(args: &mut impl Iterator<Item = String>) -> Result<String, ArgsError> {
    let mut scenario = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scenario" => scenario = Some(require_value(args, "--scenario")?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    scenario.ok_or(ArgsError::MissingValue { flag: "--scenario" })
}

fn parse_scenarios(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut category = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--category" => {
                let value = require_value(args, "--category")?;
                let parsed = value
                    .parse::<ScenarioCategory>()
                    .map_err(|_| ArgsError::InvalidCategory { raw: value.clone() })?;
                category = Some(parsed);
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Scenarios { category })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Only fails if a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let parsed = match Args::parse(argv) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return Err(e.into());
        }
    };

    init_tracing();

    let mut config = AppConfig::from_env()?;
    config.db_url = parsed
        .db_url
        .unwrap_or_else(|| normalize_sqlite_url(config.db_url.clone()));

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&config.db_url)?;
    let services = AppServices::new_sqlite(&config, Clock::default_clock()).await?;

    commands::execute(&services, parsed.command).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        Args::parse(args.iter().map(|s| (*s).to_string()).collect())
    }

    fn command(args: &[&str]) -> Command {
        parse(args).unwrap().unwrap().command
    }

    #[test]
    fn no_arguments_prints_usage() {
        assert!(parse(&[]).unwrap().is_none());
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn db_flag_is_global() {
        let args = parse(&["due", "--db", "sqlite::memory:"]).unwrap().unwrap();
        assert_eq!(args.db_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(args.command, Command::Due);
    }

    #[test]
    fn vocab_flags() {
        assert_eq!(
            command(&["vocab", "--level", "B2", "--count", "3", "--save"]),
            Command::Vocab {
                level: Some("B2".into()),
                count: Some(3),
                save: true,
            }
        );
        assert!(matches!(
            parse(&["vocab", "--count", "many"]),
            Err(ArgsError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn review_validates_quality() {
        assert_eq!(
            command(&["review", "feasible", "4"]),
            Command::Review {
                word: "feasible".into(),
                quality: RecallQuality::new(4).unwrap(),
            }
        );
        assert!(matches!(
            parse(&["review", "feasible", "6"]),
            Err(ArgsError::InvalidQuality { .. })
        ));
    }

    #[test]
    fn chat_joins_message_words() {
        assert_eq!(
            command(&["chat", "--scenario", "cafe", "One", "latte", "please"]),
            Command::Chat {
                scenario: "cafe".into(),
                new: false,
                message: "One latte please".into(),
            }
        );
        assert!(matches!(
            parse(&["chat", "hello"]),
            Err(ArgsError::MissingValue { flag: "--scenario" })
        ));
        assert!(matches!(
            parse(&["chat", "--scenario", "cafe"]),
            Err(ArgsError::MissingArgument { name: "message" })
        ));
    }

    #[test]
    fn write_joins_text_words() {
        assert_eq!(
            command(&["write", "He", "don't", "like", "apple."]),
            Command::Write {
                text: "He don't like apple.".into(),
            }
        );
        assert!(matches!(
            parse(&["write"]),
            Err(ArgsError::MissingArgument { name: "text" })
        ));
        assert_eq!(command(&["sentences"]), Command::Sentences);
    }

    #[test]
    fn scenarios_category_is_parsed() {
        assert_eq!(
            command(&["scenarios", "--category", "travel"]),
            Command::Scenarios {
                category: Some(ScenarioCategory::Travel),
            }
        );
        assert!(matches!(
            parse(&["scenarios", "--category", "space"]),
            Err(ArgsError::InvalidCategory { .. })
        ));
    }

    #[test]
    fn unknown_input_is_rejected() {
        assert!(matches!(parse(&["fly"]), Err(ArgsError::UnknownCommand(_))));
        assert!(matches!(parse(&["due", "now"]), Err(ArgsError::UnknownArg(_))));
        assert!(matches!(
            parse(&["forget", "has space"]),
            Err(ArgsError::InvalidConversationId { .. })
        ));
    }

    #[test]
    fn sqlite_urls_are_normalized() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite://coach.sqlite3".into()),
            "sqlite://coach.sqlite3"
        );
        assert_eq!(normalize_sqlite_url("/tmp/c.db".into()), "sqlite:///tmp/c.db");
    }
}
