//! Cmdhist CLI - logs shell commands and reports on logged history

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cmdhist::config;
use cmdhist::format::{self, AlignedFormatter, Formatter};
use cmdhist::session::{self, SESSION_ID_VAR};
use cmdhist::storage::ResultSet;
use cmdhist::{CommandRecord, Config, HistoryStore, QueryCatalog, SessionRecord};

#[derive(Parser)]
#[command(name = "cmdhist")]
#[command(version)]
#[command(about = "Shell command history logger with saved-query reporting")]
#[command(long_about = r#"
Cmdhist records shell sessions and commands into a SQLite database and
reports on them through named queries defined in /etc/cmdhist/queries and
~/.cmdhist/queries.

Example usage:
  cmdhist session-id
  cmdhist log -c 'make test' -e 0 -s 1700000000 -f 1700000004 -n 12
  cmdhist query recent --format auto
"#)]
struct Cli {
    /// A history database to use instead of $CMDHIST_HISTORY_DB
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a command into the history database
    Log {
        /// The command text to log
        #[arg(short, long)]
        command: Option<String>,

        /// The exit code of the logged command
        #[arg(short = 'e', long, default_value_t = 0)]
        exit_code: i64,

        /// Pipe exit statuses, joined with underscores (e.g. 0_1_0)
        #[arg(short = 'p', long)]
        pipe_status: Option<String>,

        /// Timestamp when the command started
        #[arg(short = 's', long, default_value_t = 0)]
        start_time: i64,

        /// Timestamp when the command finished
        #[arg(short = 'f', long, default_value_t = 0)]
        finish_time: i64,

        /// The shell's builtin history number for the command
        #[arg(short = 'n', long)]
        number: Option<i64>,

        /// A message to print to stderr before logging
        #[arg(short, long)]
        alert: Option<String>,

        /// Exit with this code (to preserve $? for the shell hook)
        #[arg(short = 'x', long)]
        exit: Option<i32>,
    },

    /// Emit the current session id, inserting a new session if needed
    SessionId,

    /// Stamp the current session's end time and duration
    EndSession,

    /// Execute a saved query and print its results
    Query {
        /// The name of the saved query
        name: String,

        /// An output format (see list-formats)
        #[arg(short, long)]
        format: Option<String>,

        /// Limit the number of rows returned
        #[arg(short, long)]
        limit: Option<i64>,

        /// Hide column headings from query results
        #[arg(short = 'H', long)]
        hide_headings: bool,

        /// Display results in reverse order
        #[arg(short = 'R', long)]
        reverse: bool,
    },

    /// Print a saved query's SQL without executing it
    PrintQuery {
        /// The name of the saved query
        name: String,
    },

    /// Display all saved queries
    ListQueries,

    /// Display all available output formats
    ListFormats,
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    let cli = parse_args(&config);

    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Log {
            command,
            exit_code,
            pipe_status,
            start_time,
            finish_time,
            number,
            alert,
            exit,
        } => {
            if let Some(message) = &alert {
                eprintln!("{}", message);
            }

            // A disabled logger must stay out of the shell's way entirely.
            if !config.sets("DISABLED") {
                let used_log_flags = command.is_some()
                    || number.is_some()
                    || pipe_status.is_some()
                    || start_time != 0
                    || finish_time != 0
                    || exit_code != 0;
                if used_log_flags {
                    let store = open_store(&cli.database, &config)?;
                    let record = CommandRecord::capture(
                        command,
                        exit_code,
                        start_time,
                        finish_time,
                        number,
                        pipe_status,
                    );
                    let rowid = store.insert(&record)?;
                    tracing::debug!(rowid, "logged command");
                }
            }

            if let Some(code) = exit {
                std::process::exit(code);
            }
        }

        Commands::SessionId => {
            match cmdhist::unix::get_env(SESSION_ID_VAR) {
                Some(id) if !id.is_empty() => println!("{}", id),
                _ => {
                    let store = open_store(&cli.database, &config)?;
                    let id = store.insert(&SessionRecord::capture())?;
                    println!("{}", id);
                }
            }
        }

        Commands::EndSession => {
            let store = open_store(&cli.database, &config)?;
            let session_id = cmdhist::unix::get_env_int(SESSION_ID_VAR);
            let updated = session::close_session(&store, session_id)?;
            if updated == 0 {
                tracing::warn!(session_id, "no session row to close");
            }
        }

        Commands::Query {
            name,
            format,
            limit,
            hide_headings,
            reverse,
        } => {
            let catalog = load_catalog(&config);

            let format_name = format
                .or_else(|| config.get_string("DEFAULT_FORMAT").map(str::to_string))
                .unwrap_or_else(|| "aligned".to_string());
            let Some(formatter) = format::lookup(&format_name) else {
                eprintln!("Unknown format: '{}'\n", format_name);
                print_listing(&format::listing(), &mut io::stderr())?;
                std::process::exit(1);
            };

            let Some((_, sql)) = catalog.resolved(&name) else {
                eprintln!("Query not found: {}\nAvailable:", name);
                print_listing(&catalog.listing(), &mut io::stderr())?;
                std::process::exit(1);
            };

            let store = open_store(&cli.database, &config)?;
            match store.fetch(&sql, &[], limit.unwrap_or(0)) {
                Ok(Some(mut rs)) => {
                    if reverse {
                        rs.reverse_rows();
                    }
                    print_result(formatter.as_ref(), &rs, !hide_headings)?;
                }
                Ok(None) => {
                    tracing::debug!(query = %name, "statement rejected, no result");
                }
                Err(e) => {
                    eprintln!("Failed to execute query: {}\nError: {}", sql.trim(), e);
                    std::process::exit(1);
                }
            }
        }

        Commands::PrintQuery { name } => {
            let catalog = load_catalog(&config);
            let Some((raw, sql)) = catalog.resolved(&name) else {
                println!("Query not found: {}\nAvailable:", name);
                print_listing(&catalog.listing(), &mut io::stdout())?;
                std::process::exit(1);
            };
            if raw.trim() != sql.trim() {
                println!("Query: {}\nTemplate Form:\n{}\nActual SQL:\n{}", name, raw, sql);
            } else {
                println!("Query: {}\n{}", name, sql);
            }
        }

        Commands::ListQueries => {
            let catalog = load_catalog(&config);
            print_listing(&catalog.listing(), &mut io::stdout())?;
        }

        Commands::ListFormats => {
            print_listing(&format::listing(), &mut io::stdout())?;
        }
    }

    Ok(())
}

/// Parse the command line, falling back to the configured default query
/// when the binary is invoked with no arguments at all.
fn parse_args(config: &Config) -> Cli {
    if std::env::args_os().len() <= 1 {
        if let Some(name) = config.get_string("DEFAULT_QUERY") {
            return Cli {
                database: None,
                verbose: false,
                command: Commands::Query {
                    name: name.to_string(),
                    format: None,
                    limit: None,
                    hide_headings: false,
                    reverse: false,
                },
            };
        }
        if config.get_bool("HIDE_USAGE_FOR_NO_ARGS") {
            std::process::exit(1);
        }
    }
    Cli::parse()
}

/// Initialize logging from the config and the --verbose flag. With
/// CMDHIST_LOG_FILE set, log lines append there; otherwise they go to
/// stderr.
fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        config
            .get_string("LOG_LEVEL")
            .map(str::to_lowercase)
            .unwrap_or_else(|| "info".to_string())
    };
    let filter = EnvFilter::new(level);

    match config.get_string("LOG_FILE").map(PathBuf::from) {
        Some(path) => {
            let writer = move || -> Box<dyn Write> {
                match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
                    Ok(file) => Box::new(file),
                    Err(_) => Box::new(io::sink()),
                }
            };
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
        }
    }
}

/// Open the history store, creating the database directory if needed. An
/// unreachable database is fatal: nothing else can function without it.
fn open_store(flag: &Option<PathBuf>, config: &Config) -> anyhow::Result<HistoryStore> {
    let path = config::database_path(flag.as_deref(), config)?;
    config::ensure_db_dir(&path)?;
    HistoryStore::open(&path)
        .map_err(|e| anyhow::anyhow!("failed to open history database {}: {}", path.display(), e))
}

fn load_catalog(config: &Config) -> QueryCatalog {
    let system = config::system_query_file(config);
    let user = config::user_query_file();
    let mut sources = vec![system.as_path()];
    if let Some(user) = user.as_deref() {
        sources.push(user);
    }
    QueryCatalog::load(&sources)
}

fn print_listing(listing: &ResultSet, out: &mut dyn Write) -> io::Result<()> {
    AlignedFormatter.print(listing, true, out)
}

fn print_result(formatter: &dyn Formatter, rs: &ResultSet, show_headings: bool) -> io::Result<()> {
    let stdout = io::stdout();
    formatter.print(rs, show_headings, &mut stdout.lock())
}
