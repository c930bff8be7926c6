//! bm CLI
//!
//! Bookmark shell commands and find them again by approximate match.
//!
//! # Commands
//!
//! - `s`, `sn`, `un` - Save a command, optionally under a name
//! - `c`, `cn`, `xn` - Save a command and run it
//! - `q`, `qn` - Search saved commands by content or name
//! - `r`, `rn` - Run the best match
//! - `d`, `dn` - Delete the best match
//! - `a`, `an` - List every match in order

mod commands;
mod error;
mod exec;
mod output;

use bm_core::{Field, RecordStore, StoreConfig};
use clap::{Args, Parser, Subcommand};
use commands::list::Listing;
use commands::save::OnConflict;
use commands::Outcome;
use error::CliResult;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Save shell commands and look them up again.
#[derive(Parser)]
#[command(name = "bm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the bookmark data (defaults to the home directory)
    #[arg(global = true, long, env = "BM_DIR")]
    dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Words of a command to save or of a query.
#[derive(Args, Debug)]
struct Words {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    words: Vec<String>,
}

/// A name followed by the words of a command.
#[derive(Args, Debug)]
struct Named {
    /// Record name
    name: String,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    words: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save an un-named command
    #[command(name = "s")]
    Save(Words),

    /// Save a named command
    #[command(name = "sn")]
    SaveNamed(Named),

    /// Like sn, but may replace an existing command
    #[command(name = "un")]
    Update(Named),

    /// Save and run an un-named command
    #[command(name = "c")]
    SaveRun(Words),

    /// Save and run a named command
    #[command(name = "cn")]
    SaveRunNamed(Named),

    /// Like cn, but may replace an existing command
    #[command(name = "xn")]
    UpdateRun(Named),

    /// Search saved commands by content
    #[command(name = "q")]
    Query(Words),

    /// Search saved commands by name
    #[command(name = "qn")]
    QueryNamed(Words),

    /// Look up and run a command by content
    #[command(name = "r")]
    Run(Words),

    /// Look up and run a command by name
    #[command(name = "rn")]
    RunNamed(Words),

    /// Delete a command by content
    #[command(name = "d")]
    Delete(Words),

    /// Delete a command by name
    #[command(name = "dn")]
    DeleteNamed(Words),

    /// List all saved commands matching by content, in order
    #[command(name = "a")]
    All(Words),

    /// List all saved commands matching by name, in order
    #[command(name = "an")]
    AllNamed(Words),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<ExitCode> {
    let mut config = StoreConfig::default();
    if let Some(dir) = cli.dir {
        config = config.dir(dir);
    }

    let mut store = RecordStore::open(config)?;
    let outcome = dispatch(&mut store, cli.command);
    // The lock is released before any stored command runs.
    let closed = store.close();
    let outcome = outcome?;
    closed?;

    match outcome {
        Outcome::Done => Ok(ExitCode::SUCCESS),
        Outcome::Execute(record) => exec::execute(&record),
    }
}

fn dispatch(store: &mut RecordStore, command: Commands) -> CliResult<Outcome> {
    let stdout = std::io::stdout();
    let tty = stdout.is_terminal();
    let mut out = stdout.lock();

    let outcome = match command {
        Commands::Save(args) => {
            commands::save::run(store, None, &args.words, OnConflict::Fail)?;
            Outcome::Done
        }
        Commands::SaveNamed(args) => {
            commands::save::run(store, Some(&args.name), &args.words, OnConflict::Fail)?;
            Outcome::Done
        }
        Commands::Update(args) => {
            commands::save::run(store, Some(&args.name), &args.words, OnConflict::Replace)?;
            Outcome::Done
        }
        Commands::SaveRun(args) => Outcome::Execute(commands::save::run(
            store,
            None,
            &args.words,
            OnConflict::Fail,
        )?),
        Commands::SaveRunNamed(args) => Outcome::Execute(commands::save::run(
            store,
            Some(&args.name),
            &args.words,
            OnConflict::Fail,
        )?),
        Commands::UpdateRun(args) => Outcome::Execute(commands::save::run(
            store,
            Some(&args.name),
            &args.words,
            OnConflict::Replace,
        )?),
        Commands::Query(args) => {
            commands::list::run(store, Field::Command, &args.words, Listing::Top, &mut out, tty)?;
            Outcome::Done
        }
        Commands::QueryNamed(args) => {
            commands::list::run(store, Field::Id, &args.words, Listing::Top, &mut out, tty)?;
            Outcome::Done
        }
        Commands::All(args) => {
            commands::list::run(store, Field::Command, &args.words, Listing::All, &mut out, tty)?;
            Outcome::Done
        }
        Commands::AllNamed(args) => {
            commands::list::run(store, Field::Id, &args.words, Listing::All, &mut out, tty)?;
            Outcome::Done
        }
        Commands::Run(args) => commands::run::run(store, Field::Command, &args.words)?,
        Commands::RunNamed(args) => commands::run::run(store, Field::Id, &args.words)?,
        Commands::Delete(args) => {
            commands::delete::run(store, Field::Command, &args.words)?;
            Outcome::Done
        }
        Commands::DeleteNamed(args) => {
            commands::delete::run(store, Field::Id, &args.words)?;
            Outcome::Done
        }
    };

    Ok(outcome)
}
