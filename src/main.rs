//! Agrichain CLI

use std::{io, path::PathBuf, process::ExitCode};

use agrichain::{
    fixtures::{FixtureError, scenarios::Scenario},
    logging::{self, LoggingConfig, LoggingError},
    report::{ReportError, TransactionReport, TransitionTable},
    status::Locale,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "agrichain", about = "Agricultural transaction lifecycle", long_about = None)]
struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a scenario file and print the resulting transaction
    Replay(ReplayArgs),

    /// Print every action with its source and target statuses
    Transitions(TransitionsArgs),
}

#[derive(Debug, Args)]
struct ReplayArgs {
    /// Scenario YAML file
    path: PathBuf,

    /// Label language
    #[arg(long, value_enum, default_value_t = LocaleArg::Id)]
    locale: LocaleArg,
}

#[derive(Debug, Args)]
struct TransitionsArgs {
    /// Label language
    #[arg(long, value_enum, default_value_t = LocaleArg::Id)]
    locale: LocaleArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LocaleArg {
    /// Bahasa Indonesia
    Id,

    /// English
    En,
}

impl From<LocaleArg> for Locale {
    fn from(locale: LocaleArg) -> Self {
        match locale {
            LocaleArg::Id => Locale::Indonesian,
            LocaleArg::En => Locale::English,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error("failed to write output: {0}")]
    Report(#[from] ReportError),
}

#[expect(clippy::print_stderr, reason = "last-resort error output for the CLI")]
fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "command failed");
            eprintln!("{error}");

            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    logging::init(&cli.logging)?;

    let out = io::stdout().lock();

    match cli.command {
        Commands::Replay(args) => {
            let scenario = Scenario::from_file(&args.path)?;
            let transaction = scenario.replay()?;

            info!(
                path = %args.path.display(),
                transaction = %transaction.id(),
                status = %transaction.status(),
                "scenario replayed"
            );

            TransactionReport::new(&transaction, args.locale.into()).write_to(out)?;
        }
        Commands::Transitions(args) => {
            TransitionTable::new(args.locale.into()).write_to(out)?;
        }
    }

    Ok(())
}
