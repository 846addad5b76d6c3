use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use msgstore_migrate::store::{DestinationStore, SledStore};
use msgstore_migrate::{JsonLegacyDecoder, Migrator};

#[derive(Parser, Debug)]
#[command(
    name = "msgstore-migrate",
    version,
    about = "Migrate a message store from the legacy format to the indexed format"
)]
struct Args {
    /// Path of the legacy store to read from
    #[arg(long, default_value = "data/db-v2", env = "MSGSTORE_FROM")]
    from: PathBuf,

    /// Path of the store to write migrated records into
    #[arg(long, default_value = "data/db-v3", env = "MSGSTORE_TO")]
    to: PathBuf,

    /// `help` prints this message
    #[arg(hide = true)]
    command: Option<String>,
}

fn run(args: &Args) -> anyhow::Result<()> {
    let source = SledStore::open(&args.from)
        .with_context(|| format!("open source store {}", args.from.display()))?;
    let destination = SledStore::open(&args.to)
        .with_context(|| format!("open destination store {}", args.to.display()))?;

    let report = Migrator::new(JsonLegacyDecoder)
        .run(&source, &destination)
        .context("migration aborted")?;
    for failure in report.failures.iter() {
        println!("{}", failure);
    }

    destination.close().context("close destination store")?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "msgstore_migrate=info".into()),
        )
        .init();

    let args = Args::parse();
    match args.command.as_deref() {
        None => (),
        Some("help") => {
            let _ = Args::command().print_help();
            return ExitCode::SUCCESS;
        }
        Some(other) => {
            eprintln!("unexpected argument '{}'", other);
            let _ = Args::command().print_help();
            return ExitCode::FAILURE;
        }
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
