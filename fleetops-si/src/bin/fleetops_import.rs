//! fleetops-import - one-shot CSV import from the terminal
//!
//! ```text
//! fleetops-import shifts turnos.csv --detailed-errors
//! ```
//!
//! Prints the import report and exits with status 1 when any row failed.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fleetops_common::config::TomlConfig;
use fleetops_common::Locale;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleetops_si::models::ImportProgress;
use fleetops_si::services::{load_context, RestStore};
use fleetops_si::{CsvBatchImporter, ImportKind, ImportOptions};

/// Command-line arguments for fleetops-import
#[derive(Parser, Debug)]
#[command(name = "fleetops-import")]
#[command(about = "Import a shifts or assignments CSV file into the fleet database")]
#[command(version)]
struct Args {
    /// Import kind: shifts or assignments
    kind: ImportKind,

    /// CSV file to import
    file: PathBuf,

    /// Config file (default: FLEETOPS_CONFIG, then the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remote create calls in flight at once
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// Merge rows that already exist instead of creating duplicates
    #[arg(long)]
    upsert: bool,

    /// Report the specific validation reason for each rejected row
    #[arg(long)]
    detailed_errors: bool,

    /// Report language (es, en)
    #[arg(long, env = "FLEETOPS_LOCALE")]
    locale: Option<Locale>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetops_si=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Args::parse()).await {
        Ok(failed) if failed > 0 => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns the number of failed rows
async fn run(args: Args) -> Result<usize> {
    let mut config =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(max_in_flight) = args.max_in_flight {
        config.import.max_in_flight = max_in_flight;
    }
    if args.upsert {
        config.import.upsert = true;
    }
    if args.detailed_errors {
        config.import.detailed_errors = true;
    }
    if let Some(locale) = args.locale {
        config.import.locale = locale;
    }
    config.validate()?;

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let access_token = config.require_access_token()?;
    let store = Arc::new(
        RestStore::from_config(&config.store, access_token)
            .context("Failed to create remote store client")?,
    );

    let context = load_context(store.as_ref())
        .await
        .context("Failed to load branches and shifts")?;

    let options = ImportOptions::from(&config.import);
    let locale = options.locale;
    let importer = CsvBatchImporter::new(store, options);

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, cancelling remaining rows");
            ctrl_c_cancel.cancel();
        }
    });

    info!(kind = %args.kind, file = %args.file.display(), "Importing");

    let progress = |p: ImportProgress| {
        eprint!("\r{}/{} ({:.0}%)", p.processed, p.total, p.percentage());
        let _ = std::io::stderr().flush();
    };
    let outcome = importer
        .import_with(args.kind, &bytes, &context, &progress, &cancel)
        .await?;
    if outcome.total > 0 {
        eprintln!();
    }

    for line in outcome.report_lines(locale) {
        println!("{}", line);
    }

    Ok(outcome.failed)
}
