use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::blocking::Client;
use scorescraper::{
    config::Settings,
    fetch::{self, default_resolvers},
    manifest::{load_manifest, read_sources, save_manifest},
    process::{run_conversion, Outcome},
    store::RawStore,
};
use std::{path::PathBuf, time::Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "scorescraper",
    about = "Downloads published exam-score sheets and converts them to per-region CSV",
    version
)]
struct Cli {
    /// Path to a YAML settings file (defaults to scorescraper.yaml if present).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve sources, store raw HTML and write the manifest.
    Download,
    /// Convert stored raw HTML into CSV files.
    Convert,
    /// Download, then convert.
    Run,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // ─── 2) settings ─────────────────────────────────────────────────
    let cli = Cli::parse();
    let settings = Settings::load_or_default(cli.config.as_deref())?;
    let table = settings.table_config()?;
    let store = RawStore::new(&settings.raw_dir)?;

    let start = Instant::now();
    if matches!(cli.command, Commands::Download | Commands::Run) {
        // ─── 3) resolve + download ───────────────────────────────────
        let sources = read_sources(&settings.sources)?;
        info!("{} sources listed in {}", sources.len(), settings.sources.display());

        let client = Client::builder()
            .build()
            .context("building HTTP client")?;
        let resolvers = default_resolvers(&settings, &table);
        let manifest = fetch::run_download(&client, &resolvers, &sources, &store)?;

        save_manifest(&settings.manifest, &manifest)?;
        info!(
            "manifest with {} sources → {}",
            manifest.len(),
            settings.manifest.display()
        );
    }

    if matches!(cli.command, Commands::Convert | Commands::Run) {
        // ─── 4) convert ──────────────────────────────────────────────
        let manifest = load_manifest(&settings.manifest)?;
        let reports = run_conversion(&table, &manifest, &store, &settings.csv_dir)?;

        for report in &reports {
            match &report.outcome {
                Outcome::Complete => info!(id = %report.id, records = report.records, "complete"),
                Outcome::Truncated { .. } => {
                    error!(id = %report.id, records = report.records, "{}", report.outcome)
                }
                Outcome::Skipped { .. } => warn!(id = %report.id, "{}", report.outcome),
            }
        }
    }

    info!(elapsed = ?start.elapsed(), "all done");
    Ok(())
}
