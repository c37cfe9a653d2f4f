//! MeanLab CLI — run backtests and download market data.
//!
//! Commands:
//! - `run` — execute the Bollinger reversion backtest (defaults reproduce
//!   the reference study; a TOML config overrides them)
//! - `download` — fetch daily bars from Yahoo Finance into a CSV directory
//!   for later offline runs

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use meanlab_core::data::{
    write_symbol_csv, CircuitBreaker, CsvDirProvider, DataProvider, StdoutProgress, SyntheticProvider,
    YahooProvider,
};
use meanlab_runner::artifacts::ArtifactManager;
use meanlab_runner::report::print_summary;
use meanlab_runner::{run, RunConfig};

#[derive(Parser)]
#[command(
    name = "meanlab",
    about = "MeanLab CLI — Bollinger-band mean-reversion backtesting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest. With no flags, runs the built-in reference study.
    Run {
        /// Path to a TOML config file overriding the defaults.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Never touch the network; requires --csv-dir or --synthetic.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Load data from a CSV directory instead of Yahoo Finance.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Use seeded synthetic data (no network, reproducible).
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Seed for synthetic data.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Download daily bars from Yahoo Finance into a CSV directory.
    Download {
        /// Symbols to download (e.g., AAPL META GOOG).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD).
        #[arg(long, default_value = "2024-01-01")]
        start: String,

        /// End date (YYYY-MM-DD).
        #[arg(long, default_value = "2024-06-19")]
        end: String,

        /// Directory to write {symbol}.csv files into.
        #[arg(long, default_value = "data")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            offline,
            csv_dir,
            synthetic,
            seed,
            output_dir,
        } => run_cmd(config, offline, csv_dir, synthetic, seed, output_dir),
        Commands::Download {
            symbols,
            start,
            end,
            out,
        } => download_cmd(symbols, &start, &end, out),
    }
}

fn run_cmd(
    config_path: Option<PathBuf>,
    offline: bool,
    csv_dir: Option<PathBuf>,
    synthetic: bool,
    seed: u64,
    output_dir: PathBuf,
) -> Result<()> {
    if synthetic && csv_dir.is_some() {
        bail!("--synthetic and --csv-dir are mutually exclusive");
    }
    if offline && !synthetic && csv_dir.is_none() {
        bail!("--offline needs a local data source: pass --csv-dir or --synthetic");
    }

    let config = match config_path {
        Some(path) => RunConfig::from_toml_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RunConfig::default(),
    };

    let yahoo;
    let csv;
    let synth;
    let provider: &dyn DataProvider = if synthetic {
        synth = SyntheticProvider::new(seed);
        &synth
    } else if let Some(dir) = csv_dir {
        csv = CsvDirProvider::new(dir);
        &csv
    } else {
        let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
        yahoo = YahooProvider::new(circuit_breaker).context("building Yahoo Finance client")?;
        &yahoo
    };

    let result = run(&config, provider, &StdoutProgress).context("backtest failed")?;

    print_summary(&result);

    let manager = ArtifactManager::new(&output_dir)?;
    let paths = manager.save_run(&result)?;
    println!("Artifacts written to {}", paths.manifest.display());

    Ok(())
}

fn download_cmd(symbols: Vec<String>, start: &str, end: &str, out: PathBuf) -> Result<()> {
    let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .with_context(|| format!("invalid start date: {start}"))?;
    let end_date = NaiveDate::parse_from_str(end, "%Y-%m-%d")
        .with_context(|| format!("invalid end date: {end}"))?;
    if end_date < start_date {
        bail!("end date {end} is before start date {start}");
    }

    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = YahooProvider::new(circuit_breaker).context("building Yahoo Finance client")?;

    let mut failed = 0usize;
    let total = symbols.len();
    for (i, symbol) in symbols.iter().enumerate() {
        println!("[{}/{}] Fetching {symbol}...", i + 1, total);
        match provider.fetch(symbol, start_date, end_date) {
            Ok(result) => {
                let path = write_symbol_csv(&out, symbol, &result.bars)
                    .with_context(|| format!("writing CSV for {symbol}"))?;
                println!("  OK: {} bars -> {}", result.bars.len(), path.display());
            }
            Err(e) => {
                eprintln!("  FAIL: {symbol}: {e}");
                failed += 1;
            }
        }
    }

    println!("\nDownload complete: {}/{} succeeded", total - failed, total);
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
