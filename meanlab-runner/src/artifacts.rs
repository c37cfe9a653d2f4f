//! Persists run outputs under `<output_dir>/<run_id>/`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::result::BacktestResult;

/// Paths of everything written for a run.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub manifest: PathBuf,
    pub equity_csv: PathBuf,
    pub trades_csv: PathBuf,
    pub trades_json: PathBuf,
}

/// Manages writing all artifacts for a run.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .context("failed to create artifact output directory")?;
        Ok(Self { output_dir })
    }

    /// Write manifest, equity curve, and trade log for a finished run.
    pub fn save_run(&self, result: &BacktestResult) -> Result<ArtifactPaths> {
        let run_dir = self.output_dir.join(&result.run_id);
        std::fs::create_dir_all(&run_dir).context("failed to create run directory")?;

        let manifest = run_dir.join("manifest.json");
        let json = serde_json::to_string_pretty(result)
            .context("failed to serialize run manifest")?;
        std::fs::write(&manifest, json).context("failed to write manifest.json")?;

        let equity_csv = run_dir.join("equity.csv");
        write_equity_csv(&equity_csv, result)?;

        let trades_csv = run_dir.join("trades.csv");
        write_trades_csv(&trades_csv, result)?;

        let trades_json = run_dir.join("trades.json");
        let json = serde_json::to_string_pretty(&result.trades)
            .context("failed to serialize trade log")?;
        std::fs::write(&trades_json, json).context("failed to write trades.json")?;

        Ok(ArtifactPaths {
            manifest,
            equity_csv,
            trades_csv,
            trades_json,
        })
    }
}

fn write_equity_csv(path: &Path, result: &BacktestResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(["date", "equity"])?;
    for point in &result.equity_curve {
        writer.write_record([point.date.to_string(), format!("{:.2}", point.equity)])?;
    }
    writer.flush().context("failed to flush equity.csv")?;
    Ok(())
}

fn write_trades_csv(path: &Path, result: &BacktestResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record([
        "symbol",
        "entry_date",
        "entry_price",
        "exit_date",
        "exit_price",
        "quantity",
        "gross_pnl",
        "commission",
        "net_pnl",
        "bars_held",
    ])?;
    for t in &result.trades {
        writer.write_record([
            t.symbol.clone(),
            t.entry_date.to_string(),
            format!("{:.4}", t.entry_price),
            t.exit_date.to_string(),
            format!("{:.4}", t.exit_price),
            t.quantity.to_string(),
            format!("{:.2}", t.gross_pnl),
            format!("{:.2}", t.commission),
            format!("{:.2}", t.net_pnl),
            t.bars_held.to_string(),
        ])?;
    }
    writer.flush().context("failed to flush trades.csv")?;
    Ok(())
}
