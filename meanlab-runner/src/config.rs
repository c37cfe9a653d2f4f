//! Serializable run configuration.
//!
//! The defaults reproduce the reference study: seven large-cap symbols,
//! first half of 2024, $50,000 starting cash, 0.1% commission, and a
//! 20-period / 2-sigma Bollinger reversion rule with a 0.7 %B exit.

use chrono::NaiveDate;
use meanlab_core::engine::EngineConfig;
use meanlab_core::strategy::BollingerReversion;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a run (content-addressable hash of the config).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Full configuration for a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// Symbols to trade.
    pub universe: Vec<String>,

    /// Backtest start date (inclusive).
    pub start_date: NaiveDate,

    /// Backtest end date (inclusive).
    pub end_date: NaiveDate,

    pub initial_capital: f64,

    /// Commission as a fraction of notional (0.001 = 10 bps).
    pub commission_rate: f64,

    pub strategy: StrategyParams,
}

/// Bollinger reversion parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrategyParams {
    pub period: usize,
    pub devfactor: f64,
    pub exit_threshold: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            period: 20,
            devfactor: 2.0,
            exit_threshold: 0.7,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            universe: ["AAPL", "META", "GOOG", "AMZN", "NFLX", "TSLA", "JPM"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 19).unwrap_or_default(),
            initial_capital: 50_000.0,
            commission_rate: 0.001,
            strategy: StrategyParams::default(),
        }
    }
}

impl RunConfig {
    /// Load from a TOML file; missing fields fall back to the defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: RunConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.universe.is_empty() {
            return Err(ConfigError::Invalid("universe is empty".into()));
        }
        if self.end_date < self.start_date {
            return Err(ConfigError::Invalid(format!(
                "end_date {} is before start_date {}",
                self.end_date, self.start_date
            )));
        }
        if self.initial_capital <= 0.0 {
            return Err(ConfigError::Invalid("initial_capital must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.commission_rate) {
            return Err(ConfigError::Invalid(
                "commission_rate must be in [0, 1)".into(),
            ));
        }
        if self.strategy.period < 2 {
            return Err(ConfigError::Invalid("strategy.period must be >= 2".into()));
        }
        Ok(())
    }

    /// Deterministic hash ID: identical configs hash to the same run_id.
    pub fn run_id(&self) -> RunId {
        match serde_json::to_string(self) {
            Ok(json) => blake3::hash(json.as_bytes()).to_hex().to_string(),
            Err(_) => "unhashable".to_string(),
        }
    }

    pub fn strategy_params(&self) -> BollingerReversion {
        BollingerReversion {
            period: self.strategy.period,
            devfactor: self.strategy.devfactor,
            exit_threshold: self.strategy.exit_threshold,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            initial_capital: self.initial_capital,
            commission_rate: self.commission_rate,
        }
    }
}
