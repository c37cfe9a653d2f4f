//! MeanLab runner: configuration, data loading, orchestration, and reporting.
//!
//! `meanlab-core` knows nothing about files, TOML, or stdout. This crate wires
//! a [`config::RunConfig`] to a data provider, runs the engine, computes
//! performance metrics, and renders the console report plus on-disk artifacts.

pub mod artifacts;
pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod report;
pub mod result;
pub mod runner;

pub use config::{ConfigError, RunConfig};
pub use metrics::PerformanceMetrics;
pub use result::{BacktestResult, EquityPoint};
pub use runner::{run, RunError};
