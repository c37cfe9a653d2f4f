//! MeanLab Core — engine, domain types, indicators, strategy, data providers.
//!
//! This crate contains the heart of the mean-reversion backtester:
//! - Domain types (bars, orders, positions, portfolio, trades)
//! - Bollinger Band indicators with NaN warmup
//! - The pure decision rule (entry below the lower band, exit on %B)
//! - Bar-by-bar event loop with open-fill and close-decide phases
//! - Data providers (Yahoo Finance, CSV directory, synthetic) behind one trait

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;
