//! Synthetic data provider — seeded geometric random walk.
//!
//! Used for offline and demo runs when neither network nor CSV data is
//! available. Deterministic for a given (seed, symbol) pair so runs are
//! reproducible.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SyntheticProvider {
    seed: u64,
    /// Annualized volatility of the generated walk.
    volatility: f64,
    start_price: f64,
}

impl SyntheticProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            volatility: 0.25,
            start_price: 100.0,
        }
    }

    /// Per-symbol RNG: same seed + same symbol → same series.
    fn rng_for(&self, symbol: &str) -> StdRng {
        let mut h: u64 = self.seed;
        for b in symbol.bytes() {
            h = h.wrapping_mul(0x100000001b3).wrapping_add(b as u64);
        }
        StdRng::seed_from_u64(h)
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        if end < start {
            return Err(DataError::Other(format!(
                "invalid date range: {start} to {end}"
            )));
        }

        let mut rng = self.rng_for(symbol);
        let daily_vol = self.volatility / (252.0_f64).sqrt();
        let mut price = self.start_price * rng.gen_range(0.5..2.0);

        let mut bars = Vec::new();
        let mut date = start;
        while date <= end {
            // Weekdays only, like an equity calendar
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                let ret: f64 = rng.gen_range(-1.0..1.0) * daily_vol * 3.0_f64.sqrt();
                let open = price;
                let close = price * (1.0 + ret);
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..daily_vol));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..daily_vol));
                bars.push(RawBar {
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume: rng.gen_range(100_000..10_000_000),
                });
                price = close;
            }
            date = date.succ_opt().ok_or_else(|| {
                DataError::Other("date overflow while generating synthetic bars".into())
            })?;
        }

        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }
}
