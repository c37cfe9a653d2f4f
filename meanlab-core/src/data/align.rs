//! Multi-symbol time alignment.
//!
//! Given raw bars for multiple symbols, align them to a common timeline so the
//! engine can iterate all symbols in chronological lockstep. Missing dates get
//! strict NaN void bars (no forward-fill of tradable price data).

use super::provider::RawBar;
use crate::domain::Bar;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Aligned bar data for multiple symbols on a common timeline.
#[derive(Debug, Clone)]
pub struct AlignedData {
    /// The common date axis (sorted ascending).
    pub dates: Vec<NaiveDate>,
    /// Bars per symbol, aligned to the common timeline.
    /// Each inner Vec has the same length as `dates`.
    pub bars: HashMap<String, Vec<Bar>>,
    /// Symbols included, sorted for deterministic iteration.
    pub symbols: Vec<String>,
}

impl AlignedData {
    pub fn bar_count(&self) -> usize {
        self.dates.len()
    }
}

/// Align multiple symbols to a common timeline.
///
/// For each date in the union of all symbols' dates, each symbol either has a
/// real bar or gets a void bar (all OHLC set to NaN).
pub fn align_symbols(symbol_bars: HashMap<String, Vec<RawBar>>) -> AlignedData {
    let mut all_dates = BTreeSet::new();
    for bars in symbol_bars.values() {
        for bar in bars {
            all_dates.insert(bar.date);
        }
    }
    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

    let mut symbols: Vec<String> = symbol_bars.keys().cloned().collect();
    symbols.sort();

    let mut aligned: HashMap<String, Vec<Bar>> = HashMap::new();
    for (symbol, bars) in &symbol_bars {
        let mut date_map: HashMap<NaiveDate, &RawBar> = HashMap::new();
        for bar in bars {
            date_map.insert(bar.date, bar);
        }

        let aligned_bars: Vec<Bar> = dates
            .iter()
            .map(|date| match date_map.get(date) {
                Some(raw) => Bar {
                    symbol: symbol.clone(),
                    date: *date,
                    open: raw.open,
                    high: raw.high,
                    low: raw.low,
                    close: raw.close,
                    volume: raw.volume,
                },
                None => void_bar(symbol, *date),
            })
            .collect();

        aligned.insert(symbol.clone(), aligned_bars);
    }

    AlignedData {
        dates,
        bars: aligned,
        symbols,
    }
}

/// Create a void bar (all OHLC = NaN) for a missing date.
fn void_bar(symbol: &str, date: NaiveDate) -> Bar {
    Bar {
        symbol: symbol.to_string(),
        date,
        open: f64::NAN,
        high: f64::NAN,
        low: f64::NAN,
        close: f64::NAN,
        volume: 0,
    }
}
