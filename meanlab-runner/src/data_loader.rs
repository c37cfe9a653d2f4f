//! Loads and aligns market data for a run's universe.

use meanlab_core::data::{
    align_symbols, AlignedData, DataError, DataProvider, DownloadProgress, RawBar,
};
use std::collections::HashMap;
use thiserror::Error;

use crate::config::RunConfig;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data for symbol {symbol}: {source}")]
    NoData {
        symbol: String,
        #[source]
        source: DataError,
    },

    #[error("all {0} symbols failed to load")]
    Empty(usize),
}

/// Fetch every symbol in the universe and align the series on a shared
/// date axis.
///
/// A symbol that fails to load aborts the run: a partial universe would
/// silently change the study, so the caller gets the error instead.
pub fn load_universe(
    config: &RunConfig,
    provider: &dyn DataProvider,
    progress: &dyn DownloadProgress,
) -> Result<AlignedData, LoadError> {
    let total = config.universe.len();
    let mut series: HashMap<String, Vec<RawBar>> = HashMap::new();

    for (index, symbol) in config.universe.iter().enumerate() {
        progress.on_start(symbol, index, total);
        match provider.fetch(symbol, config.start_date, config.end_date) {
            Ok(result) => {
                progress.on_complete(symbol, index, total, Ok(()));
                series.insert(symbol.clone(), result.bars);
            }
            Err(source) => {
                progress.on_complete(symbol, index, total, Err(&source));
                progress.on_batch_complete(index, 1, total);
                return Err(LoadError::NoData {
                    symbol: symbol.clone(),
                    source,
                });
            }
        }
    }

    if series.is_empty() {
        return Err(LoadError::Empty(total));
    }

    progress.on_batch_complete(total, 0, total);
    Ok(align_symbols(series))
}
