//! Data layer: providers, alignment, and the circuit breaker.

pub mod align;
pub mod circuit_breaker;
pub mod csv;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use align::{align_symbols, AlignedData};
pub use circuit_breaker::CircuitBreaker;
pub use csv::{write_symbol_csv, CsvDirProvider};
pub use provider::{
    DataError, DataProvider, DataSource, DownloadProgress, FetchResult, RawBar, SilentProgress,
    StdoutProgress,
};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
