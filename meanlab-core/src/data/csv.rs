//! CSV directory provider — the offline data path.
//!
//! Reads `{symbol}.csv` from a directory. Expected header:
//! `date,open,high,low,close,volume` with ISO dates, one row per trading day.
//! This is also the format the CLI `download` command writes.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One data row of a `{symbol}.csv` file.
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn parse_file(path: &Path, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>, DataError> {
        let parse_err = |e: &dyn std::fmt::Display| DataError::CsvParse {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        let mut reader = csv::Reader::from_path(path).map_err(|e| parse_err(&e))?;

        let mut bars = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|e| parse_err(&e))?;
            if row.date < start || row.date > end {
                continue;
            }
            bars.push(RawBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl DataProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv_dir"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.dir.join(format!("{symbol}.csv"));
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let bars = Self::parse_file(&path, start, end)?;
        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvImport,
        })
    }
}

/// Write bars to `{symbol}.csv` in the provider's format.
pub fn write_symbol_csv(dir: &Path, symbol: &str, bars: &[RawBar]) -> Result<PathBuf, DataError> {
    let io_err = |e: &dyn std::fmt::Display| DataError::Io(e.to_string());

    std::fs::create_dir_all(dir).map_err(|e| io_err(&e))?;
    let path = dir.join(format!("{symbol}.csv"));
    let mut writer = csv::Writer::from_path(&path).map_err(|e| io_err(&e))?;

    writer
        .write_record(["date", "open", "high", "low", "close", "volume"])
        .map_err(|e| io_err(&e))?;
    for bar in bars {
        writer
            .write_record([
                bar.date.to_string(),
                format!("{:.4}", bar.open),
                format!("{:.4}", bar.high),
                format!("{:.4}", bar.low),
                format!("{:.4}", bar.close),
                bar.volume.to_string(),
            ])
            .map_err(|e| io_err(&e))?;
    }
    writer.flush().map_err(|e| io_err(&e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, close: f64) -> RawBar {
        RawBar {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000,
        }
    }

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 19).unwrap(),
        )
    }

    #[test]
    fn roundtrip_through_csv() {
        let dir = std::env::temp_dir().join(format!("meanlab_csv_test_{}", std::process::id()));
        let bars = vec![raw("2024-01-02", 100.0), raw("2024-01-03", 101.5)];
        write_symbol_csv(&dir, "AAPL", &bars).unwrap();

        let (start, end) = range();
        let provider = CsvDirProvider::new(&dir);
        let result = provider.fetch("AAPL", start, end).unwrap();

        assert_eq!(result.bars.len(), 2);
        assert_eq!(result.source, DataSource::CsvImport);
        assert_eq!(result.bars[1].close, 101.5);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn quoted_fields_parse() {
        // RFC 4180 quoting, as spreadsheet exports emit.
        let dir = std::env::temp_dir().join(format!("meanlab_csv_quoted_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("AAPL.csv"),
            "date,open,high,low,close,volume\n\
             \"2024-01-02\",\"100.0\",\"101.0\",\"99.0\",\"100.5\",\"1000\"\n",
        )
        .unwrap();

        let (start, end) = range();
        let provider = CsvDirProvider::new(&dir);
        let result = provider.fetch("AAPL", start, end).unwrap();

        assert_eq!(result.bars.len(), 1);
        assert_eq!(result.bars[0].close, 100.5);
        assert_eq!(result.bars[0].volume, 1000);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn date_range_filter_applies() {
        let dir = std::env::temp_dir().join(format!("meanlab_csv_range_{}", std::process::id()));
        let bars = vec![raw("2024-01-02", 100.0), raw("2024-03-01", 110.0)];
        write_symbol_csv(&dir, "TSLA", &bars).unwrap();

        let provider = CsvDirProvider::new(&dir);
        let result = provider
            .fetch(
                "TSLA",
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 19).unwrap(),
            )
            .unwrap();

        assert_eq!(result.bars.len(), 1);
        assert_eq!(result.bars[0].close, 110.0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_row_is_csv_parse_error() {
        let dir = std::env::temp_dir().join(format!("meanlab_csv_bad_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("AAPL.csv"),
            "date,open,high,low,close,volume\n2024-01-02,100.0,101.0,99.0,100.5,notanumber\n",
        )
        .unwrap();

        let (start, end) = range();
        let provider = CsvDirProvider::new(&dir);
        let err = provider.fetch("AAPL", start, end).unwrap_err();
        assert!(matches!(err, DataError::CsvParse { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let (start, end) = range();
        let provider = CsvDirProvider::new("/nonexistent/dir");
        let err = provider.fetch("AAPL", start, end).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }
}
