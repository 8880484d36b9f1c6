//! CSV file price source: one `<TICKER>.csv` per ticker in a base directory.

use crate::domain::error::StocksimError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

fn is_csv_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        && path.is_file()
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// Positions of the required columns within a header row.
struct ColumnIndex([usize; 6]);

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, StocksimError> {
        let mut positions = [0usize; 6];
        for (slot, name) in positions.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    StocksimError::invalid_input(format!("missing required column '{name}'"))
                })?;
        }
        Ok(Self(positions))
    }

    /// Trimmed cells in `COLUMNS` order, or `None` if any is empty.
    fn cells<'r>(&self, record: &'r csv::StringRecord) -> Option<[&'r str; 6]> {
        let mut out = [""; 6];
        for (cell, &pos) in out.iter_mut().zip(&self.0) {
            let value = record.get(pos)?.trim();
            if value.is_empty() {
                return None;
            }
            *cell = value;
        }
        Some(out)
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `<TICKER>.csv`, falling back to a case-insensitive match on the stem.
    fn csv_path(&self, ticker: &str) -> Option<PathBuf> {
        let exact = self.base_path.join(format!("{}.csv", ticker));
        if exact.is_file() {
            return Some(exact);
        }
        fs::read_dir(&self.base_path)
            .ok()?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| {
                is_csv_file(path)
                    && path
                        .file_stem()
                        .is_some_and(|stem| stem.to_string_lossy().eq_ignore_ascii_case(ticker))
            })
    }

    fn parse_number(value: &str, column: &str, line: u64) -> Result<f64, StocksimError> {
        value.parse().map_err(|e| StocksimError::Data {
            reason: format!("invalid {column} value '{value}' on line {line}: {e}"),
        })
    }
}

impl DataPort for CsvAdapter {
    fn fetch_prices(&self, ticker: &str) -> Result<Vec<PriceBar>, StocksimError> {
        let path = self.csv_path(ticker).ok_or_else(|| StocksimError::NoData {
            ticker: ticker.to_string(),
        })?;
        let content = fs::read_to_string(&path).map_err(|e| StocksimError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| StocksimError::Data {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let index = ColumnIndex::from_headers(headers)?;

        let mut bars = Vec::new();
        let mut dropped = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|e| StocksimError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let Some([date, open, high, low, close, volume]) = index.cells(&record) else {
                dropped += 1;
                continue;
            };

            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
                StocksimError::Data {
                    reason: format!("invalid date '{date}' on line {line}: {e}"),
                }
            })?;

            let bar = PriceBar {
                date,
                open: Self::parse_number(open, "open", line)?,
                high: Self::parse_number(high, "high", line)?,
                low: Self::parse_number(low, "low", line)?,
                close: Self::parse_number(close, "close", line)?,
                volume: Self::parse_number(volume, "volume", line)?,
            };
            let finite = [bar.open, bar.high, bar.low, bar.close, bar.volume]
                .iter()
                .all(|v| v.is_finite());
            if !finite {
                dropped += 1;
                continue;
            }
            bars.push(bar);
        }

        if dropped > 0 {
            debug!(ticker, dropped, "dropped rows with missing values");
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, StocksimError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StocksimError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| StocksimError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let path = entry.path();
            if !is_csv_file(&path) {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                tickers.push(stem.to_string_lossy().to_uppercase());
            }
        }

        tickers.sort();
        tickers.dedup();
        Ok(tickers)
    }
}
