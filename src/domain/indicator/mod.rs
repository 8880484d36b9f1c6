//! Technical indicator columns aligned to a price series.
//!
//! - `IndicatorKind`: the named columns the simulator and recommender read
//! - `IndicatorSet`: per-bar optional values, `None` through each lookback window
//! - `compute_indicators`: fills every column from closing prices

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod volatility;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use crate::domain::error::{IndicatorUnavailable, StocksimError};
use crate::domain::ohlcv::PriceSeries;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use volatility::calculate_volatility;

pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STDDEV: f64 = 2.0;
pub const VOLATILITY_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IndicatorKind {
    Ma20,
    Ma50,
    Ma200,
    Rsi,
    Macd,
    MacdSignal,
    MacdHist,
    BbUpper,
    BbMid,
    BbLower,
    Volatility,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 11] = [
        IndicatorKind::Ma20,
        IndicatorKind::Ma50,
        IndicatorKind::Ma200,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::MacdSignal,
        IndicatorKind::MacdHist,
        IndicatorKind::BbUpper,
        IndicatorKind::BbMid,
        IndicatorKind::BbLower,
        IndicatorKind::Volatility,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::Ma20 => "MA20",
            IndicatorKind::Ma50 => "MA50",
            IndicatorKind::Ma200 => "MA200",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::MacdSignal => "MACD_Signal",
            IndicatorKind::MacdHist => "MACD_Hist",
            IndicatorKind::BbUpper => "BB_Upper",
            IndicatorKind::BbMid => "BB_Mid",
            IndicatorKind::BbLower => "BB_Lower",
            IndicatorKind::Volatility => "Volatility",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Indicator columns sharing the date index of one price series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    len: usize,
    columns: HashMap<IndicatorKind, Vec<Option<f64>>>,
}

impl IndicatorSet {
    /// Empty set for a series of `len` bars.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            columns: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(
        &mut self,
        kind: IndicatorKind,
        values: Vec<Option<f64>>,
    ) -> Result<(), StocksimError> {
        if values.len() != self.len {
            return Err(StocksimError::invalid_input(format!(
                "{kind} has {} values but the series has {} bars",
                values.len(),
                self.len
            )));
        }
        self.columns.insert(kind, values);
        Ok(())
    }

    /// Builder form of [`IndicatorSet::insert`].
    pub fn with(mut self, kind: IndicatorKind, values: Vec<Option<f64>>) -> Result<Self, StocksimError> {
        self.insert(kind, values)?;
        Ok(self)
    }

    pub fn get(&self, kind: IndicatorKind) -> Option<&[Option<f64>]> {
        self.columns.get(&kind).map(Vec::as_slice)
    }

    pub fn contains(&self, kind: IndicatorKind) -> bool {
        self.columns.contains_key(&kind)
    }

    /// Value at bar `index`; `None` when the column is missing, the bar is
    /// out of range, or the value is inside the lookback window.
    pub fn value_at(&self, kind: IndicatorKind, index: usize) -> Option<f64> {
        self.columns
            .get(&kind)
            .and_then(|col| col.get(index).copied().flatten())
    }

    /// Like [`IndicatorSet::value_at`] but reports why the value is absent.
    pub fn require(&self, kind: IndicatorKind, index: usize) -> Result<f64, IndicatorUnavailable> {
        let column = self
            .columns
            .get(&kind)
            .ok_or_else(|| IndicatorUnavailable {
                indicator: kind.to_string(),
                reason: "column not computed".into(),
            })?;
        column
            .get(index)
            .copied()
            .flatten()
            .ok_or_else(|| IndicatorUnavailable {
                indicator: kind.to_string(),
                reason: format!("no value at bar {index}"),
            })
    }

    /// Columns restricted to bars `range`, for a series cut the same way.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let start = range.start.min(self.len);
        let end = range.end.clamp(start, self.len);
        let columns = self
            .columns
            .iter()
            .map(|(kind, values)| (*kind, values[start..end].to_vec()))
            .collect();
        Self {
            len: end - start,
            columns,
        }
    }
}

/// Computes every [`IndicatorKind`] column from the series' closing prices.
pub fn compute_indicators(series: &PriceSeries) -> IndicatorSet {
    let closes = series.closes();
    let macd = calculate_macd(&closes, macd::DEFAULT_FAST, macd::DEFAULT_SLOW, macd::DEFAULT_SIGNAL);
    let bands = calculate_bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_STDDEV);

    let mut columns = HashMap::new();
    columns.insert(IndicatorKind::Ma20, calculate_sma(&closes, 20));
    columns.insert(IndicatorKind::Ma50, calculate_sma(&closes, 50));
    columns.insert(IndicatorKind::Ma200, calculate_sma(&closes, 200));
    columns.insert(IndicatorKind::Rsi, calculate_rsi(&closes, RSI_PERIOD));
    columns.insert(IndicatorKind::Macd, macd.line);
    columns.insert(IndicatorKind::MacdSignal, macd.signal);
    columns.insert(IndicatorKind::MacdHist, macd.histogram);
    columns.insert(IndicatorKind::BbUpper, bands.upper);
    columns.insert(IndicatorKind::BbMid, bands.middle);
    columns.insert(IndicatorKind::BbLower, bands.lower);
    columns.insert(
        IndicatorKind::Volatility,
        calculate_volatility(&closes, VOLATILITY_WINDOW),
    );

    IndicatorSet {
        len: closes.len(),
        columns,
    }
}
