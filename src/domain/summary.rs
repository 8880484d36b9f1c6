//! Summary statistics for a price history: trailing returns, volatility and
//! the 52-week range.

use serde::Serialize;

use super::indicator::{calculate_volatility, IndicatorSet, VOLATILITY_WINDOW};
use super::metrics::round2;
use super::ohlcv::PriceSeries;
use super::recommendation::{recommend, Recommendation, RiskTolerance};

/// Bars in the trailing 52-week window.
pub const YEAR_BARS: usize = 252;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReturnHorizon {
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl ReturnHorizon {
    pub const ALL: [ReturnHorizon; 5] = [
        ReturnHorizon::OneWeek,
        ReturnHorizon::OneMonth,
        ReturnHorizon::ThreeMonths,
        ReturnHorizon::SixMonths,
        ReturnHorizon::OneYear,
    ];

    /// Trading bars standing in for the calendar horizon.
    pub fn bars(&self) -> usize {
        match self {
            ReturnHorizon::OneWeek => 5,
            ReturnHorizon::OneMonth => 21,
            ReturnHorizon::ThreeMonths => 63,
            ReturnHorizon::SixMonths => 126,
            ReturnHorizon::OneYear => YEAR_BARS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReturnHorizon::OneWeek => "1w",
            ReturnHorizon::OneMonth => "1m",
            ReturnHorizon::ThreeMonths => "3m",
            ReturnHorizon::SixMonths => "6m",
            ReturnHorizon::OneYear => "1y",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HorizonReturn {
    pub horizon: ReturnHorizon,
    pub return_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub current_price: f64,
    pub trading_days: usize,
    pub returns: Vec<HorizonReturn>,
    /// Annualized, in percent.
    pub volatility: Option<f64>,
    pub high_52w: f64,
    pub low_52w: f64,
    pub from_52w_high: f64,
    pub from_52w_low: f64,
}

impl SummaryStatistics {
    pub fn return_for(&self, horizon: ReturnHorizon) -> Option<f64> {
        self.returns
            .iter()
            .find(|r| r.horizon == horizon)
            .and_then(|r| r.return_pct)
    }
}

/// Return measured from the close `bars` positions from the end, absent when
/// the history is too short.
pub fn trailing_return(closes: &[f64], bars: usize) -> Option<f64> {
    let n = closes.len();
    if bars == 0 || n <= bars {
        return None;
    }
    let last = closes[n - 1];
    let base = closes[n - bars];
    Some(round2((last / base - 1.0) * 100.0))
}

pub fn summarize(series: &PriceSeries) -> SummaryStatistics {
    let closes = series.closes();
    let last_close = series.last().close;

    let returns = ReturnHorizon::ALL
        .iter()
        .map(|&horizon| HorizonReturn {
            horizon,
            return_pct: trailing_return(&closes, horizon.bars()),
        })
        .collect();

    let volatility = calculate_volatility(&closes, VOLATILITY_WINDOW)
        .last()
        .copied()
        .flatten()
        .map(|v| round2(v * 100.0));

    let window = &series.bars()[series.len().saturating_sub(YEAR_BARS)..];
    let high = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let low = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);

    SummaryStatistics {
        current_price: round2(last_close),
        trading_days: series.len(),
        returns,
        volatility,
        high_52w: round2(high),
        low_52w: round2(low),
        from_52w_high: round2((last_close / high - 1.0) * 100.0),
        from_52w_low: round2((last_close / low - 1.0) * 100.0),
    }
}

/// Recommendation and summary statistics for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub recommendation: Recommendation,
    pub summary: SummaryStatistics,
}

pub fn analyze(
    ticker: &str,
    series: &PriceSeries,
    indicators: &IndicatorSet,
    risk: RiskTolerance,
) -> AnalysisReport {
    AnalysisReport {
        ticker: ticker.to_string(),
        recommendation: recommend(series, indicators, risk),
        summary: summarize(series),
    }
}
