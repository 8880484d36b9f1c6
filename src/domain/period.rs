//! Lookback periods for trimming a price history to a trailing window.

use chrono::Months;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::error::StocksimError;
use super::ohlcv::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LookbackPeriod {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl LookbackPeriod {
    pub const ALL: [LookbackPeriod; 7] = [
        LookbackPeriod::OneMonth,
        LookbackPeriod::ThreeMonths,
        LookbackPeriod::SixMonths,
        LookbackPeriod::OneYear,
        LookbackPeriod::TwoYears,
        LookbackPeriod::FiveYears,
        LookbackPeriod::Max,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            LookbackPeriod::OneMonth => "1mo",
            LookbackPeriod::ThreeMonths => "3mo",
            LookbackPeriod::SixMonths => "6mo",
            LookbackPeriod::OneYear => "1y",
            LookbackPeriod::TwoYears => "2y",
            LookbackPeriod::FiveYears => "5y",
            LookbackPeriod::Max => "max",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LookbackPeriod::OneMonth => "1 Month",
            LookbackPeriod::ThreeMonths => "3 Months",
            LookbackPeriod::SixMonths => "6 Months",
            LookbackPeriod::OneYear => "1 Year",
            LookbackPeriod::TwoYears => "2 Years",
            LookbackPeriod::FiveYears => "5 Years",
            LookbackPeriod::Max => "Max",
        }
    }

    /// Calendar months covered, `None` for the whole history.
    pub fn months(&self) -> Option<u32> {
        match self {
            LookbackPeriod::OneMonth => Some(1),
            LookbackPeriod::ThreeMonths => Some(3),
            LookbackPeriod::SixMonths => Some(6),
            LookbackPeriod::OneYear => Some(12),
            LookbackPeriod::TwoYears => Some(24),
            LookbackPeriod::FiveYears => Some(60),
            LookbackPeriod::Max => None,
        }
    }

    /// Trailing window ending at the series' last bar.
    pub fn apply(&self, series: &PriceSeries) -> Result<PriceSeries, StocksimError> {
        let Some(months) = self.months() else {
            return Ok(series.clone());
        };
        let end = series.end_date();
        let start = end
            .checked_sub_months(Months::new(months))
            .unwrap_or(series.start_date());
        series.between(start, end)
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for LookbackPeriod {
    type Err = StocksimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        LookbackPeriod::ALL
            .into_iter()
            .find(|p| {
                p.code().eq_ignore_ascii_case(trimmed) || p.label().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| StocksimError::UnknownPeriod {
                name: trimmed.to_string(),
            })
    }
}
