//! Daily price bars and the validated price series.

use chrono::NaiveDate;
use serde::Serialize;
use std::ops::Range;

use super::error::StocksimError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    fn check(&self) -> Result<(), StocksimError> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in prices {
            if !value.is_finite() || value <= 0.0 {
                return Err(StocksimError::invalid_input(format!(
                    "{name} on {} must be a positive number, got {value}",
                    self.date
                )));
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(StocksimError::invalid_input(format!(
                "volume on {} must be non-negative, got {}",
                self.date, self.volume
            )));
        }
        Ok(())
    }
}

/// Non-empty, strictly date-ordered sequence of bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, StocksimError> {
        if bars.is_empty() {
            return Err(StocksimError::invalid_input("price series is empty"));
        }
        for bar in &bars {
            bar.check()?;
        }
        if let Some(w) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(StocksimError::invalid_input(format!(
                "dates must be strictly increasing: {} follows {}",
                w[1].date, w[0].date
            )));
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> &PriceBar {
        &self.bars[0]
    }

    pub fn last(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn start_date(&self) -> NaiveDate {
        self.first().date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.last().date
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Bar indices whose dates fall within `start..=end`.
    pub fn index_range(&self, start: NaiveDate, end: NaiveDate) -> Range<usize> {
        let lo = self.bars.partition_point(|b| b.date < start);
        let hi = self.bars.partition_point(|b| b.date <= end).max(lo);
        lo..hi
    }

    /// Inclusive date sub-range. Fails when no bar falls inside it.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Result<Self, StocksimError> {
        let range = self.index_range(start, end);
        if range.is_empty() {
            return Err(StocksimError::invalid_input(format!(
                "no data available between {start} and {end}"
            )));
        }
        Ok(Self {
            bars: self.bars[range].to_vec(),
        })
    }
}
