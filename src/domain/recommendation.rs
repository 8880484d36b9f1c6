//! Indicator-vote recommendation engine.
//!
//! Three independent votes are read at the last bar: moving-average alignment,
//! RSI level and a MACD/signal crossover against the previous bar. The vote
//! tally maps to an action, a conviction tier and risk-scaled price targets.
//! When any input is missing the result degrades to HOLD/LOW with only an
//! entry price instead of failing.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use super::error::{IndicatorUnavailable, StocksimError};
use super::indicator::{IndicatorKind, IndicatorSet};
use super::metrics::round2;
use super::ohlcv::PriceSeries;
use super::strategy::{RSI_OVERBOUGHT, RSI_OVERSOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Conviction {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    #[default]
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceTargets {
    pub entry: f64,
    pub stop_loss: Option<f64>,
    pub target: Option<f64>,
}

/// Indicator values the votes were computed from, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub ma20: f64,
    pub ma50: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorReading {
    Snapshot(IndicatorSnapshot),
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub action: Action,
    pub conviction: Conviction,
    pub buy_signals: u32,
    pub sell_signals: u32,
    pub price_targets: PriceTargets,
    pub indicators: IndicatorReading,
}

impl Recommendation {
    pub fn is_degraded(&self) -> bool {
        matches!(self.indicators, IndicatorReading::Unavailable { .. })
    }
}

/// Raw inputs for the votes at the evaluation bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInputs {
    pub close: f64,
    pub ma20: f64,
    pub ma50: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub prev_macd: f64,
    pub prev_macd_signal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalTally {
    pub buy: u32,
    pub sell: u32,
}

impl SignalInputs {
    /// Reads the last two bars. Fails with `IndicatorUnavailable` on any gap.
    pub fn at_last_bar(
        series: &PriceSeries,
        indicators: &IndicatorSet,
    ) -> Result<Self, IndicatorUnavailable> {
        if indicators.len() != series.len() {
            return Err(IndicatorUnavailable {
                indicator: "all".into(),
                reason: format!(
                    "indicator set covers {} bars but the series has {}",
                    indicators.len(),
                    series.len()
                ),
            });
        }
        let last = series.len() - 1;
        let prev = last.checked_sub(1).ok_or_else(|| IndicatorUnavailable {
            indicator: IndicatorKind::Macd.to_string(),
            reason: "crossover needs at least two bars".into(),
        })?;

        Ok(SignalInputs {
            close: series.last().close,
            ma20: indicators.require(IndicatorKind::Ma20, last)?,
            ma50: indicators.require(IndicatorKind::Ma50, last)?,
            rsi: indicators.require(IndicatorKind::Rsi, last)?,
            macd: indicators.require(IndicatorKind::Macd, last)?,
            macd_signal: indicators.require(IndicatorKind::MacdSignal, last)?,
            prev_macd: indicators.require(IndicatorKind::Macd, prev)?,
            prev_macd_signal: indicators.require(IndicatorKind::MacdSignal, prev)?,
        })
    }

    pub fn tally(&self) -> SignalTally {
        let mut tally = SignalTally::default();

        if self.close > self.ma20 && self.ma20 > self.ma50 {
            tally.buy += 1;
        } else if self.close < self.ma20 && self.ma20 < self.ma50 {
            tally.sell += 1;
        }

        if self.rsi < RSI_OVERSOLD {
            tally.buy += 1;
        } else if self.rsi > RSI_OVERBOUGHT {
            tally.sell += 1;
        }

        if self.prev_macd <= self.prev_macd_signal && self.macd > self.macd_signal {
            tally.buy += 1;
        } else if self.prev_macd >= self.prev_macd_signal && self.macd < self.macd_signal {
            tally.sell += 1;
        }

        tally
    }

    fn snapshot(&self) -> IndicatorSnapshot {
        IndicatorSnapshot {
            ma20: round2(self.ma20),
            ma50: round2(self.ma50),
            rsi: round2(self.rsi),
            macd: round2(self.macd),
            macd_signal: round2(self.macd_signal),
        }
    }
}

impl SignalTally {
    pub fn decide(&self) -> (Action, Conviction) {
        let tier = |votes: u32| {
            if votes >= 3 {
                Conviction::High
            } else {
                Conviction::Medium
            }
        };
        if self.buy > self.sell && self.buy >= 2 {
            (Action::Buy, tier(self.buy))
        } else if self.sell > self.buy && self.sell >= 2 {
            (Action::Sell, tier(self.sell))
        } else {
            (Action::Hold, Conviction::Medium)
        }
    }
}

/// (stop-loss factor, target factor) applied to the entry price.
pub fn target_factors(action: Action, risk: RiskTolerance) -> (f64, f64) {
    match (action, risk) {
        (Action::Buy, RiskTolerance::High) => (0.95, 1.10),
        (Action::Buy, _) => (0.97, 1.05),
        (Action::Sell, RiskTolerance::High) => (1.05, 0.90),
        (Action::Sell, _) => (1.03, 0.95),
        (Action::Hold, _) => (0.97, 1.03),
    }
}

/// Recommendation for the last bar of `series`. Never fails: missing
/// indicator values produce a degraded HOLD/LOW result.
pub fn recommend(
    series: &PriceSeries,
    indicators: &IndicatorSet,
    risk: RiskTolerance,
) -> Recommendation {
    let entry = round2(series.last().close);

    match SignalInputs::at_last_bar(series, indicators) {
        Ok(inputs) => {
            let tally = inputs.tally();
            let (action, conviction) = tally.decide();
            let (stop_factor, target_factor) = target_factors(action, risk);
            Recommendation {
                action,
                conviction,
                buy_signals: tally.buy,
                sell_signals: tally.sell,
                price_targets: PriceTargets {
                    entry,
                    stop_loss: Some(round2(entry * stop_factor)),
                    target: Some(round2(entry * target_factor)),
                },
                indicators: IndicatorReading::Snapshot(inputs.snapshot()),
            }
        }
        Err(err) => {
            warn!(error = %err, "falling back to degraded recommendation");
            Recommendation {
                action: Action::Hold,
                conviction: Conviction::Low,
                buy_signals: 0,
                sell_signals: 0,
                price_targets: PriceTargets {
                    entry,
                    stop_loss: None,
                    target: None,
                },
                indicators: IndicatorReading::Unavailable {
                    reason: err.to_string(),
                },
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

impl fmt::Display for Conviction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conviction::Low => write!(f, "LOW"),
            Conviction::Medium => write!(f, "MEDIUM"),
            Conviction::High => write!(f, "HIGH"),
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTolerance::Low => write!(f, "low"),
            RiskTolerance::Moderate => write!(f, "moderate"),
            RiskTolerance::High => write!(f, "high"),
        }
    }
}

impl FromStr for RiskTolerance {
    type Err = StocksimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskTolerance::Low),
            "moderate" => Ok(RiskTolerance::Moderate),
            "high" => Ok(RiskTolerance::High),
            _ => Err(StocksimError::UnknownRiskTolerance {
                name: s.trim().to_string(),
            }),
        }
    }
}
