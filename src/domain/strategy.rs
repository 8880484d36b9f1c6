//! Strategy kinds and their per-bar decision rules.
//!
//! Each rule sees only the current bar and indicator values at or before it.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::error::StocksimError;
use super::indicator::{IndicatorKind, IndicatorSet};
use super::ohlcv::PriceBar;

/// Bars held in cash before the crossover rule is evaluated.
pub const CROSSOVER_WARMUP: usize = 50;
/// Bars held in cash before the RSI rule is evaluated.
pub const RSI_WARMUP: usize = 14;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    BuyAndHold,
    MovingAverageCrossover,
    Rsi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// What a decision rule may look at for one bar.
#[derive(Debug, Clone, Copy)]
pub struct BarContext<'a> {
    pub index: usize,
    pub bar: &'a PriceBar,
    pub indicators: &'a IndicatorSet,
}

pub type DecisionRule = fn(&BarContext<'_>) -> Signal;

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::BuyAndHold,
        StrategyKind::MovingAverageCrossover,
        StrategyKind::Rsi,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::BuyAndHold => "Buy and Hold",
            StrategyKind::MovingAverageCrossover => "Moving Average Crossover",
            StrategyKind::Rsi => "RSI Strategy",
        }
    }

    pub fn rule(&self) -> DecisionRule {
        match self {
            StrategyKind::BuyAndHold => buy_and_hold,
            StrategyKind::MovingAverageCrossover => moving_average_crossover,
            StrategyKind::Rsi => rsi_threshold,
        }
    }

    /// Indicator columns that must be present in the set passed to the simulator.
    pub fn required_indicators(&self) -> &'static [IndicatorKind] {
        match self {
            StrategyKind::BuyAndHold => &[],
            StrategyKind::MovingAverageCrossover => &[IndicatorKind::Ma20, IndicatorKind::Ma50],
            StrategyKind::Rsi => &[IndicatorKind::Rsi],
        }
    }

    /// Whether any open position is forcibly converted back to cash at the last bar.
    pub fn liquidates_at_end(&self) -> bool {
        matches!(self, StrategyKind::BuyAndHold)
    }
}

fn buy_and_hold(ctx: &BarContext<'_>) -> Signal {
    if ctx.index == 0 {
        Signal::Buy
    } else {
        Signal::Hold
    }
}

fn moving_average_crossover(ctx: &BarContext<'_>) -> Signal {
    if ctx.index < CROSSOVER_WARMUP {
        return Signal::Hold;
    }
    let fast = ctx.indicators.value_at(IndicatorKind::Ma20, ctx.index);
    let slow = ctx.indicators.value_at(IndicatorKind::Ma50, ctx.index);
    match (fast, slow) {
        (Some(fast), Some(slow)) if fast > slow => Signal::Buy,
        (Some(fast), Some(slow)) if fast < slow => Signal::Sell,
        _ => Signal::Hold,
    }
}

fn rsi_threshold(ctx: &BarContext<'_>) -> Signal {
    if ctx.index < RSI_WARMUP {
        return Signal::Hold;
    }
    match ctx.indicators.value_at(IndicatorKind::Rsi, ctx.index) {
        Some(rsi) if rsi < RSI_OVERSOLD => Signal::Buy,
        Some(rsi) if rsi > RSI_OVERBOUGHT => Signal::Sell,
        _ => Signal::Hold,
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for StrategyKind {
    type Err = StocksimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "buy_and_hold" | "buy_hold" | "buyandhold" => Ok(StrategyKind::BuyAndHold),
            "moving_average_crossover" | "ma_crossover" | "sma_crossover" => {
                Ok(StrategyKind::MovingAverageCrossover)
            }
            "rsi" | "rsi_strategy" => Ok(StrategyKind::Rsi),
            _ => Err(StocksimError::UnknownStrategy {
                name: s.trim().to_string(),
            }),
        }
    }
}
