//! Strategy simulation: a fold over the price series carrying the portfolio.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use super::error::StocksimError;
use super::indicator::IndicatorSet;
use super::metrics::{annualized_return, buy_hold_return, return_pct};
use super::ohlcv::PriceSeries;
use super::portfolio::{PortfolioState, Trade};
use super::strategy::{BarContext, Signal, StrategyKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub strategy: StrategyKind,
    pub initial_investment: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub final_value: f64,
    pub return_pct: f64,
    pub annualized_return: f64,
    pub buy_hold_return: f64,
    pub trades: Vec<Trade>,
    pub portfolio_values: Vec<f64>,
    pub dates: Vec<NaiveDate>,
}

impl SimulationResult {
    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    /// Strategy return minus buy-and-hold return, in percentage points.
    pub fn excess_return(&self) -> f64 {
        self.return_pct - self.buy_hold_return
    }

    pub fn outperformed(&self) -> bool {
        self.return_pct > self.buy_hold_return
    }
}

struct Walk {
    state: PortfolioState,
    trades: Vec<Trade>,
    values: Vec<f64>,
}

/// Replays `series` bar by bar under `strategy`.
///
/// `indicators` must be aligned with `series` and carry every column in
/// [`StrategyKind::required_indicators`]; buy-and-hold needs none.
pub fn simulate(
    series: &PriceSeries,
    indicators: &IndicatorSet,
    initial_investment: f64,
    strategy: StrategyKind,
) -> Result<SimulationResult, StocksimError> {
    if !initial_investment.is_finite() || initial_investment <= 0.0 {
        return Err(StocksimError::invalid_input(format!(
            "initial investment must be positive, got {initial_investment}"
        )));
    }
    let required = strategy.required_indicators();
    if !required.is_empty() && indicators.len() != series.len() {
        return Err(StocksimError::invalid_input(format!(
            "indicator set covers {} bars but the series has {}",
            indicators.len(),
            series.len()
        )));
    }
    if let Some(missing) = required.iter().find(|k| !indicators.contains(**k)) {
        return Err(StocksimError::invalid_input(format!(
            "missing required column {missing} for {strategy}"
        )));
    }

    info!(
        strategy = %strategy,
        bars = series.len(),
        start = %series.start_date(),
        end = %series.end_date(),
        "running simulation"
    );

    let rule = strategy.rule();
    let last_index = series.len() - 1;
    let start = Walk {
        state: PortfolioState::new(initial_investment),
        trades: Vec::new(),
        values: Vec::with_capacity(series.len()),
    };

    let walk = series
        .bars()
        .iter()
        .enumerate()
        .fold(start, |mut walk, (index, bar)| {
            let ctx = BarContext {
                index,
                bar,
                indicators,
            };
            let trade = match rule(&ctx) {
                Signal::Buy => walk.state.buy_all(bar.date, bar.close),
                Signal::Sell => walk.state.sell_all(bar.date, bar.close),
                Signal::Hold => None,
            };
            walk.values.push(walk.state.value(bar.close));

            let mut executed: Vec<Trade> = trade.into_iter().collect();
            if index == last_index && strategy.liquidates_at_end() {
                executed.extend(walk.state.sell_all(bar.date, bar.close));
            }
            for t in &executed {
                debug!(date = %t.date, action = %t.action, price = t.price, shares = t.shares, "trade");
            }
            walk.trades.extend(executed);
            walk
        });

    let first_close = series.first().close;
    let last_close = series.last().close;
    let final_value = walk.state.value(last_close);
    let elapsed_days = (series.end_date() - series.start_date()).num_days() as f64;

    let result = SimulationResult {
        strategy,
        initial_investment,
        start_date: series.start_date(),
        end_date: series.end_date(),
        final_value,
        return_pct: return_pct(initial_investment, final_value),
        annualized_return: annualized_return(initial_investment, final_value, elapsed_days),
        buy_hold_return: buy_hold_return(first_close, last_close),
        trades: walk.trades,
        portfolio_values: walk.values,
        dates: series.dates(),
    };

    info!(
        final_value = result.final_value,
        return_pct = result.return_pct,
        trades = result.trade_count(),
        "simulation complete"
    );

    Ok(result)
}

/// Value of the initial investment fully bought at the first close, for every bar.
pub fn buy_hold_values(series: &PriceSeries, initial_investment: f64) -> Vec<f64> {
    let shares = initial_investment / series.first().close;
    series.bars().iter().map(|b| shares * b.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorKind;
    use crate::domain::ohlcv::PriceBar;
    use crate::domain::portfolio::TradeAction;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn series_from(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000.0,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn buy_and_hold_two_trades() {
        let series = series_from(&[100.0, 105.0, 110.0, 120.0]);
        let result = simulate(&series, &IndicatorSet::default(), 10_000.0, StrategyKind::BuyAndHold)
            .unwrap();

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].action, TradeAction::Buy);
        assert_eq!(result.trades[0].date, series.start_date());
        assert_relative_eq!(result.trades[0].price, 100.0);
        assert_eq!(result.trades[1].action, TradeAction::Sell);
        assert_eq!(result.trades[1].date, series.end_date());
        assert_relative_eq!(result.trades[1].price, 120.0);
        assert_relative_eq!(result.trades[1].shares, 100.0);
        assert_relative_eq!(result.final_value, 12_000.0);
        assert_eq!(result.return_pct, result.buy_hold_return);
    }

    #[test]
    fn buy_and_hold_values_track_close() {
        let series = series_from(&[100.0, 50.0, 200.0]);
        let result = simulate(&series, &IndicatorSet::default(), 1_000.0, StrategyKind::BuyAndHold)
            .unwrap();
        assert_eq!(result.portfolio_values, vec![1_000.0, 500.0, 2_000.0]);
        assert_eq!(result.dates, series.dates());
    }

    #[test]
    fn single_bar_buy_and_hold() {
        let series = series_from(&[40.0]);
        let result = simulate(&series, &IndicatorSet::default(), 5_000.0, StrategyKind::BuyAndHold)
            .unwrap();
        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].price, result.trades[1].price);
        assert_eq!(result.return_pct, 0.0);
        assert_eq!(result.annualized_return, 0.0);
        assert_eq!(result.portfolio_values.len(), 1);
    }

    #[test]
    fn rejects_non_positive_investment() {
        let series = series_from(&[100.0]);
        for amount in [0.0, -5.0, f64::NAN] {
            let err = simulate(&series, &IndicatorSet::default(), amount, StrategyKind::BuyAndHold)
                .unwrap_err();
            assert!(matches!(err, StocksimError::InvalidInput { .. }));
        }
    }

    #[test]
    fn rejects_missing_required_column() {
        let series = series_from(&[100.0, 101.0]);
        let indicators = IndicatorSet::new(2)
            .with(IndicatorKind::Ma20, vec![None, None])
            .unwrap();
        let err = simulate(&series, &indicators, 1_000.0, StrategyKind::MovingAverageCrossover)
            .unwrap_err();
        assert!(err.to_string().contains("MA50"));
    }

    #[test]
    fn rejects_misaligned_indicators() {
        let series = series_from(&[100.0, 101.0, 102.0]);
        let indicators = IndicatorSet::new(2)
            .with(IndicatorKind::Rsi, vec![None, None])
            .unwrap();
        let result = simulate(&series, &indicators, 1_000.0, StrategyKind::Rsi);
        assert!(result.is_err());
    }

    #[test]
    fn rsi_round_trip_trade() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let series = series_from(&closes);
        let mut rsi = vec![Some(50.0); 20];
        rsi[15] = Some(20.0);
        rsi[18] = Some(80.0);
        let indicators = IndicatorSet::new(20).with(IndicatorKind::Rsi, rsi).unwrap();

        let result = simulate(&series, &indicators, 1_150.0, StrategyKind::Rsi).unwrap();

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].action, TradeAction::Buy);
        assert_relative_eq!(result.trades[0].price, 115.0);
        assert_relative_eq!(result.trades[0].shares, 10.0);
        assert_eq!(result.trades[1].action, TradeAction::Sell);
        assert_relative_eq!(result.trades[1].value, 1_180.0);
        // Position closed at bar 18, cash carried to the end
        assert_relative_eq!(result.final_value, 1_180.0);
        assert_relative_eq!(result.portfolio_values[19], 1_180.0);
        assert_relative_eq!(result.portfolio_values[16], 1_160.0);
    }

    #[test]
    fn rsi_repeated_signal_does_not_duplicate_trade() {
        let series = series_from(&[100.0; 20]);
        let mut rsi = vec![Some(50.0); 20];
        for v in rsi.iter_mut().skip(14) {
            *v = Some(10.0);
        }
        let indicators = IndicatorSet::new(20).with(IndicatorKind::Rsi, rsi).unwrap();
        let result = simulate(&series, &indicators, 1_000.0, StrategyKind::Rsi).unwrap();
        assert_eq!(result.trades.len(), 1);
    }

    #[test]
    fn crossover_keeps_open_position_at_end() {
        let closes: Vec<f64> = (0..55).map(|i| 10.0 + i as f64).collect();
        let series = series_from(&closes);
        let indicators = IndicatorSet::new(55)
            .with(IndicatorKind::Ma20, vec![Some(2.0); 55])
            .unwrap()
            .with(IndicatorKind::Ma50, vec![Some(1.0); 55])
            .unwrap();
        let result =
            simulate(&series, &indicators, 600.0, StrategyKind::MovingAverageCrossover).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].date, series.bars()[50].date);
        // bought 10 shares at 60, last close 64
        assert_relative_eq!(result.final_value, 640.0, epsilon = 1e-9);
    }

    #[test]
    fn excess_return_and_outperformance() {
        let series = series_from(&[100.0, 80.0]);
        let result = simulate(&series, &IndicatorSet::default(), 1_000.0, StrategyKind::BuyAndHold)
            .unwrap();
        assert_relative_eq!(result.excess_return(), 0.0);
        assert!(!result.outperformed());
        assert_eq!(result.trade_count(), 2);
    }

    #[test]
    fn buy_hold_values_curve() {
        let series = series_from(&[50.0, 100.0, 25.0]);
        assert_eq!(buy_hold_values(&series, 100.0), vec![100.0, 200.0, 50.0]);
    }
}
