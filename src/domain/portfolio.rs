//! Single-asset portfolio state and the trade log entries it produces.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub price: f64,
    pub shares: f64,
    pub value: f64,
}

/// Cash and shares of one asset. Every conversion moves the whole holding,
/// so after any rule application at most one side is positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub shares: f64,
}

impl PortfolioState {
    pub fn new(initial_investment: f64) -> Self {
        PortfolioState {
            cash: initial_investment,
            shares: 0.0,
        }
    }

    pub fn in_cash(&self) -> bool {
        self.cash > 0.0
    }

    pub fn invested(&self) -> bool {
        self.shares > 0.0
    }

    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.shares * price
    }

    /// Converts all cash into shares. No-op (returns `None`) when there is no cash.
    pub fn buy_all(&mut self, date: NaiveDate, price: f64) -> Option<Trade> {
        if !self.in_cash() {
            return None;
        }
        let shares = self.cash / price;
        self.shares += shares;
        self.cash = 0.0;
        Some(Trade {
            date,
            action: TradeAction::Buy,
            price,
            shares,
            value: shares * price,
        })
    }

    /// Converts all shares into cash. No-op (returns `None`) when nothing is held.
    pub fn sell_all(&mut self, date: NaiveDate, price: f64) -> Option<Trade> {
        if !self.invested() {
            return None;
        }
        let shares = self.shares;
        let proceeds = shares * price;
        self.cash += proceeds;
        self.shares = 0.0;
        Some(Trade {
            date,
            action: TradeAction::Sell,
            price,
            shares,
            value: proceeds,
        })
    }
}
