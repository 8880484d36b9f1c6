//! Core domain types and logic.

pub mod ohlcv;
pub mod period;
pub mod indicator;
pub mod portfolio;
pub mod strategy;
pub mod simulation;
pub mod metrics;
pub mod recommendation;
pub mod summary;
pub mod config_validation;
pub mod error;
