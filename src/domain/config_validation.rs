//! Configuration validation.
//!
//! Checks every config field before a simulation or analysis runs.

use std::str::FromStr;

use crate::domain::error::StocksimError;
use crate::domain::period::LookbackPeriod;
use crate::domain::recommendation::RiskTolerance;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_INITIAL_INVESTMENT: f64 = 10_000.0;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    validate_data_config(config)?;
    validate_simulation_config(config)?;
    validate_analysis_config(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    match config.get_string("data", "path") {
        Some(s) if !s.trim().is_empty() => {}
        _ => {
            return Err(StocksimError::ConfigMissing {
                section: "data".to_string(),
                key: "path".to_string(),
            })
        }
    }
    if let Some(ticker) = config.get_string("data", "ticker") {
        if ticker.trim().is_empty() || ticker.contains(['/', '\\']) {
            return Err(invalid("data", "ticker", "ticker must be a bare symbol"));
        }
    }
    Ok(())
}

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    validate_strategy(config)?;
    validate_initial_investment(config)?;
    validate_dates(config)?;
    validate_period(config)?;
    Ok(())
}

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    if let Some(value) = config.get_string("analysis", "risk_tolerance") {
        RiskTolerance::from_str(&value)
            .map_err(|e| invalid("analysis", "risk_tolerance", &e.to_string()))?;
    }
    Ok(())
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    if let Some(value) = config.get_string("simulation", "strategy") {
        StrategyKind::from_str(&value)
            .map_err(|e| invalid("simulation", "strategy", &e.to_string()))?;
    }
    Ok(())
}

fn validate_initial_investment(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    let value = config.get_double(
        "simulation",
        "initial_investment",
        DEFAULT_INITIAL_INVESTMENT,
    )?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "simulation",
            "initial_investment",
            "initial_investment must be positive",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(invalid(
                "simulation",
                "start_date",
                "start_date must not be after end_date",
            ));
        }
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    if let Some(value) = config.get_string("simulation", "period") {
        LookbackPeriod::from_str(&value)
            .map_err(|e| invalid("simulation", "period", &e.to_string()))?;
    }
    Ok(())
}

/// Reads `[simulation] <key>` as a YYYY-MM-DD date when present.
pub fn parse_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, StocksimError> {
    match config.get_string("simulation", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| {
                invalid(
                    "simulation",
                    key,
                    &format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            }),
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn invalid(section: &str, key: &str, reason: &str) -> StocksimError {
    StocksimError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        let config = make_config(
            r#"
[data]
path = ./data
ticker = AAPL

[simulation]
strategy = moving_average_crossover
initial_investment = 25000
start_date = 2020-01-01
end_date = 2024-12-31
period = 1y

[analysis]
risk_tolerance = high
"#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn minimal_config_passes() {
        let config = make_config("[data]\npath = ./data\n");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn missing_data_path_fails() {
        let config = make_config("[data]\nticker = AAPL\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigMissing { key, .. } if key == "path"));
    }

    #[test]
    fn ticker_with_path_separator_fails() {
        let config = make_config("[data]\npath = ./data\nticker = ../etc/passwd\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "ticker"));
    }

    #[test]
    fn unknown_strategy_fails() {
        let config = make_config("[data]\npath = d\n[simulation]\nstrategy = momentum\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "strategy"));
    }

    #[test]
    fn strategy_label_accepted() {
        let config = make_config("[data]\npath = d\n[simulation]\nstrategy = RSI Strategy\n");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn initial_investment_zero_fails() {
        let config = make_config("[data]\npath = d\n[simulation]\ninitial_investment = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "initial_investment")
        );
    }

    #[test]
    fn initial_investment_negative_fails() {
        let config = make_config("[data]\npath = d\n[simulation]\ninitial_investment = -100\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "initial_investment")
        );
    }

    #[test]
    fn initial_investment_non_numeric_fails() {
        let config =
            make_config("[data]\npath = d\n[simulation]\ninitial_investment = ten thousand\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "initial_investment")
        );
    }

    #[test]
    fn invalid_start_date_format_fails() {
        let config = make_config("[data]\npath = d\n[simulation]\nstart_date = 2020/01/01\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn start_after_end_fails() {
        let config = make_config(
            "[data]\npath = d\n[simulation]\nstart_date = 2024-12-31\nend_date = 2020-01-01\n",
        );
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn same_start_and_end_passes() {
        let config = make_config(
            "[data]\npath = d\n[simulation]\nstart_date = 2024-01-02\nend_date = 2024-01-02\n",
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_period_fails() {
        let config = make_config("[data]\npath = d\n[simulation]\nperiod = 10y\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "period"));
    }

    #[test]
    fn unknown_risk_tolerance_fails() {
        let config = make_config("[data]\npath = d\n[analysis]\nrisk_tolerance = extreme\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "risk_tolerance")
        );
    }

    #[test]
    fn parse_date_trims() {
        assert_eq!(
            parse_date(" 2024-03-01 "),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_date("March 1"), None);
    }
}
