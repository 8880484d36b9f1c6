//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{debug, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::config_validation::{
    parse_date, parse_optional_date, validate_config, DEFAULT_INITIAL_INVESTMENT,
};
use crate::domain::error::StocksimError;
use crate::domain::indicator::{compute_indicators, IndicatorSet};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::period::LookbackPeriod;
use crate::domain::recommendation::{IndicatorReading, RiskTolerance};
use crate::domain::simulation::{simulate, SimulationResult};
use crate::domain::strategy::StrategyKind;
use crate::domain::summary::{analyze, AnalysisReport, ReturnHorizon};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "stocksim",
    version,
    about = "Stock strategy simulator and technical recommendation engine"
)]
pub struct Cli {
    /// Log debug events, including every simulated trade
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a trading strategy over a ticker's price history
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        overrides: SimulationOverrides,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Recommendation and summary statistics for a ticker
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        /// low, moderate or high
        #[arg(long)]
        risk: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List tickers with price files in the data directory
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct SimulationOverrides {
    #[arg(long)]
    pub ticker: Option<String>,
    /// buy_and_hold, moving_average_crossover or rsi
    #[arg(long)]
    pub strategy: Option<String>,
    #[arg(long)]
    pub investment: Option<f64>,
    /// First simulated date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// Last simulated date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    /// 1mo, 3mo, 6mo, 1y, 2y, 5y or max
    #[arg(long)]
    pub period: Option<String>,
}

/// Fully resolved inputs for one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub ticker: String,
    pub strategy: StrategyKind,
    pub initial_investment: f64,
    pub period: LookbackPeriod,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Simulate {
            config,
            overrides,
            output,
        } => run_simulate(&config, &overrides, output.as_deref()),
        Command::Analyze {
            config,
            ticker,
            risk,
            output,
        } => run_analyze(&config, ticker.as_deref(), risk.as_deref(), output.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListTickers { config } => run_list_tickers(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StocksimError> {
    info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

/// CSV source rooted at `[data] path`.
pub fn build_data_port(config: &dyn ConfigPort) -> Result<CsvAdapter, StocksimError> {
    let path = config
        .get_string("data", "path")
        .ok_or_else(|| StocksimError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;
    Ok(CsvAdapter::new(PathBuf::from(path)))
}

pub fn resolve_ticker(
    ticker_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, StocksimError> {
    ticker_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "ticker"))
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| StocksimError::ConfigMissing {
            section: "data".into(),
            key: "ticker".into(),
        })
}

pub fn build_simulation_settings(
    config: &dyn ConfigPort,
    overrides: &SimulationOverrides,
) -> Result<SimulationSettings, StocksimError> {
    let ticker = resolve_ticker(overrides.ticker.as_deref(), config)?;

    let strategy = match overrides
        .strategy
        .clone()
        .or_else(|| config.get_string("simulation", "strategy"))
    {
        Some(name) => StrategyKind::from_str(&name)?,
        None => StrategyKind::BuyAndHold,
    };

    let initial_investment = match overrides.investment {
        Some(value) => value,
        None => config.get_double(
            "simulation",
            "initial_investment",
            DEFAULT_INITIAL_INVESTMENT,
        )?,
    };
    if !initial_investment.is_finite() || initial_investment <= 0.0 {
        return Err(StocksimError::invalid_input(format!(
            "initial investment must be positive, got {initial_investment}"
        )));
    }

    let period = match overrides
        .period
        .clone()
        .or_else(|| config.get_string("simulation", "period"))
    {
        Some(code) => LookbackPeriod::from_str(&code)?,
        None => LookbackPeriod::Max,
    };

    let start_date = match overrides.start.as_deref() {
        Some(s) => Some(parse_cli_date(s, "--start")?),
        None => parse_optional_date(config, "start_date")?,
    };
    let end_date = match overrides.end.as_deref() {
        Some(s) => Some(parse_cli_date(s, "--end")?),
        None => parse_optional_date(config, "end_date")?,
    };
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(StocksimError::invalid_input(format!(
                "start date {start} is after end date {end}"
            )));
        }
    }

    Ok(SimulationSettings {
        ticker,
        strategy,
        initial_investment,
        period,
        start_date,
        end_date,
    })
}

fn parse_cli_date(value: &str, flag: &str) -> Result<NaiveDate, StocksimError> {
    parse_date(value).ok_or_else(|| {
        StocksimError::invalid_input(format!("{flag} must be YYYY-MM-DD, got '{value}'"))
    })
}

pub fn resolve_risk(
    risk_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<RiskTolerance, StocksimError> {
    match risk_override
        .map(str::to_string)
        .or_else(|| config.get_string("analysis", "risk_tolerance"))
    {
        Some(name) => RiskTolerance::from_str(&name),
        None => Ok(RiskTolerance::default()),
    }
}

/// Validated price history for `ticker`.
pub fn load_series(data_port: &dyn DataPort, ticker: &str) -> Result<PriceSeries, StocksimError> {
    let bars = data_port.fetch_prices(ticker)?;
    if bars.is_empty() {
        return Err(StocksimError::NoData {
            ticker: ticker.to_string(),
        });
    }
    debug!(ticker, bars = bars.len(), "loaded price history");
    PriceSeries::new(bars)
}

/// Cuts the series and its indicators to the configured window.
///
/// Indicators are computed over the whole lookback period first so the
/// simulated window starts with warmed-up values.
pub fn select_window(
    series: &PriceSeries,
    settings: &SimulationSettings,
) -> Result<(PriceSeries, IndicatorSet), StocksimError> {
    let history = settings.period.apply(series)?;
    let indicators = compute_indicators(&history);

    let start = settings.start_date.unwrap_or(history.start_date());
    let end = settings.end_date.unwrap_or(history.end_date());
    let window = history.between(start, end)?;
    let range = history.index_range(start, end);

    Ok((window, indicators.slice(range)))
}

pub fn run_simulation_pipeline(
    data_port: &dyn DataPort,
    settings: &SimulationSettings,
) -> Result<SimulationResult, StocksimError> {
    let series = load_series(data_port, &settings.ticker)?;
    let (window, indicators) = select_window(&series, settings)?;
    info!(
        ticker = %settings.ticker,
        period = %settings.period,
        bars = window.len(),
        "simulation window selected"
    );
    simulate(
        &window,
        &indicators,
        settings.initial_investment,
        settings.strategy,
    )
}

pub fn run_analysis_pipeline(
    data_port: &dyn DataPort,
    ticker: &str,
    risk: RiskTolerance,
) -> Result<AnalysisReport, StocksimError> {
    let series = load_series(data_port, ticker)?;
    let indicators = compute_indicators(&series);
    info!(ticker, bars = series.len(), risk = %risk, "analyzing");
    Ok(analyze(ticker, &series, &indicators, risk))
}

pub fn run_simulate(
    config_path: &Path,
    overrides: &SimulationOverrides,
    output_path: Option<&Path>,
) -> Result<(), StocksimError> {
    let config = load_config(config_path)?;
    let settings = build_simulation_settings(&config, overrides)?;
    let data_port = build_data_port(&config)?;

    let result = run_simulation_pipeline(&data_port, &settings)?;
    print!("{}", format_simulation(&settings.ticker, &result));

    if let Some(path) = output_path {
        JsonReportAdapter::new().write_simulation(&settings.ticker, &result, path)?;
        eprintln!("Report written to: {}", path.display());
    }
    Ok(())
}

pub fn run_analyze(
    config_path: &Path,
    ticker: Option<&str>,
    risk: Option<&str>,
    output_path: Option<&Path>,
) -> Result<(), StocksimError> {
    let config = load_config(config_path)?;
    let ticker = resolve_ticker(ticker, &config)?;
    let risk = resolve_risk(risk, &config)?;
    let data_port = build_data_port(&config)?;

    let report = run_analysis_pipeline(&data_port, &ticker, risk)?;
    print!("{}", format_analysis(&report));

    if let Some(path) = output_path {
        JsonReportAdapter::new().write_analysis(&report, path)?;
        eprintln!("Report written to: {}", path.display());
    }
    Ok(())
}

pub fn run_validate(config_path: &Path) -> Result<(), StocksimError> {
    let config = load_config(config_path)?;
    let settings = build_simulation_settings(&config, &SimulationOverrides::default());
    let risk = resolve_risk(None, &config)?;

    println!("Configuration is valid.");
    match settings {
        Ok(s) => {
            println!("  ticker:     {}", s.ticker);
            println!("  strategy:   {}", s.strategy);
            println!("  investment: ${:.2}", s.initial_investment);
            println!("  period:     {}", s.period.label());
        }
        // A config without a default ticker is still valid for use with --ticker.
        Err(StocksimError::ConfigMissing { key, .. }) if key == "ticker" => {
            println!("  ticker:     (none, pass --ticker)");
        }
        Err(e) => return Err(e),
    }
    println!("  risk:       {risk}");
    Ok(())
}

pub fn run_list_tickers(config_path: &Path) -> Result<(), StocksimError> {
    let config = load_config(config_path)?;
    let data_port = build_data_port(&config)?;

    let tickers = data_port.list_tickers()?;
    if tickers.is_empty() {
        eprintln!("No price files found");
        return Ok(());
    }
    for ticker in &tickers {
        match data_port.get_data_range(ticker) {
            Ok(Some((first, last, count))) => {
                println!("{ticker}: {count} bars, {first} to {last}");
            }
            Ok(None) => println!("{ticker}: no data"),
            Err(e) => println!("{ticker}: unreadable ({e})"),
        }
    }
    eprintln!("{} tickers found", tickers.len());
    Ok(())
}

/// Console summary of a simulation, including the trade history.
pub fn format_simulation(ticker: &str, result: &SimulationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Simulation Results for {ticker} ===");
    let _ = writeln!(out, "Strategy:           {}", result.strategy);
    let _ = writeln!(
        out,
        "Period:             {} to {}",
        result.start_date, result.end_date
    );
    let _ = writeln!(out, "Initial Investment: ${:.2}", result.initial_investment);
    let _ = writeln!(out, "Final Value:        ${:.2}", result.final_value);
    let _ = writeln!(out, "Return:             {:.2}%", result.return_pct);
    let _ = writeln!(out, "Buy & Hold Return:  {:.2}%", result.buy_hold_return);
    let _ = writeln!(out, "Annualized Return:  {:.2}%", result.annualized_return);
    let _ = writeln!(out, "Number of Trades:   {}", result.trade_count());

    let excess = result.excess_return();
    if result.outperformed() {
        let _ = writeln!(out, "Strategy outperformed buy & hold by {:.2}%", excess);
    } else {
        let _ = writeln!(
            out,
            "Strategy underperformed buy & hold by {:.2}%",
            excess.abs()
        );
    }

    let _ = writeln!(out, "\n=== Trade History ===");
    if result.trades.is_empty() {
        let _ = writeln!(out, "No trades executed");
    }
    for trade in &result.trades {
        let _ = writeln!(
            out,
            "{}: {} at ${:.2} - {:.2} shares (${:.2})",
            trade.date, trade.action, trade.price, trade.shares, trade.value
        );
    }
    out
}

fn fmt_optional_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}%"))
}

fn fmt_optional_price(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("${v:.2}"))
}

/// Console summary of a recommendation and the summary statistics.
pub fn format_analysis(report: &AnalysisReport) -> String {
    let rec = &report.recommendation;
    let stats = &report.summary;
    let mut out = String::new();

    let _ = writeln!(out, "=== Analysis for {} ===", report.ticker);
    let _ = writeln!(
        out,
        "Recommendation:     {} ({} conviction)",
        rec.action, rec.conviction
    );
    let _ = writeln!(
        out,
        "Signals:            {} buy / {} sell",
        rec.buy_signals, rec.sell_signals
    );
    let _ = writeln!(out, "Entry:              ${:.2}", rec.price_targets.entry);
    let _ = writeln!(
        out,
        "Stop Loss:          {}",
        fmt_optional_price(rec.price_targets.stop_loss)
    );
    let _ = writeln!(
        out,
        "Target:             {}",
        fmt_optional_price(rec.price_targets.target)
    );
    match &rec.indicators {
        IndicatorReading::Snapshot(s) => {
            let _ = writeln!(
                out,
                "Indicators:         MA20 {:.2}, MA50 {:.2}, RSI {:.2}, MACD {:.2}, Signal {:.2}",
                s.ma20, s.ma50, s.rsi, s.macd, s.macd_signal
            );
        }
        IndicatorReading::Unavailable { reason } => {
            let _ = writeln!(out, "Indicators:         unavailable ({reason})");
        }
    }

    let _ = writeln!(out, "\n=== Summary Statistics ===");
    let _ = writeln!(out, "Current Price:      ${:.2}", stats.current_price);
    let _ = writeln!(out, "Trading Days:       {}", stats.trading_days);
    for horizon in ReturnHorizon::ALL {
        let _ = writeln!(
            out,
            "{:<20}{}",
            format!("{} Return:", horizon.label()),
            fmt_optional_pct(stats.return_for(horizon))
        );
    }
    let _ = writeln!(
        out,
        "Volatility:         {}",
        fmt_optional_pct(stats.volatility)
    );
    let _ = writeln!(out, "52w High:           ${:.2}", stats.high_52w);
    let _ = writeln!(out, "52w Low:            ${:.2}", stats.low_52w);
    let _ = writeln!(out, "From 52w High:      {:.2}%", stats.from_52w_high);
    let _ = writeln!(out, "From 52w Low:       {:.2}%", stats.from_52w_low);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn cli_parses_simulate_overrides() {
        let cli = Cli::try_parse_from([
            "stocksim",
            "simulate",
            "--config",
            "sim.ini",
            "--ticker",
            "msft",
            "--strategy",
            "rsi",
            "--investment",
            "5000",
            "--start",
            "2023-01-01",
            "-o",
            "out.json",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Simulate {
                config,
                overrides,
                output,
            } => {
                assert_eq!(config, PathBuf::from("sim.ini"));
                assert_eq!(overrides.ticker.as_deref(), Some("msft"));
                assert_eq!(overrides.investment, Some(5000.0));
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_parses_list_tickers() {
        let cli = Cli::try_parse_from(["stocksim", "list-tickers", "-c", "a.ini"]).unwrap();
        assert!(matches!(cli.command, Command::ListTickers { .. }));
    }

    #[test]
    fn settings_from_config() {
        let config = make_config(
            "[data]\npath = d\nticker = aapl\n\
             [simulation]\nstrategy = Moving Average Crossover\ninitial_investment = 2500\n\
             start_date = 2023-01-01\nperiod = 2y\n",
        );
        let settings = build_simulation_settings(&config, &SimulationOverrides::default()).unwrap();
        assert_eq!(settings.ticker, "AAPL");
        assert_eq!(settings.strategy, StrategyKind::MovingAverageCrossover);
        assert_eq!(settings.initial_investment, 2500.0);
        assert_eq!(settings.period, LookbackPeriod::TwoYears);
        assert_eq!(settings.start_date, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(settings.end_date, None);
    }

    #[test]
    fn settings_defaults() {
        let config = make_config("[data]\npath = d\nticker = X\n");
        let settings = build_simulation_settings(&config, &SimulationOverrides::default()).unwrap();
        assert_eq!(settings.strategy, StrategyKind::BuyAndHold);
        assert_eq!(settings.initial_investment, DEFAULT_INITIAL_INVESTMENT);
        assert_eq!(settings.period, LookbackPeriod::Max);
    }

    #[test]
    fn overrides_take_precedence() {
        let config = make_config(
            "[data]\npath = d\nticker = AAPL\n[simulation]\nstrategy = rsi\ninitial_investment = 100\n",
        );
        let overrides = SimulationOverrides {
            ticker: Some("msft".into()),
            strategy: Some("buy_and_hold".into()),
            investment: Some(750.0),
            period: Some("6 Months".into()),
            ..Default::default()
        };
        let settings = build_simulation_settings(&config, &overrides).unwrap();
        assert_eq!(settings.ticker, "MSFT");
        assert_eq!(settings.strategy, StrategyKind::BuyAndHold);
        assert_eq!(settings.initial_investment, 750.0);
        assert_eq!(settings.period, LookbackPeriod::SixMonths);
    }

    #[test]
    fn non_numeric_investment_is_config_invalid() {
        let config = make_config(
            "[data]\npath = d\nticker = AAPL\n[simulation]\ninitial_investment = ten thousand\n",
        );
        let err = build_simulation_settings(&config, &SimulationOverrides::default()).unwrap_err();
        assert!(
            matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "initial_investment")
        );
    }

    #[test]
    fn missing_ticker_is_config_missing() {
        let config = make_config("[data]\npath = d\n");
        let err = build_simulation_settings(&config, &SimulationOverrides::default()).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigMissing { key, .. } if key == "ticker"));
    }

    #[test]
    fn unknown_strategy_override_fails() {
        let config = make_config("[data]\npath = d\nticker = X\n");
        let overrides = SimulationOverrides {
            strategy: Some("momentum".into()),
            ..Default::default()
        };
        let err = build_simulation_settings(&config, &overrides).unwrap_err();
        assert!(matches!(err, StocksimError::UnknownStrategy { .. }));
    }

    #[test]
    fn reversed_override_dates_fail() {
        let config = make_config("[data]\npath = d\nticker = X\n");
        let overrides = SimulationOverrides {
            start: Some("2024-05-01".into()),
            end: Some("2024-01-01".into()),
            ..Default::default()
        };
        let err = build_simulation_settings(&config, &overrides).unwrap_err();
        assert!(matches!(err, StocksimError::InvalidInput { .. }));
    }

    #[test]
    fn bad_override_date_fails() {
        let config = make_config("[data]\npath = d\nticker = X\n");
        let overrides = SimulationOverrides {
            end: Some("yesterday".into()),
            ..Default::default()
        };
        let err = build_simulation_settings(&config, &overrides).unwrap_err();
        assert!(err.to_string().contains("--end"));
    }

    #[test]
    fn risk_resolution() {
        let config = make_config("[analysis]\nrisk_tolerance = high\n");
        assert_eq!(resolve_risk(None, &config).unwrap(), RiskTolerance::High);
        assert_eq!(resolve_risk(Some("low"), &config).unwrap(), RiskTolerance::Low);
        let empty = make_config("[data]\npath = d\n");
        assert_eq!(resolve_risk(None, &empty).unwrap(), RiskTolerance::Moderate);
        assert!(matches!(
            resolve_risk(Some("yolo"), &empty),
            Err(StocksimError::UnknownRiskTolerance { .. })
        ));
    }
}
