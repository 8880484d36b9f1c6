//! Domain error types.

/// A required indicator value is absent at the evaluation bar.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("indicator {indicator} unavailable: {reason}")]
pub struct IndicatorUnavailable {
    pub indicator: String,
    pub reason: String,
}

/// Top-level error type for stocksim.
#[derive(Debug, thiserror::Error)]
pub enum StocksimError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("unknown strategy '{name}' (expected buy_and_hold, moving_average_crossover or rsi)")]
    UnknownStrategy { name: String },

    #[error(transparent)]
    IndicatorUnavailable(#[from] IndicatorUnavailable),

    #[error("unknown risk tolerance '{name}' (expected low, moderate or high)")]
    UnknownRiskTolerance { name: String },

    #[error("unknown period '{name}' (expected 1mo, 3mo, 6mo, 1y, 2y, 5y or max)")]
    UnknownPeriod { name: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price data error: {reason}")]
    Data { reason: String },

    #[error("no price data for {ticker}")]
    NoData { ticker: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StocksimError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        StocksimError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<&StocksimError> for std::process::ExitCode {
    fn from(err: &StocksimError) -> Self {
        let code: u8 = match err {
            StocksimError::Io(_) | StocksimError::Report { .. } => 1,
            StocksimError::ConfigParse { .. }
            | StocksimError::ConfigMissing { .. }
            | StocksimError::ConfigInvalid { .. } => 2,
            StocksimError::Data { .. } => 3,
            StocksimError::UnknownStrategy { .. }
            | StocksimError::UnknownRiskTolerance { .. }
            | StocksimError::UnknownPeriod { .. } => 4,
            StocksimError::NoData { .. }
            | StocksimError::InvalidInput { .. }
            | StocksimError::IndicatorUnavailable(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
