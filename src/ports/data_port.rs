//! Price history source.

use crate::domain::error::StocksimError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Full daily history for `ticker`, sorted by date.
    ///
    /// A ticker the source does not know is `StocksimError::NoData`.
    fn fetch_prices(&self, ticker: &str) -> Result<Vec<PriceBar>, StocksimError>;

    fn list_tickers(&self) -> Result<Vec<String>, StocksimError>;

    /// First date, last date and bar count, or `None` for an empty history.
    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StocksimError> {
        let bars = self.fetch_prices(ticker)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
