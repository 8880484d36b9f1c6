//! Typed key lookup over a sectioned configuration source.

use crate::domain::error::StocksimError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Numeric value, or `default` when the key is absent. A present value
    /// that does not parse is `ConfigInvalid`.
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, StocksimError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw.parse::<f64>().map_err(|_| StocksimError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("expected a number, got '{raw}'"),
            }),
        }
    }
}
