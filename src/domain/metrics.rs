//! Return metrics for a completed simulation.

pub const DAYS_PER_YEAR: f64 = 365.25;

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage gain of `final_value` over `initial_investment`.
pub fn return_pct(initial_investment: f64, final_value: f64) -> f64 {
    (final_value / initial_investment - 1.0) * 100.0
}

/// Percentage move from the first to the last close.
pub fn buy_hold_return(first_close: f64, last_close: f64) -> f64 {
    (last_close / first_close - 1.0) * 100.0
}

/// Compound annual growth in percent, rounded to two decimals.
///
/// Returns exactly `0.0` when `elapsed_days` is not strictly positive.
pub fn annualized_return(initial_investment: f64, final_value: f64, elapsed_days: f64) -> f64 {
    if elapsed_days <= 0.0 {
        return 0.0;
    }
    let years = elapsed_days / DAYS_PER_YEAR;
    let growth = (final_value / initial_investment).powf(1.0 / years) - 1.0;
    round2(growth * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn round2_behaviour() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.236), 1.24);
        assert_eq!(round2(-1.236), -1.24);
        assert_eq!(round2(20.0), 20.0);
    }

    #[test]
    fn return_pct_positive_and_negative() {
        assert_relative_eq!(return_pct(10_000.0, 12_000.0), 20.0, epsilon = 1e-9);
        assert_relative_eq!(return_pct(10_000.0, 9_000.0), -10.0, epsilon = 1e-9);
        assert_eq!(return_pct(10_000.0, 10_000.0), 0.0);
    }

    #[test]
    fn buy_hold_return_uses_endpoints() {
        assert_relative_eq!(buy_hold_return(100.0, 150.0), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn annualized_return_one_year() {
        assert_eq!(annualized_return(10_000.0, 12_000.0, 365.25), 20.00);
    }

    #[test]
    fn annualized_return_two_years() {
        // sqrt(1.21) - 1 = 10%
        assert_eq!(annualized_return(10_000.0, 12_100.0, 730.5), 10.00);
    }

    #[test]
    fn annualized_return_zero_span_is_exact_zero() {
        assert_eq!(annualized_return(10_000.0, 12_000.0, 0.0), 0.0);
        assert_eq!(annualized_return(10_000.0, 12_000.0, -3.0), 0.0);
    }
}
