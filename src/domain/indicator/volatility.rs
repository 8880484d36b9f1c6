//! Annualized close-to-close volatility.
//!
//! r[i] = C[i] / C[i-1] - 1
//! VOL(n)[i] = sample stddev(r[i-n+1..=i]) * sqrt(252)
//! Warmup: first n bars are absent (need n returns).

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub fn calculate_volatility(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 || closes.len() <= window {
        return vec![None; closes.len()];
    }

    let returns: Vec<f64> = closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
    let mut values = vec![None; window];

    for end in window..=returns.len() {
        let slice = &returns[end - window..end];
        values.push(Some(sample_stddev(slice) * TRADING_DAYS_PER_YEAR.sqrt()));
    }

    values
}

/// Sample (n-1) standard deviation.
pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
