//! Bollinger Bands.
//!
//! Middle = SMA(n), Upper/Lower = Middle ± k * population stddev over n closes.
//! Warmup: first (n-1) bars are absent.

use super::sma::calculate_sma;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerColumns {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, stddev_mult: f64) -> BollingerColumns {
    let middle = calculate_sma(closes, period);
    let mut upper = Vec::with_capacity(closes.len());
    let mut lower = Vec::with_capacity(closes.len());

    for (i, mid) in middle.iter().enumerate() {
        match mid {
            Some(mean) => {
                let window = &closes[i + 1 - period..=i];
                let variance =
                    window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / period as f64;
                let band = stddev_mult * variance.sqrt();
                upper.push(Some(mean + band));
                lower.push(Some(mean - band));
            }
            None => {
                upper.push(None);
                lower.push(None);
            }
        }
    }

    BollingerColumns {
        upper,
        middle,
        lower,
    }
}
