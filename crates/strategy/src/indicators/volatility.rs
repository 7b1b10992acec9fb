//! Range and dispersion measures: true range, ATR, Bollinger bands.

use super::moving::{mean, std_dev, Series};

/// True range per bar. The first bar has no previous close and uses `high - low`.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..close.len())
        .map(|i| {
            let hl = high[i] - low[i];
            match i.checked_sub(1).map(|p| close[p]) {
                Some(prev) => hl.max((high[i] - prev).abs()).max((low[i] - prev).abs()),
                None => hl,
            }
        })
        .collect()
}

/// Wilder's average true range: the first value is the mean of the first
/// `period` true ranges, then `atr = (prev * (period - 1) + tr) / period`.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Series {
    let tr = true_range(high, low, close);
    let mut out = vec![None; tr.len()];
    if period == 0 || tr.len() < period {
        return out;
    }
    let mut value = mean(&tr[..period]);
    out[period - 1] = Some(value);
    for i in period..tr.len() {
        value = (value * (period - 1) as f64 + tr[i]) / period as f64;
        out[i] = Some(value);
    }
    out
}

#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
    /// `(upper - lower) / middle * 100`.
    pub width: Series,
}

/// Bands at `middle ± k · σ` where σ is the population deviation of the window.
pub fn bollinger(closes: &[f64], period: usize, k: f64) -> BollingerSeries {
    let bands: Vec<Option<(f64, f64)>> = (0..closes.len())
        .map(|i| {
            (period > 0 && i + 1 >= period).then(|| {
                let w = &closes[i + 1 - period..=i];
                (mean(w), std_dev(w, 0))
            })
        })
        .collect();

    let upper = bands.iter().map(|b| b.map(|(m, sd)| m + k * sd)).collect();
    let middle = bands.iter().map(|b| b.map(|(m, _)| m)).collect();
    let lower = bands.iter().map(|b| b.map(|(m, sd)| m - k * sd)).collect();
    let width = bands
        .iter()
        .map(|b| {
            let (m, sd) = (*b)?;
            (m != 0.0).then(|| 2.0 * k * sd / m * 100.0)
        })
        .collect();

    BollingerSeries {
        upper,
        middle,
        lower,
        width,
    }
}
