//! Bounded and unbounded oscillators over a high/low/close window.

use super::moving::{checked_div, max, mean, min, rolling, rolling_opt, Series};

#[derive(Debug, Clone)]
pub struct StochasticSeries {
    pub k: Series,
    pub d: Series,
}

/// %K = 100 · (close − lowest low) / (highest high − lowest low); %D = SMA(%K, smooth).
pub fn stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
    smooth: usize,
) -> StochasticSeries {
    let hh = rolling(high, period, max);
    let ll = rolling(low, period, min);
    let k: Series = (0..close.len())
        .map(|i| checked_div(close[i] - ll[i]?, hh[i]? - ll[i]?).map(|r| 100.0 * r))
        .collect();
    let d = rolling_opt(&k, smooth, mean);
    StochasticSeries { k, d }
}

/// Williams %R in [-100, 0].
pub fn williams_r(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Series {
    let hh = rolling(high, period, max);
    let ll = rolling(low, period, min);
    (0..close.len())
        .map(|i| checked_div(hh[i]? - close[i], hh[i]? - ll[i]?).map(|r| -100.0 * r))
        .collect()
}

/// Commodity Channel Index over the typical price with Lambert's 0.015 constant.
pub fn cci(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Series {
    const CONSTANT: f64 = 0.015;
    let tp = typical_price(high, low, close);
    rolling(&tp, period, |w| {
        let m = mean(w);
        let mad = w.iter().map(|x| (x - m).abs()).sum::<f64>() / w.len() as f64;
        // 0/0 on a flat window; the frame drops non-finite rows
        (w[w.len() - 1] - m) / (CONSTANT * mad)
    })
}

/// Rate of change in percent over `period` rows.
pub fn roc(close: &[f64], period: usize) -> Series {
    (0..close.len())
        .map(|i| {
            let base = close[i.checked_sub(period)?];
            checked_div(close[i] - base, base).map(|r| r * 100.0)
        })
        .collect()
}

pub fn typical_price(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..close.len())
        .map(|i| (high[i] + low[i] + close[i]) / 3.0)
        .collect()
}
