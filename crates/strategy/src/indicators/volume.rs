//! Volume-driven indicators.

use super::moving::{checked_div, sma, Series};
use super::oscillators::typical_price;

/// On-balance volume: running sum adding volume on non-down closes and
/// subtracting it on down closes. The first bar counts as up.
pub fn obv(close: &[f64], volume: &[f64]) -> Vec<f64> {
    let mut total = 0.0;
    (0..close.len())
        .map(|i| {
            let down = i > 0 && close[i] < close[i - 1];
            total += if down { -volume[i] } else { volume[i] };
            total
        })
        .collect()
}

/// Money flow index: volume-weighted RSI on the typical price.
/// Reads 100 when the window holds no negative flow.
pub fn mfi(high: &[f64], low: &[f64], close: &[f64], volume: &[f64], period: usize) -> Series {
    let tp = typical_price(high, low, close);
    let flow: Vec<f64> = (0..tp.len())
        .map(|i| {
            let raw = tp[i] * volume[i];
            match i.checked_sub(1).map(|p| tp[i].partial_cmp(&tp[p])) {
                Some(Some(std::cmp::Ordering::Greater)) => raw,
                Some(Some(std::cmp::Ordering::Less)) => -raw,
                _ => 0.0,
            }
        })
        .collect();

    (0..flow.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let w = &flow[i + 1 - period..=i];
            let positive: f64 = w.iter().filter(|f| **f >= 0.0).sum();
            let negative: f64 = w.iter().filter(|f| **f < 0.0).map(|f| -f).sum();
            if negative == 0.0 {
                return (positive > 0.0).then_some(100.0);
            }
            Some(100.0 - 100.0 / (1.0 + positive / negative))
        })
        .collect()
}

/// Rolling volume-weighted average of the typical price.
pub fn vwap(high: &[f64], low: &[f64], close: &[f64], volume: &[f64], period: usize) -> Series {
    let tp = typical_price(high, low, close);
    (0..tp.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let range = i + 1 - period..=i;
            let pv: f64 = range.clone().map(|j| tp[j] * volume[j]).sum();
            let v: f64 = volume[range].iter().sum();
            checked_div(pv, v)
        })
        .collect()
}

/// Volume SMA and the ratio of each bar's volume to it.
pub fn volume_ratio(volume: &[f64], period: usize) -> (Series, Series) {
    let avg = sma(volume, period);
    let ratio = volume
        .iter()
        .zip(&avg)
        .map(|(v, a)| checked_div(*v, (*a)?))
        .collect();
    (avg, ratio)
}
