//! Directional indicators: ADX with ±DI, and the Ichimoku leading spans.

use super::moving::{max, min, rolling, Series};
use super::volatility::true_range;

#[derive(Debug, Clone)]
pub struct AdxSeries {
    pub adx: Series,
    pub plus_di: Series,
    pub minus_di: Series,
}

/// Wilder's ADX. Directional movement and true range are summed over the
/// first `period` bars and then smoothed with `s - s / period + x`; ADX
/// starts as the mean of the first `period` DX values and is defined from
/// row `2 · period - 1`.
pub fn adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> AdxSeries {
    let n = close.len();
    let mut out = AdxSeries {
        adx: vec![None; n],
        plus_di: vec![None; n],
        minus_di: vec![None; n],
    };
    if period == 0 || n <= period {
        return out;
    }

    let tr = true_range(high, low, close);
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    for i in 1..n {
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    let p = period as f64;
    let mut s_tr: f64 = tr[1..=period].iter().sum();
    let mut s_plus: f64 = plus_dm[1..=period].iter().sum();
    let mut s_minus: f64 = minus_dm[1..=period].iter().sum();

    let mut dx = vec![None; n];
    for i in period..n {
        if i > period {
            s_tr = s_tr - s_tr / p + tr[i];
            s_plus = s_plus - s_plus / p + plus_dm[i];
            s_minus = s_minus - s_minus / p + minus_dm[i];
        }
        if s_tr == 0.0 {
            continue;
        }
        let pdi = 100.0 * s_plus / s_tr;
        let mdi = 100.0 * s_minus / s_tr;
        out.plus_di[i] = Some(pdi);
        out.minus_di[i] = Some(mdi);
        // no directional movement at all reads as no trend
        dx[i] = Some(if pdi + mdi == 0.0 {
            0.0
        } else {
            100.0 * (pdi - mdi).abs() / (pdi + mdi)
        });
    }

    let first = 2 * period - 1;
    if n <= first {
        return out;
    }
    let seed: Option<Vec<f64>> = dx[period..=first].iter().copied().collect();
    let Some(seed) = seed else {
        return out;
    };
    let mut value = seed.iter().sum::<f64>() / p;
    out.adx[first] = Some(value);
    for i in first + 1..n {
        let Some(d) = dx[i] else {
            break;
        };
        value = (value * (p - 1.0) + d) / p;
        out.adx[i] = Some(value);
    }
    out
}

#[derive(Debug, Clone)]
pub struct IchimokuSeries {
    pub span_a: Series,
    pub span_b: Series,
}

/// Leading spans A and B, unshifted (aligned with the bar they are computed on).
pub fn ichimoku(
    high: &[f64],
    low: &[f64],
    conversion: usize,
    base: usize,
    span_b_period: usize,
) -> IchimokuSeries {
    let midpoint = |period: usize| -> Series {
        let hh = rolling(high, period, max);
        let ll = rolling(low, period, min);
        hh.iter()
            .zip(&ll)
            .map(|(h, l)| Some(((*h)? + (*l)?) / 2.0))
            .collect()
    };
    let conv = midpoint(conversion);
    let base_line = midpoint(base);
    let span_a = conv
        .iter()
        .zip(&base_line)
        .map(|(c, b)| Some(((*c)? + (*b)?) / 2.0))
        .collect();
    IchimokuSeries {
        span_a,
        span_b: midpoint(span_b_period),
    }
}
