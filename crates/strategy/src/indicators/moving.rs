//! Rolling-window and exponential smoothing primitives.
//!
//! Every function returns a series aligned with its input where `None` marks
//! a row with insufficient history (or an undefined value).

pub type Series = Vec<Option<f64>>;

/// Apply `f` to each full trailing window of `window` values.
pub fn rolling<F>(values: &[f64], window: usize, f: F) -> Series
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| (i + 1 >= window).then(|| f(&values[i + 1 - window..=i])))
        .collect()
}

/// Like [`rolling`] over a series with gaps; a window containing a gap is undefined.
pub fn rolling_opt<F>(values: &[Option<f64>], window: usize, f: F) -> Series
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut buf = Vec::with_capacity(window);
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            buf.clear();
            for v in &values[i + 1 - window..=i] {
                buf.push((*v)?);
            }
            Some(f(&buf))
        })
        .collect()
}

pub fn mean(w: &[f64]) -> f64 {
    w.iter().sum::<f64>() / w.len() as f64
}

pub fn max(w: &[f64]) -> f64 {
    w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub fn min(w: &[f64]) -> f64 {
    w.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Standard deviation with `ddof` delta degrees of freedom (0 = population).
pub fn std_dev(w: &[f64], ddof: usize) -> f64 {
    let n = w.len();
    if n <= ddof {
        return f64::NAN;
    }
    let m = mean(w);
    let ss: f64 = w.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (n - ddof) as f64).sqrt()
}

pub fn sma(values: &[f64], window: usize) -> Series {
    rolling(values, window, mean)
}

/// Rolling sample standard deviation (ddof = 1).
pub fn rolling_std(values: &[f64], window: usize) -> Series {
    rolling(values, window, |w| std_dev(w, 1))
}

/// Exponentially weighted mean without bias adjustment: seeded with the first
/// defined value, then `prev + alpha * (x - prev)`. Rows before `min_periods`
/// defined observations are `None`. Gaps are skipped.
pub fn ewm(values: &[Option<f64>], alpha: f64, min_periods: usize) -> Series {
    let mut prev: Option<f64> = None;
    let mut seen = 0usize;
    values
        .iter()
        .map(|v| {
            let x = (*v)?;
            let next = match prev {
                None => x,
                Some(p) => alpha * x + (1.0 - alpha) * p,
            };
            prev = Some(next);
            seen += 1;
            (seen >= min_periods).then_some(next)
        })
        .collect()
}

/// EMA with smoothing `2 / (span + 1)`, defined once `span` values are seen.
pub fn ema(values: &[Option<f64>], span: usize) -> Series {
    ewm(values, 2.0 / (span as f64 + 1.0), span)
}

pub fn ema_of(values: &[f64], span: usize) -> Series {
    let wrapped: Series = values.iter().copied().map(Some).collect();
    ema(&wrapped, span)
}

/// Fractional change over `periods` rows: `x[i] / x[i - periods] - 1`.
/// A 5% rise is `0.05`, not `5.0`.
pub fn pct_change(values: &[f64], periods: usize) -> Series {
    (0..values.len())
        .map(|i| {
            let base = *values.get(i.checked_sub(periods)?)?;
            (periods > 0 && base != 0.0).then(|| values[i] / base - 1.0)
        })
        .collect()
}

/// Element-wise combination of two aligned series.
pub fn zip_with<F>(a: &[Option<f64>], b: &[Option<f64>], f: F) -> Series
where
    F: Fn(f64, f64) -> f64,
{
    a.iter()
        .zip(b)
        .map(|(x, y)| Some(f((*x)?, (*y)?)))
        .collect()
}

/// Quotient that is undefined when the divisor is zero.
pub fn checked_div(num: f64, den: f64) -> Option<f64> {
    (den != 0.0).then(|| num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_is_undefined_until_window_fills() {
        let s = sma(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(s[0], None);
        assert_eq!(s[1], None);
        assert_eq!(s[2], Some(2.0));
        assert_eq!(s[3], Some(3.0));
    }

    #[test]
    fn ema_seeds_with_first_value() {
        let s = ema_of(&[10.0, 20.0, 30.0, 40.0], 3);
        // alpha = 0.5: 10, 15, 22.5, 31.25
        assert_eq!(s[0], None);
        assert_eq!(s[1], None);
        assert!((s[2].unwrap() - 22.5).abs() < 1e-12);
        assert!((s[3].unwrap() - 31.25).abs() < 1e-12);
    }

    #[test]
    fn ewm_skips_leading_gaps() {
        let s = ewm(&[None, None, Some(4.0), Some(8.0)], 0.5, 2);
        assert_eq!(s[2], None);
        assert_eq!(s[3], Some(6.0));
    }

    #[test]
    fn rolling_opt_rejects_windows_with_gaps() {
        let s = rolling_opt(&[None, Some(1.0), Some(3.0)], 2, mean);
        assert_eq!(s, vec![None, None, Some(2.0)]);
    }

    #[test]
    fn std_dev_population_and_sample() {
        let w = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&w, 0) - 2.0).abs() < 1e-12);
        assert!((std_dev(&w, 1) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn pct_change_guards_zero_base() {
        let s = pct_change(&[0.0, 1.0, 2.0], 1);
        assert_eq!(s, vec![None, None, Some(1.0)]);
    }
}
