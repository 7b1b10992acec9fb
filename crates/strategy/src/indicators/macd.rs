//! MACD (Moving Average Convergence/Divergence) indicator.
//!
//! MACD line = EMA(fast) − EMA(slow), signal = EMA(line, signal_period),
//! diff = line − signal. EMAs are seeded with the first value.

use super::moving::{ema, ema_of, zip_with, Series};

#[derive(Debug, Clone)]
pub struct MacdIndicator {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

/// The three aligned MACD series.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Series,
    pub signal: Series,
    pub diff: Series,
}

impl Default for MacdIndicator {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

impl MacdIndicator {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(
            fast < slow,
            "MACD fast period must be less than slow period"
        );
        Self { fast, slow, signal }
    }

    /// Compute the series over close prices (oldest first).
    /// The signal line is defined from row `slow + signal - 2`.
    pub fn compute(&self, closes: &[f64]) -> MacdSeries {
        let fast = ema_of(closes, self.fast);
        let slow = ema_of(closes, self.slow);
        let line = zip_with(&fast, &slow, |f, s| f - s);
        let signal = ema(&line, self.signal);
        let diff = zip_with(&line, &signal, |l, s| l - s);
        MacdSeries { line, signal, diff }
    }
}
