//! RSI (Relative Strength Index).
//!
//! Gains and losses are smoothed with Wilder's factor `1 / period`, seeded
//! with the first close-to-close change. `RSI = 100 - 100 / (1 + gain / loss)`,
//! and 100 when the average loss is zero. Defined from row `period` onward.

use super::moving::{ewm, Series};

pub fn rsi(closes: &[f64], period: usize) -> Series {
    assert!(period >= 2, "RSI period must be >= 2");

    let mut gains: Series = Vec::with_capacity(closes.len());
    let mut losses: Series = Vec::with_capacity(closes.len());
    gains.push(None);
    losses.push(None);
    for w in closes.windows(2) {
        let change = w[1] - w[0];
        gains.push(Some(change.max(0.0)));
        losses.push(Some((-change).max(0.0)));
    }
    gains.truncate(closes.len());
    losses.truncate(closes.len());

    let alpha = 1.0 / period as f64;
    let avg_gain = ewm(&gains, alpha, period);
    let avg_loss = ewm(&losses, alpha, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| {
            let (g, l) = ((*g)?, (*l)?);
            if l == 0.0 {
                Some(100.0)
            } else {
                Some(100.0 - 100.0 / (1.0 + g / l))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_returns_none_when_insufficient_data() {
        // Need at least period+1 = 15 values
        let prices = vec![100.0; 14];
        assert!(rsi(&prices, 14).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_first_value_at_period() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = rsi(&prices, 14);
        assert!(series[13].is_none());
        assert!(series[14].is_some());
    }

    #[test]
    fn rsi_all_gains_returns_100() {
        let prices = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        let value = rsi(&prices, 3)[4].unwrap();
        assert!((value - 100.0).abs() < 1e-6, "Expected ~100, got {value}");
    }

    #[test]
    fn rsi_all_losses_returns_0() {
        let prices = vec![14.0, 13.0, 12.0, 11.0, 10.0];
        let value = rsi(&prices, 3)[4].unwrap();
        assert!((value - 0.0).abs() < 1e-6, "Expected ~0, got {value}");
    }

    #[test]
    fn rsi_wilder_smoothing_by_hand() {
        // changes +2, -1, +1 with alpha 1/2
        // avg_gain: 2, 1, 1 ; avg_loss: 0, 0.5, 0.25
        let prices = vec![10.0, 12.0, 11.0, 12.0];
        let value = rsi(&prices, 2)[3].unwrap();
        let expected = 100.0 - 100.0 / (1.0 + 1.0 / 0.25);
        assert!((value - expected).abs() < 1e-9, "got {value}, expected {expected}");
    }

    #[test]
    fn rsi_stays_in_range() {
        let prices = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.15, 43.61, 44.33, 44.83, 45.10,
            45.15, 44.34, 44.09,
        ];
        let v = rsi(&prices, 14)[14].unwrap();
        assert!((0.0..=100.0).contains(&v), "RSI out of range: {v}");
    }
}
