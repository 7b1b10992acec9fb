//! Shared test inputs.

use chrono::{Duration, TimeZone, Utc};

use common::Bar;

use crate::indicators::{Column, IndicatorFrame};

/// A frame on which no strategy finds a setup at any row: flat prices at 100
/// inside a 95..105 range, mid-scale oscillators, and an ATR of 4.
pub fn neutral_frame(len: usize) -> IndicatorFrame {
    let flat = |v: f64| vec![v; len];
    let mut frame = IndicatorFrame::with_len(len)
        .with_column(Column::Open, flat(100.0))
        .with_column(Column::High, flat(105.0))
        .with_column(Column::Low, flat(95.0))
        .with_column(Column::Close, flat(100.0))
        .with_column(Column::Volume, flat(1_000.0))
        .with_column(Column::Macd, flat(0.0))
        .with_column(Column::MacdSignal, flat(0.0))
        .with_column(Column::MacdDiff, flat(0.0))
        .with_column(Column::BbUpper, flat(110.0))
        .with_column(Column::BbMiddle, flat(100.0))
        .with_column(Column::BbLower, flat(90.0))
        .with_column(Column::BbWidth, flat(20.0))
        .with_column(Column::StochK, flat(50.0))
        .with_column(Column::StochD, flat(50.0))
        .with_column(Column::Adx, flat(20.0))
        .with_column(Column::AdxPos, flat(20.0))
        .with_column(Column::AdxNeg, flat(20.0))
        .with_column(Column::Atr, flat(4.0))
        .with_column(Column::Cci, flat(0.0))
        .with_column(Column::WilliamsR, flat(-50.0))
        .with_column(Column::Roc, flat(0.0))
        .with_column(Column::Obv, flat(1_000.0))
        .with_column(Column::Mfi, flat(50.0))
        .with_column(Column::Vwap, flat(100.0))
        .with_column(Column::IchimokuA, flat(100.0))
        .with_column(Column::IchimokuB, flat(100.0))
        .with_column(Column::VolumeSma20, flat(1_000.0))
        .with_column(Column::VolumeRatio, flat(1.0))
        .with_column(Column::TrendStrength, flat(0.0));
    for n in [10, 20, 30, 50, 100, 200] {
        frame.insert(Column::Sma(n), flat(100.0));
    }
    for n in [12, 26, 50] {
        frame.insert(Column::Ema(n), flat(100.0));
    }
    for n in [6, 14, 24] {
        frame.insert(Column::Rsi(n), flat(50.0));
    }
    frame
}

/// Deterministic bars with a gentle drift, a slow sine swing and non-flat candles.
pub fn wavy_bars(n: usize) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + t * 0.05 + (t / 7.0).sin() * 4.0;
            let open = close - (t / 3.0).cos();
            Bar {
                timestamp: start + Duration::hours(i as i64),
                open,
                high: close.max(open) + 0.8,
                low: close.min(open) - 0.8,
                close,
                volume: 1_000.0 + (t / 5.0).sin().abs() * 500.0,
            }
        })
        .collect()
}
