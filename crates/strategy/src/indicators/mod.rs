//! Indicator pipeline: bars in, an aligned [`IndicatorFrame`] out.
//!
//! Every indicator is computed over the full bar sequence; afterwards any row
//! where at least one column is undefined (warm-up, or a non-finite value on a
//! degenerate window) is dropped. With the 200-bar SMA in the set, fewer than
//! 200 bars yield an empty frame.

pub mod macd;
pub mod moving;
pub mod oscillators;
pub mod rsi;
pub mod trend;
pub mod volatility;
pub mod volume;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use chrono::{DateTime, Utc};
use tracing::debug;

use common::Bar;

pub use macd::MacdIndicator;
use moving::{ema_of, pct_change, rolling_std, sma, zip_with, Series};

pub const SMA_WINDOWS: [usize; 6] = [10, 20, 30, 50, 100, 200];
pub const EMA_WINDOWS: [usize; 3] = [12, 26, 50];
pub const RSI_WINDOWS: [usize; 3] = [6, 14, 24];
pub const MOMENTUM_WINDOWS: [usize; 2] = [10, 20];
pub const VOLATILITY_WINDOWS: [usize; 2] = [10, 30];

/// Key of one frame column: raw bar fields plus every derived indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
    Sma(usize),
    Ema(usize),
    Macd,
    MacdSignal,
    MacdDiff,
    Rsi(usize),
    BbUpper,
    BbMiddle,
    BbLower,
    BbWidth,
    StochK,
    StochD,
    Adx,
    AdxPos,
    AdxNeg,
    Atr,
    Cci,
    WilliamsR,
    Roc,
    Obv,
    Mfi,
    Vwap,
    IchimokuA,
    IchimokuB,
    VolumeSma20,
    VolumeRatio,
    /// Fractional change over `n` rows (0.05 = +5%).
    Momentum(usize),
    Volatility(usize),
    TrendStrength,
}

impl Column {
    /// The 14-period RSI, referred to simply as "RSI".
    pub const RSI: Column = Column::Rsi(14);
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Open => write!(f, "Open"),
            Column::High => write!(f, "High"),
            Column::Low => write!(f, "Low"),
            Column::Close => write!(f, "Close"),
            Column::Volume => write!(f, "Volume"),
            Column::Sma(n) => write!(f, "SMA_{n}"),
            Column::Ema(n) => write!(f, "EMA_{n}"),
            Column::Macd => write!(f, "MACD"),
            Column::MacdSignal => write!(f, "MACD_signal"),
            Column::MacdDiff => write!(f, "MACD_diff"),
            Column::Rsi(14) => write!(f, "RSI"),
            Column::Rsi(n) => write!(f, "RSI_{n}"),
            Column::BbUpper => write!(f, "BB_upper"),
            Column::BbMiddle => write!(f, "BB_middle"),
            Column::BbLower => write!(f, "BB_lower"),
            Column::BbWidth => write!(f, "BB_width"),
            Column::StochK => write!(f, "Stoch_K"),
            Column::StochD => write!(f, "Stoch_D"),
            Column::Adx => write!(f, "ADX"),
            Column::AdxPos => write!(f, "ADX_pos"),
            Column::AdxNeg => write!(f, "ADX_neg"),
            Column::Atr => write!(f, "ATR"),
            Column::Cci => write!(f, "CCI"),
            Column::WilliamsR => write!(f, "Williams_R"),
            Column::Roc => write!(f, "ROC"),
            Column::Obv => write!(f, "OBV"),
            Column::Mfi => write!(f, "MFI"),
            Column::Vwap => write!(f, "VWAP"),
            Column::IchimokuA => write!(f, "Ichimoku_a"),
            Column::IchimokuB => write!(f, "Ichimoku_b"),
            Column::VolumeSma20 => write!(f, "Volume_SMA_20"),
            Column::VolumeRatio => write!(f, "Volume_ratio"),
            Column::Momentum(n) => write!(f, "Momentum_{n}"),
            Column::Volatility(n) => write!(f, "Volatility_{n}"),
            Column::TrendStrength => write!(f, "Trend_strength"),
        }
    }
}

/// Named, equally long numeric columns indexed by row.
///
/// Built by [`compute_indicators`], or by hand with [`IndicatorFrame::with_column`]
/// when a strategy needs to be exercised against engineered values.
#[derive(Debug, Clone, Default)]
pub struct IndicatorFrame {
    timestamps: Vec<DateTime<Utc>>,
    columns: BTreeMap<Column, Vec<f64>>,
    len: usize,
}

impl IndicatorFrame {
    /// Empty frame of `len` rows with no columns and no timestamps.
    pub fn with_len(len: usize) -> Self {
        Self {
            len,
            ..Self::default()
        }
    }

    /// Add or replace a column. Panics if its length differs from the frame's.
    pub fn with_column(mut self, column: Column, values: Vec<f64>) -> Self {
        self.insert(column, values);
        self
    }

    pub fn insert(&mut self, column: Column, values: Vec<f64>) {
        assert_eq!(
            values.len(),
            self.len,
            "column {column} has {} rows, frame has {}",
            values.len(),
            self.len
        );
        self.columns.insert(column, values);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn timestamp(&self, index: usize) -> Option<DateTime<Utc>> {
        self.timestamps.get(index).copied()
    }

    pub fn column(&self, column: Column) -> Option<&[f64]> {
        self.columns.get(&column).map(Vec::as_slice)
    }

    /// Value of `column` at `index`, `None` if either is absent.
    pub fn value(&self, column: Column, index: usize) -> Option<f64> {
        self.columns.get(&column)?.get(index).copied()
    }

    /// Sub-slice of a column, `None` if the column is absent or the range out of bounds.
    pub fn window(&self, column: Column, range: Range<usize>) -> Option<&[f64]> {
        self.columns.get(&column)?.get(range)
    }

    /// Column keys in a stable order.
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.keys().copied()
    }

    /// Overwrite a single cell of an engineered frame.
    #[cfg(test)]
    pub(crate) fn set(&mut self, column: Column, index: usize, value: f64) {
        let cells = self
            .columns
            .get_mut(&column)
            .unwrap_or_else(|| panic!("column {column} not in frame"));
        assert!(index < cells.len(), "row {index} outside frame of {}", cells.len());
        cells[index] = value;
    }
}

fn defined(values: &[f64]) -> Series {
    values.iter().copied().map(Some).collect()
}

/// Compute every indicator over `bars` (chronological) and drop undefined rows.
pub fn compute_indicators(bars: &[Bar]) -> IndicatorFrame {
    let open: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let high: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let low: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volume: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    let mut raw: Vec<(Column, Series)> = vec![
        (Column::Open, defined(&open)),
        (Column::High, defined(&high)),
        (Column::Low, defined(&low)),
        (Column::Close, defined(&close)),
        (Column::Volume, defined(&volume)),
    ];

    for n in SMA_WINDOWS {
        raw.push((Column::Sma(n), sma(&close, n)));
    }
    for n in EMA_WINDOWS {
        raw.push((Column::Ema(n), ema_of(&close, n)));
    }

    let macd = MacdIndicator::default().compute(&close);
    raw.push((Column::Macd, macd.line));
    raw.push((Column::MacdSignal, macd.signal));
    raw.push((Column::MacdDiff, macd.diff));

    for n in RSI_WINDOWS {
        raw.push((Column::Rsi(n), rsi::rsi(&close, n)));
    }

    let bb = volatility::bollinger(&close, 20, 2.0);
    raw.push((Column::BbUpper, bb.upper));
    raw.push((Column::BbMiddle, bb.middle));
    raw.push((Column::BbLower, bb.lower));
    raw.push((Column::BbWidth, bb.width));

    let stoch = oscillators::stochastic(&high, &low, &close, 14, 3);
    raw.push((Column::StochK, stoch.k));
    raw.push((Column::StochD, stoch.d));

    let adx = trend::adx(&high, &low, &close, 14);
    raw.push((Column::Adx, adx.adx));
    raw.push((Column::AdxPos, adx.plus_di));
    raw.push((Column::AdxNeg, adx.minus_di));

    raw.push((Column::Atr, volatility::atr(&high, &low, &close, 14)));
    raw.push((Column::Cci, oscillators::cci(&high, &low, &close, 20)));
    raw.push((Column::WilliamsR, oscillators::williams_r(&high, &low, &close, 14)));
    raw.push((Column::Roc, oscillators::roc(&close, 12)));
    raw.push((Column::Obv, defined(&volume::obv(&close, &volume))));
    raw.push((Column::Mfi, volume::mfi(&high, &low, &close, &volume, 14)));
    raw.push((Column::Vwap, volume::vwap(&high, &low, &close, &volume, 14)));

    let cloud = trend::ichimoku(&high, &low, 9, 26, 52);
    raw.push((Column::IchimokuA, cloud.span_a));
    raw.push((Column::IchimokuB, cloud.span_b));

    let (volume_sma, volume_ratio) = volume::volume_ratio(&volume, 20);
    raw.push((Column::VolumeSma20, volume_sma));
    raw.push((Column::VolumeRatio, volume_ratio));

    for n in MOMENTUM_WINDOWS {
        raw.push((Column::Momentum(n), pct_change(&close, n)));
    }
    for n in VOLATILITY_WINDOWS {
        raw.push((Column::Volatility(n), rolling_std(&close, n)));
    }

    let sma10 = sma(&close, 10);
    let sma50 = sma(&close, 50);
    let strength = zip_with(&sma10, &sma50, |fast, slow| (fast - slow).abs() / slow);
    raw.push((Column::TrendStrength, strength));

    let keep: Vec<usize> = (0..bars.len())
        .filter(|&i| {
            raw.iter()
                .all(|(_, s)| s[i].is_some_and(f64::is_finite))
        })
        .collect();

    let mut frame = IndicatorFrame::with_len(keep.len());
    frame.timestamps = keep.iter().map(|&i| bars[i].timestamp).collect();
    for (column, series) in raw {
        let values = keep.iter().filter_map(|&i| series[i]).collect();
        frame.insert(column, values);
    }

    debug!(
        bars = bars.len(),
        rows = frame.len(),
        columns = frame.columns.len(),
        "Indicator frame computed"
    );
    frame
}
