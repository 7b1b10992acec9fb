//! The ten ensemble strategies.
//!
//! Each one reads a handful of frame columns at a single row and, when its
//! entry rule holds, proposes a bracket: a stop-loss on the losing side and a
//! take-profit on the winning side of the entry price.

use serde::{Deserialize, Serialize};

use common::Signal;

use crate::indicators::moving::{max, mean, min};
use crate::indicators::{Column, IndicatorFrame};
use crate::Strategy;

/// Closed set of available strategies, as named in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Scalping,
    SwingTrading,
    TrendFollowing,
    MeanReversion,
    Breakout,
    VolumeAnalysis,
    Momentum,
    Ichimoku,
    PriceAction,
    SupportResistance,
}

impl StrategyKind {
    /// Canonical evaluation order.
    pub const ALL: [StrategyKind; 10] = [
        StrategyKind::Scalping,
        StrategyKind::SwingTrading,
        StrategyKind::TrendFollowing,
        StrategyKind::MeanReversion,
        StrategyKind::Breakout,
        StrategyKind::VolumeAnalysis,
        StrategyKind::Momentum,
        StrategyKind::Ichimoku,
        StrategyKind::PriceAction,
        StrategyKind::SupportResistance,
    ];

    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Scalping => Box::new(Scalping),
            StrategyKind::SwingTrading => Box::new(SwingTrading),
            StrategyKind::TrendFollowing => Box::new(TrendFollowing),
            StrategyKind::MeanReversion => Box::new(MeanReversion),
            StrategyKind::Breakout => Box::new(Breakout),
            StrategyKind::VolumeAnalysis => Box::new(VolumeAnalysis),
            StrategyKind::Momentum => Box::new(Momentum),
            StrategyKind::Ichimoku => Box::new(Ichimoku),
            StrategyKind::PriceAction => Box::new(PriceAction),
            StrategyKind::SupportResistance => Box::new(SupportResistance),
        }
    }
}

// ─── Brackets ─────────────────────────────────────────────────────────────────

/// Long entry: stop two units below, target three units above.
fn long_bracket(confidence: f64, entry: f64, unit: f64) -> Signal {
    Signal::buy(confidence, entry - 2.0 * unit, entry + 3.0 * unit)
}

/// Short entry: stop two units above, target three units below.
fn short_bracket(confidence: f64, entry: f64, unit: f64) -> Signal {
    Signal::sell(confidence, entry + 2.0 * unit, entry - 3.0 * unit)
}

/// The `lookback` rows strictly before `index`.
fn trailing(frame: &IndicatorFrame, column: Column, index: usize, lookback: usize) -> Option<&[f64]> {
    frame.window(column, index.checked_sub(lookback)?..index)
}

// ─── Strategies ───────────────────────────────────────────────────────────────

/// Fast reversal on a short RSI extreme with a volume spike; half-ATR brackets.
pub struct Scalping;

impl Strategy for Scalping {
    fn name(&self) -> &str {
        "Scalping"
    }

    fn weight(&self) -> f64 {
        1.20
    }

    fn min_index(&self) -> usize {
        20
    }

    fn setup(&self, frame: &IndicatorFrame, i: usize) -> Option<Signal> {
        const CONFIDENCE: f64 = 0.90;
        let rsi = frame.value(Column::Rsi(6), i)?;
        let close = frame.value(Column::Close, i)?;
        let ema = frame.value(Column::Ema(12), i)?;
        let volume_ratio = frame.value(Column::VolumeRatio, i)?;
        let unit = frame.value(Column::Atr, i)? * 0.5;

        if rsi < 25.0 && close < ema && volume_ratio > 1.5 {
            Some(long_bracket(CONFIDENCE, close, unit))
        } else if rsi > 75.0 && close > ema && volume_ratio > 1.5 {
            Some(short_bracket(CONFIDENCE, close, unit))
        } else {
            None
        }
    }
}

/// Pullback within the medium-term trend, confirmed by MACD.
pub struct SwingTrading;

impl Strategy for SwingTrading {
    fn name(&self) -> &str {
        "Swing Trading"
    }

    fn weight(&self) -> f64 {
        1.00
    }

    fn min_index(&self) -> usize {
        50
    }

    fn setup(&self, frame: &IndicatorFrame, i: usize) -> Option<Signal> {
        const CONFIDENCE: f64 = 0.85;
        let close = frame.value(Column::Close, i)?;
        let sma50 = frame.value(Column::Sma(50), i)?;
        let rsi = frame.value(Column::RSI, i)?;
        let macd = frame.value(Column::Macd, i)?;
        let signal = frame.value(Column::MacdSignal, i)?;
        let atr = frame.value(Column::Atr, i)?;

        if close > sma50 && rsi < 40.0 && macd > signal {
            Some(long_bracket(CONFIDENCE, close, atr))
        } else if close < sma50 && rsi > 60.0 && macd < signal {
            Some(short_bracket(CONFIDENCE, close, atr))
        } else {
            None
        }
    }
}

/// Golden/death-cross regime with a strong ADX; 1.5 ATR brackets.
pub struct TrendFollowing;

impl Strategy for TrendFollowing {
    fn name(&self) -> &str {
        "Trend Following"
    }

    fn weight(&self) -> f64 {
        1.10
    }

    fn min_index(&self) -> usize {
        100
    }

    fn setup(&self, frame: &IndicatorFrame, i: usize) -> Option<Signal> {
        const CONFIDENCE: f64 = 0.88;
        let close = frame.value(Column::Close, i)?;
        let sma50 = frame.value(Column::Sma(50), i)?;
        let sma200 = frame.value(Column::Sma(200), i)?;
        let adx = frame.value(Column::Adx, i)?;
        let unit = frame.value(Column::Atr, i)? * 1.5;

        if sma50 > sma200 && adx > 25.0 && close > sma50 {
            Some(long_bracket(CONFIDENCE, close, unit))
        } else if sma50 < sma200 && adx > 25.0 && close < sma50 {
            Some(short_bracket(CONFIDENCE, close, unit))
        } else {
            None
        }
    }
}

/// Fade a close outside the Bollinger bands; target is the middle band.
pub struct MeanReversion;

impl Strategy for MeanReversion {
    fn name(&self) -> &str {
        "Mean Reversion"
    }

    fn weight(&self) -> f64 {
        0.90
    }

    fn min_index(&self) -> usize {
        50
    }

    fn setup(&self, frame: &IndicatorFrame, i: usize) -> Option<Signal> {
        const CONFIDENCE: f64 = 0.87;
        let close = frame.value(Column::Close, i)?;
        let upper = frame.value(Column::BbUpper, i)?;
        let middle = frame.value(Column::BbMiddle, i)?;
        let lower = frame.value(Column::BbLower, i)?;
        let rsi = frame.value(Column::RSI, i)?;
        let atr = frame.value(Column::Atr, i)?;

        if close <= lower && rsi < 30.0 {
            Some(Signal::buy(CONFIDENCE, close - atr, middle))
        } else if close >= upper && rsi > 70.0 {
            Some(Signal::sell(CONFIDENCE, close + atr, middle))
        } else {
            None
        }
    }
}

/// Close through the prior 20-bar range on double volume. The stop sits one
/// ATR back inside the broken level; the target projects twice the breakout.
pub struct Breakout;

impl Strategy for Breakout {
    fn name(&self) -> &str {
        "Breakout"
    }

    fn weight(&self) -> f64 {
        1.15
    }

    fn min_index(&self) -> usize {
        20
    }

    fn setup(&self, frame: &IndicatorFrame, i: usize) -> Option<Signal> {
        const CONFIDENCE: f64 = 0.92;
        let close = frame.value(Column::Close, i)?;
        let high20 = max(trailing(frame, Column::High, i, 20)?);
        let low20 = min(trailing(frame, Column::Low, i, 20)?);
        let volume_ratio = frame.value(Column::VolumeRatio, i)?;
        let atr = frame.value(Column::Atr, i)?;

        if close > high20 && volume_ratio > 2.0 {
            Some(Signal::buy(
                CONFIDENCE,
                high20 - atr,
                close + (close - high20) * 2.0,
            ))
        } else if close < low20 && volume_ratio > 2.0 {
            Some(Signal::sell(
                CONFIDENCE,
                low20 + atr,
                close - (low20 - close) * 2.0,
            ))
        } else {
            None
        }
    }
}

/// OBV against its trailing 20-bar mean, with the money-flow index at an extreme.
pub struct VolumeAnalysis;

impl Strategy for VolumeAnalysis {
    fn name(&self) -> &str {
        "Volume Analysis"
    }

    fn weight(&self) -> f64 {
        1.00
    }

    fn min_index(&self) -> usize {
        20
    }

    fn setup(&self, frame: &IndicatorFrame, i: usize) -> Option<Signal> {
        const CONFIDENCE: f64 = 0.83;
        let obv = frame.value(Column::Obv, i)?;
        let obv_sma = mean(trailing(frame, Column::Obv, i, 20)?);
        let mfi = frame.value(Column::Mfi, i)?;
        let close = frame.value(Column::Close, i)?;
        let prev_close = frame.value(Column::Close, i - 1)?;
        let atr = frame.value(Column::Atr, i)?;

        if obv > obv_sma && close > prev_close && mfi < 30.0 {
            Some(long_bracket(CONFIDENCE, close, atr))
        } else if obv < obv_sma && close < prev_close && mfi > 70.0 {
            Some(short_bracket(CONFIDENCE, close, atr))
        } else {
            None
        }
    }
}

pub struct Momentum;

impl Strategy for Momentum {
    fn name(&self) -> &str {
        "Momentum"
    }

    fn weight(&self) -> f64 {
        1.05
    }

    fn min_index(&self) -> usize {
        50
    }

    fn setup(&self, frame: &IndicatorFrame, i: usize) -> Option<Signal> {
        const CONFIDENCE: f64 = 0.86;
        let rsi = frame.value(Column::RSI, i)?;
        let roc = frame.value(Column::Roc, i)?;
        let adx = frame.value(Column::Adx, i)?;
        let close = frame.value(Column::Close, i)?;
        let atr = frame.value(Column::Atr, i)?;

        if rsi > 50.0 && roc > 2.0 && adx > 25.0 {
            Some(long_bracket(CONFIDENCE, close, atr))
        } else if rsi < 50.0 && roc < -2.0 && adx > 25.0 {
            Some(short_bracket(CONFIDENCE, close, atr))
        } else {
            None
        }
    }
}

/// Close above or below the whole cloud.
pub struct Ichimoku;

impl Strategy for Ichimoku {
    fn name(&self) -> &str {
        "Ichimoku"
    }

    fn weight(&self) -> f64 {
        0.95
    }

    fn min_index(&self) -> usize {
        52
    }

    fn setup(&self, frame: &IndicatorFrame, i: usize) -> Option<Signal> {
        const CONFIDENCE: f64 = 0.80;
        let close = frame.value(Column::Close, i)?;
        let span_a = frame.value(Column::IchimokuA, i)?;
        let span_b = frame.value(Column::IchimokuB, i)?;
        let atr = frame.value(Column::Atr, i)?;

        if close > span_a.max(span_b) {
            Some(long_bracket(CONFIDENCE, close, atr))
        } else if close < span_a.min(span_b) {
            Some(short_bracket(CONFIDENCE, close, atr))
        } else {
            None
        }
    }
}

/// A marubozu-like candle: body more than twice both shadows combined.
pub struct PriceAction;

impl Strategy for PriceAction {
    fn name(&self) -> &str {
        "Price Action"
    }

    fn weight(&self) -> f64 {
        1.08
    }

    fn min_index(&self) -> usize {
        10
    }

    fn setup(&self, frame: &IndicatorFrame, i: usize) -> Option<Signal> {
        const CONFIDENCE: f64 = 0.84;
        let open = frame.value(Column::Open, i)?;
        let close = frame.value(Column::Close, i)?;
        let high = frame.value(Column::High, i)?;
        let low = frame.value(Column::Low, i)?;
        let atr = frame.value(Column::Atr, i)?;

        let body = (close - open).abs();
        let upper_shadow = high - open.max(close);
        let lower_shadow = open.min(close) - low;
        let strong = body > (upper_shadow + lower_shadow) * 2.0;

        if close > open && strong {
            Some(long_bracket(CONFIDENCE, close, atr))
        } else if close < open && strong {
            Some(short_bracket(CONFIDENCE, close, atr))
        } else {
            None
        }
    }
}

/// Close within 1% of the prior 50-bar low (support) or high (resistance).
/// The target is half the range away from the close.
pub struct SupportResistance;

impl Strategy for SupportResistance {
    fn name(&self) -> &str {
        "Support/Resistance"
    }

    fn weight(&self) -> f64 {
        1.00
    }

    fn min_index(&self) -> usize {
        50
    }

    fn setup(&self, frame: &IndicatorFrame, i: usize) -> Option<Signal> {
        const CONFIDENCE: f64 = 0.82;
        const PROXIMITY: f64 = 0.01;
        let close = frame.value(Column::Close, i)?;
        let high50 = max(trailing(frame, Column::High, i, 50)?);
        let low50 = min(trailing(frame, Column::Low, i, 50)?);
        let atr = frame.value(Column::Atr, i)?;
        if low50 <= 0.0 || high50 <= 0.0 {
            return None;
        }
        let half_range = (high50 - low50) * 0.5;

        if (close - low50).abs() / low50 < PROXIMITY {
            Some(Signal::buy(CONFIDENCE, low50 - atr, close + half_range))
        } else if (close - high50).abs() / high50 < PROXIMITY {
            Some(Signal::sell(CONFIDENCE, high50 + atr, close - half_range))
        } else {
            None
        }
    }
}
