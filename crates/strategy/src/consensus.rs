//! Weighted vote over a strategy set.
//!
//! Hold votes are discarded. Each side scores `Σ confidence · weight` over its
//! votes, normalized by the total weight of all non-Hold votes. A side wins
//! only if it strictly beats the other side and strictly exceeds the
//! threshold; its exit levels are the mean of the agreeing strategies' levels.
//! Anything else is Hold carrying the larger normalized score as information.

use tracing::debug;

use common::{Decision, Direction, Result};

use crate::config::StrategyFileConfig;
use crate::indicators::IndicatorFrame;
use crate::registry::{StrategySet, Vote};

pub const DEFAULT_THRESHOLD: f64 = 0.70;

pub struct ConsensusEngine {
    strategies: StrategySet,
    threshold: f64,
}

impl ConsensusEngine {
    pub fn new(strategies: StrategySet, threshold: f64) -> Self {
        Self {
            strategies,
            threshold,
        }
    }

    pub fn from_config(file_cfg: &StrategyFileConfig) -> Result<Self> {
        file_cfg.validate()?;
        Ok(Self::new(
            StrategySet::from_config(file_cfg),
            file_cfg.consensus.threshold,
        ))
    }

    pub fn strategies(&self) -> &StrategySet {
        &self.strategies
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Run every strategy at `index` and reduce the votes to one decision.
    pub fn decide(&self, frame: &IndicatorFrame, index: usize) -> Decision {
        let votes = self.strategies.evaluate(frame, index);
        let decision = aggregate(&votes, self.threshold);
        debug!(
            index,
            direction = %decision.direction,
            confidence = decision.confidence,
            contributors = ?decision.contributing_strategy_names,
            "Consensus decision"
        );
        decision
    }
}

impl Default for ConsensusEngine {
    fn default() -> Self {
        Self::new(StrategySet::standard(), DEFAULT_THRESHOLD)
    }
}

fn aggregate(votes: &[Vote<'_>], threshold: f64) -> Decision {
    let active: Vec<&Vote<'_>> = votes.iter().filter(|v| !v.signal.is_hold()).collect();
    let total_weight: f64 = active.iter().map(|v| v.strategy.weight()).sum();
    if active.is_empty() || total_weight <= 0.0 {
        return Decision::hold(0.0);
    }

    let score = |direction: Direction| -> f64 {
        active
            .iter()
            .filter(|v| v.signal.direction == direction)
            .map(|v| v.signal.confidence * v.strategy.weight())
            .sum::<f64>()
            / total_weight
    };
    let buy = score(Direction::Buy);
    let sell = score(Direction::Sell);
    debug!(buy, sell, active = active.len(), total_weight, "Consensus scores");

    if buy > sell && buy > threshold {
        agreed(Direction::Buy, buy, &active)
    } else if sell > buy && sell > threshold {
        agreed(Direction::Sell, sell, &active)
    } else {
        Decision::hold(buy.max(sell))
    }
}

fn agreed(direction: Direction, confidence: f64, active: &[&Vote<'_>]) -> Decision {
    let side: Vec<&Vote<'_>> = active
        .iter()
        .copied()
        .filter(|v| v.signal.direction == direction)
        .collect();

    let average = |levels: Vec<f64>| -> Option<f64> {
        (!levels.is_empty()).then(|| levels.iter().sum::<f64>() / levels.len() as f64)
    };

    Decision {
        direction,
        confidence,
        stop_loss: average(side.iter().filter_map(|v| v.signal.stop_loss).collect()),
        take_profit: average(side.iter().filter_map(|v| v.signal.take_profit).collect()),
        contributing_strategy_names: side.iter().map(|v| v.strategy.name().to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::neutral_frame;
    use crate::indicators::Column;
    use crate::strategies::StrategyKind;
    use crate::Strategy;
    use common::Signal;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Scalping buy setup at row 25 of a neutral frame: SL 96, TP 106.
    fn scalping_buy(frame: &mut IndicatorFrame) {
        frame.set(Column::Rsi(6), 25, 20.0);
        frame.set(Column::Ema(12), 25, 102.0);
        frame.set(Column::VolumeRatio, 25, 2.0);
    }

    /// Fixed-output strategy for exercising the reduction directly.
    struct Fixed {
        name: &'static str,
        weight: f64,
        signal: Signal,
    }

    impl Strategy for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn weight(&self) -> f64 {
            self.weight
        }

        fn min_index(&self) -> usize {
            0
        }

        fn setup(&self, _frame: &IndicatorFrame, _index: usize) -> Option<Signal> {
            Some(self.signal)
        }
    }

    fn fixed(name: &'static str, weight: f64, signal: Signal) -> Fixed {
        Fixed {
            name,
            weight,
            signal,
        }
    }

    fn engine(strategies: Vec<Fixed>) -> ConsensusEngine {
        ConsensusEngine::new(
            StrategySet::new(
                strategies
                    .into_iter()
                    .map(|s| Box::new(s) as Box<dyn Strategy>)
                    .collect(),
            ),
            DEFAULT_THRESHOLD,
        )
    }

    #[test]
    fn no_votes_is_hold_zero() {
        let decision = ConsensusEngine::default().decide(&neutral_frame(30), 25);
        assert_eq!(decision, Decision::hold(0.0));
    }

    #[test]
    fn single_strategy_carries_its_own_confidence() {
        let mut frame = neutral_frame(30);
        scalping_buy(&mut frame);
        let decision = ConsensusEngine::default().decide(&frame, 25);
        assert_eq!(decision.direction, Direction::Buy);
        assert!(close(decision.confidence, 0.90), "got {}", decision.confidence);
        assert!(close(decision.stop_loss.unwrap(), 96.0));
        assert!(close(decision.take_profit.unwrap(), 106.0));
        assert_eq!(decision.contributing_strategy_names, vec!["Scalping"]);
    }

    #[test]
    fn opposing_votes_below_threshold_hold() {
        let mut frame = neutral_frame(30);
        scalping_buy(&mut frame);
        // strong bearish candle for Price Action
        frame.set(Column::Open, 25, 104.0);
        frame.set(Column::High, 25, 104.5);
        frame.set(Column::Low, 25, 99.5);

        let decision = ConsensusEngine::default().decide(&frame, 25);
        assert_eq!(decision.direction, Direction::Hold);
        let buy = 0.90 * 1.20 / (1.20 + 1.08);
        assert!(close(decision.confidence, buy), "got {}", decision.confidence);
        assert!(decision.stop_loss.is_none() && decision.take_profit.is_none());
        assert!(decision.contributing_strategy_names.is_empty());
    }

    #[test]
    fn agreeing_votes_average_only_their_levels() {
        let mut frame = neutral_frame(30);
        scalping_buy(&mut frame);
        // strong bullish candle for Price Action: SL 92, TP 112
        frame.set(Column::Open, 25, 96.0);
        frame.set(Column::High, 25, 100.5);
        frame.set(Column::Low, 25, 95.5);

        let decision = ConsensusEngine::default().decide(&frame, 25);
        assert_eq!(decision.direction, Direction::Buy);
        let expected = (0.90 * 1.20 + 0.84 * 1.08) / (1.20 + 1.08);
        assert!(close(decision.confidence, expected));
        assert!(close(decision.stop_loss.unwrap(), 94.0));
        assert!(close(decision.take_profit.unwrap(), 109.0));
        assert_eq!(
            decision.contributing_strategy_names,
            vec!["Scalping", "Price Action"]
        );
    }

    #[test]
    fn minority_side_levels_are_excluded() {
        let decision = engine(vec![
            fixed("a", 4.0, Signal::buy(1.0, 90.0, 120.0)),
            fixed("b", 0.5, Signal::sell(0.6, 110.0, 80.0)),
            fixed("c", 4.0, Signal::buy(0.9, 94.0, 110.0)),
        ])
        .decide(&neutral_frame(5), 1);
        assert_eq!(decision.direction, Direction::Buy);
        assert!(close(decision.stop_loss.unwrap(), 92.0));
        assert!(close(decision.take_profit.unwrap(), 115.0));
        assert_eq!(decision.contributing_strategy_names, vec!["a", "c"]);
    }

    #[test]
    fn sell_side_wins_symmetrically() {
        let decision = engine(vec![
            fixed("hold", 3.0, Signal::hold(0.5)),
            fixed("s", 1.0, Signal::sell(0.8, 105.0, 90.0)),
        ])
        .decide(&neutral_frame(5), 1);
        assert_eq!(decision.direction, Direction::Sell);
        assert!(close(decision.confidence, 0.8));
        assert_eq!(decision.stop_loss, Some(105.0));
    }

    #[test]
    fn equal_scores_hold() {
        let decision = engine(vec![
            fixed("b", 1.0, Signal::buy(0.9, 90.0, 110.0)),
            fixed("s", 1.0, Signal::sell(0.9, 110.0, 90.0)),
        ])
        .decide(&neutral_frame(5), 1);
        assert_eq!(decision.direction, Direction::Hold);
        assert!(close(decision.confidence, 0.45));
    }

    #[test]
    fn threshold_is_strict() {
        let decision = engine(vec![Fixed {
            name: "b",
            weight: 1.0,
            signal: Signal::buy(0.70, 90.0, 110.0),
        }])
        .decide(&neutral_frame(5), 1);
        assert_eq!(decision.direction, Direction::Hold);
        assert!(close(decision.confidence, 0.70));
    }

    #[test]
    fn from_config_uses_threshold() {
        let mut cfg = StrategyFileConfig::default();
        cfg.consensus.threshold = 0.5;
        cfg.strategies.retain(|e| e.kind != StrategyKind::Ichimoku);
        let engine = ConsensusEngine::from_config(&cfg).unwrap();
        assert_eq!(engine.threshold(), 0.5);
        assert_eq!(engine.strategies().len(), 9);
    }
}
