use tracing::{debug, info};

use common::Signal;

use crate::config::StrategyFileConfig;
use crate::indicators::IndicatorFrame;
use crate::strategies::StrategyKind;
use crate::Strategy;

/// Ordered collection of the strategies taking part in the consensus.
pub struct StrategySet {
    strategies: Vec<Box<dyn Strategy>>,
}

/// One strategy's signal at a given row.
pub struct Vote<'a> {
    pub strategy: &'a dyn Strategy,
    pub signal: Signal,
}

impl StrategySet {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// All ten strategies in canonical order.
    pub fn standard() -> Self {
        Self::new(StrategyKind::ALL.iter().map(|k| k.build()).collect())
    }

    /// Build the set from the enabled entries of a config, keeping file order.
    pub fn from_config(file_cfg: &StrategyFileConfig) -> Self {
        let strategies: Vec<Box<dyn Strategy>> = file_cfg
            .enabled()
            .map(|kind| {
                let strategy = kind.build();
                info!(name = %strategy.name(), weight = strategy.weight(), "Registered strategy");
                strategy
            })
            .collect();
        Self::new(strategies)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Strategy> {
        self.strategies.iter().map(|s| s.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|s| s.name()).collect()
    }

    /// Evaluate every strategy at `index`, in set order.
    pub fn evaluate(&self, frame: &IndicatorFrame, index: usize) -> Vec<Vote<'_>> {
        self.iter()
            .map(|strategy| {
                let signal = strategy.evaluate(frame, index);
                debug!(
                    strategy = %strategy.name(),
                    direction = %signal.direction,
                    confidence = signal.confidence,
                    index,
                    "Strategy vote"
                );
                Vote { strategy, signal }
            })
            .collect()
    }
}

impl Default for StrategySet {
    fn default() -> Self {
        Self::standard()
    }
}
