pub mod config;
pub mod consensus;
pub mod indicators;
pub mod registry;
pub mod strategies;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::{ConsensusConfig, StrategyEntry, StrategyFileConfig};
pub use consensus::ConsensusEngine;
pub use indicators::{compute_indicators, Column, IndicatorFrame};
pub use registry::{StrategySet, Vote};
pub use strategies::StrategyKind;

use common::Signal;

/// Informational confidence of a strategy that is warmed up but sees no setup.
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// All strategy implementations must satisfy this trait.
///
/// Strategies are stateless: the same frame and index always give the same
/// signal, so a set can be evaluated in any order or in parallel.
pub trait Strategy: Send + Sync {
    /// Human-readable name, reported in decisions.
    fn name(&self) -> &str;

    /// Fixed weight of this strategy's vote in the consensus.
    fn weight(&self) -> f64;

    /// Rows of history required before `index` is evaluated.
    fn min_index(&self) -> usize;

    /// Look for a directional setup at `index`, which is past warm-up and
    /// inside the frame. `None` when no condition holds or a required column
    /// is missing.
    fn setup(&self, frame: &IndicatorFrame, index: usize) -> Option<Signal>;

    /// Signal at `index`. Below warm-up (or outside the frame) this is Hold
    /// with confidence 0; with no setup it is Hold at [`NEUTRAL_CONFIDENCE`].
    fn evaluate(&self, frame: &IndicatorFrame, index: usize) -> Signal {
        if index < self.min_index() || index >= frame.len() {
            return Signal::hold(0.0);
        }
        self.setup(frame, index)
            .unwrap_or(Signal::hold(NEUTRAL_CONFIDENCE))
    }
}
