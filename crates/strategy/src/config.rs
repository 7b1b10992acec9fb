use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use common::{Error, Result};

use crate::consensus::DEFAULT_THRESHOLD;
use crate::strategies::StrategyKind;

/// Strategy-set config file (TOML).
///
/// Example `config/strategies.toml`:
/// ```toml
/// [consensus]
/// threshold = 0.70
///
/// [[strategy]]
/// type = "scalping"
///
/// [[strategy]]
/// type = "breakout"
/// enabled = false
/// ```
///
/// Order of `[[strategy]]` tables is the evaluation order and therefore the
/// order of contributing names in a decision.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    #[serde(default)]
    pub consensus: ConsensusConfig,
    #[serde(rename = "strategy", default)]
    pub strategies: Vec<StrategyEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsensusConfig {
    /// Normalized score a side must exceed to produce a trade.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyEntry {
    #[serde(rename = "type")]
    pub kind: StrategyKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_enabled() -> bool {
    true
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Default for StrategyFileConfig {
    /// All ten strategies in canonical order.
    fn default() -> Self {
        Self {
            consensus: ConsensusConfig::default(),
            strategies: StrategyKind::ALL
                .iter()
                .map(|&kind| StrategyEntry {
                    kind,
                    enabled: true,
                })
                .collect(),
        }
    }
}

impl StrategyFileConfig {
    /// Load and validate a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("strategy config at '{path}': {e}")))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.consensus.threshold;
        if !(0.0..1.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "consensus threshold must be in [0, 1), got {threshold}"
            )));
        }
        let mut seen = HashSet::new();
        for entry in &self.strategies {
            if !seen.insert(entry.kind) {
                return Err(Error::Config(format!(
                    "strategy {:?} listed more than once",
                    entry.kind
                )));
            }
        }
        Ok(())
    }

    /// Enabled strategy kinds, in file order.
    pub fn enabled(&self) -> impl Iterator<Item = StrategyKind> + '_ {
        self.strategies
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.kind)
    }
}
