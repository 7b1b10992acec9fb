use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One OHLCV sample. Sequences are chronological with unique timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Directional opinion of a strategy or of the consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Hold,
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Hold => write!(f, "HOLD"),
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// Output of a single strategy at one bar.
///
/// `stop_loss` and `take_profit` are `Some` exactly when `direction` is not
/// `Hold`; use the constructors to keep that true.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    pub confidence: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl Signal {
    pub fn hold(confidence: f64) -> Self {
        Self {
            direction: Direction::Hold,
            confidence,
            stop_loss: None,
            take_profit: None,
        }
    }

    pub fn buy(confidence: f64, stop_loss: f64, take_profit: f64) -> Self {
        Self {
            direction: Direction::Buy,
            confidence,
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
        }
    }

    pub fn sell(confidence: f64, stop_loss: f64, take_profit: f64) -> Self {
        Self {
            direction: Direction::Sell,
            confidence,
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
        }
    }

    pub fn is_hold(&self) -> bool {
        self.direction == Direction::Hold
    }
}

/// Aggregated ensemble verdict for one bar. Built fresh per evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub direction: Direction,
    pub confidence: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    /// Names of the strategies that voted for `direction`, in evaluation order.
    pub contributing_strategy_names: Vec<String>,
}

impl Decision {
    pub fn hold(confidence: f64) -> Self {
        Self {
            direction: Direction::Hold,
            confidence,
            stop_loss: None,
            take_profit: None,
            contributing_strategy_names: Vec::new(),
        }
    }
}

/// An open (or, inside a [`TradeRecord`], closed) exposure to a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub entry_price: f64,
    pub size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub confidence: f64,
    /// `entry_price * size`, reserved from the balance at open.
    pub entry_value: f64,
    pub opened_at: DateTime<Utc>,
    pub is_open: bool,
    /// Strategies whose consensus opened this position, if it came from a decision.
    #[serde(default)]
    pub strategies: Vec<String>,
}

impl Position {
    /// Exit levels placed below entry for the stop and above for the target
    /// describe a long; the mirror image describes a short.
    pub fn is_long(&self) -> bool {
        self.stop_loss <= self.take_profit
    }

    pub fn exit_trigger(&self, price: f64) -> Option<ExitTrigger> {
        let (stop_hit, target_hit) = if self.is_long() {
            (price <= self.stop_loss, price >= self.take_profit)
        } else {
            (price >= self.stop_loss, price <= self.take_profit)
        };
        if stop_hit {
            Some(ExitTrigger::StopLossHit)
        } else if target_hit {
            Some(ExitTrigger::TakeProfitHit)
        } else {
            None
        }
    }
}

/// Which exit level a price touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitTrigger {
    StopLossHit,
    TakeProfitHit,
}

impl std::fmt::Display for ExitTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitTrigger::StopLossHit => write!(f, "stop-loss"),
            ExitTrigger::TakeProfitHit => write!(f, "take-profit"),
        }
    }
}

/// Realized result of closing a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: Uuid,
    /// The closed position, `is_open == false`.
    pub position: Position,
    pub exit_price: f64,
    pub exit_value: f64,
    pub profit: f64,
    pub profit_pct: f64,
    pub closed_at: DateTime<Utc>,
    pub duration_minutes: f64,
}

impl TradeRecord {
    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }
}

/// Account-level bookkeeping, mutated only by ledger open/close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub balance: f64,
    pub initial_balance: f64,
    pub total_profit: f64,
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
}

impl PortfolioState {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            initial_balance,
            total_profit: 0.0,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
        }
    }

    /// Percentage of closed trades with positive profit; 0 with no trades.
    pub fn win_rate(&self) -> f64 {
        if self.total_trades > 0 {
            self.winning_trades as f64 / self.total_trades as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Read-only summary derived from a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub balance: f64,
    pub initial_balance: f64,
    /// Balance plus the entry value of every open position.
    pub total_value: f64,
    pub total_profit: f64,
    pub total_profit_pct: f64,
    pub open_positions: usize,
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub win_rate: f64,
}
