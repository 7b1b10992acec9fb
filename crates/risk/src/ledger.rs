use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use common::{
    Decision, Direction, Error, ExitTrigger, PortfolioState, PortfolioStats, Position, Result,
    TradeRecord,
};

/// Largest share of the balance a single position may tie up. Compiled-in,
/// not user-configurable.
pub const MAX_ALLOCATION_FRACTION: f64 = 0.95;

/// Per-ledger risk parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Fraction of the balance lost if a full-confidence position hits its
    /// stop (e.g. 0.02 = 2%).
    pub max_risk_per_trade: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_risk_per_trade: 0.02,
        }
    }
}

/// Balance, open positions and realized P&L of one account.
///
/// At most one position is open per symbol. Every failing operation returns
/// before touching state.
#[derive(Debug, Clone)]
pub struct RiskLedger {
    config: RiskConfig,
    state: PortfolioState,
    positions: HashMap<String, Position>,
    history: Vec<TradeRecord>,
}

impl RiskLedger {
    pub fn new(initial_balance: f64, config: RiskConfig) -> Self {
        Self {
            config,
            state: PortfolioState::new(initial_balance),
            positions: HashMap::new(),
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    pub fn balance(&self) -> f64 {
        self.state.balance
    }

    /// Size that loses `balance · max_risk_per_trade · confidence` if the
    /// stop is hit, capped at [`MAX_ALLOCATION_FRACTION`] of the balance.
    /// Zero when entry and stop coincide.
    pub fn position_size(&self, entry_price: f64, stop_loss: f64, confidence: f64) -> f64 {
        let balance = self.state.balance;
        let risk_amount = balance * self.config.max_risk_per_trade * confidence;
        let price_risk = (entry_price - stop_loss).abs();
        if price_risk == 0.0 || !price_risk.is_finite() || entry_price <= 0.0 {
            return 0.0;
        }
        let cap = MAX_ALLOCATION_FRACTION * balance / entry_price;
        (risk_amount / price_risk).min(cap).max(0.0)
    }

    pub fn open_position(
        &mut self,
        symbol: &str,
        entry_price: f64,
        size: f64,
        stop_loss: f64,
        take_profit: f64,
        confidence: f64,
    ) -> Result<Position> {
        self.open_with(symbol, entry_price, size, stop_loss, take_profit, confidence, Vec::new())
    }

    /// Size and open a position from a consensus decision. Only Buy decisions
    /// open; Hold, Sell, missing exit levels or a zero size open nothing.
    pub fn open_from_decision(
        &mut self,
        symbol: &str,
        entry_price: f64,
        decision: &Decision,
    ) -> Result<Option<Position>> {
        if decision.direction != Direction::Buy {
            return Ok(None);
        }
        let (Some(stop_loss), Some(take_profit)) = (decision.stop_loss, decision.take_profit) else {
            return Ok(None);
        };
        let size = self.position_size(entry_price, stop_loss, decision.confidence);
        if size <= 0.0 {
            return Ok(None);
        }
        self.open_with(
            symbol,
            entry_price,
            size,
            stop_loss,
            take_profit,
            decision.confidence,
            decision.contributing_strategy_names.clone(),
        )
        .map(Some)
    }

    #[allow(clippy::too_many_arguments)]
    fn open_with(
        &mut self,
        symbol: &str,
        entry_price: f64,
        size: f64,
        stop_loss: f64,
        take_profit: f64,
        confidence: f64,
        strategies: Vec<String>,
    ) -> Result<Position> {
        if self.positions.contains_key(symbol) {
            warn!(symbol, "Open rejected: position already open");
            return Err(Error::PositionAlreadyOpen {
                symbol: symbol.to_string(),
            });
        }
        if !valid_price(entry_price) {
            warn!(symbol, entry_price, "Open rejected: invalid price");
            return Err(Error::InvalidPrice { price: entry_price });
        }
        if !(size.is_finite() && size > 0.0) {
            warn!(symbol, size, "Open rejected: invalid size");
            return Err(Error::InvalidSize { size });
        }
        let entry_value = entry_price * size;
        if entry_value > self.state.balance {
            warn!(
                symbol,
                required = entry_value,
                available = self.state.balance,
                "Open rejected: insufficient balance"
            );
            return Err(Error::InsufficientBalance {
                required: entry_value,
                available: self.state.balance,
            });
        }

        let position = Position {
            symbol: symbol.to_string(),
            entry_price,
            size,
            stop_loss,
            take_profit,
            confidence,
            entry_value,
            opened_at: Utc::now(),
            is_open: true,
            strategies,
        };
        self.state.balance -= entry_value;
        self.positions.insert(symbol.to_string(), position.clone());

        info!(
            symbol,
            entry_price,
            size,
            stop_loss,
            take_profit,
            confidence,
            balance = self.state.balance,
            "Position opened"
        );
        Ok(position)
    }

    /// Realize the open position for `symbol` at `exit_price`.
    ///
    /// Profit above zero counts as a win, below zero as a loss; a flat trade
    /// only counts toward `total_trades`.
    pub fn close_position(&mut self, symbol: &str, exit_price: f64) -> Result<TradeRecord> {
        if !valid_price(exit_price) {
            warn!(symbol, exit_price, "Close rejected: invalid price");
            return Err(Error::InvalidPrice { price: exit_price });
        }
        let Some(mut position) = self.positions.remove(symbol) else {
            warn!(symbol, "Close rejected: no open position");
            return Err(Error::PositionNotFound {
                symbol: symbol.to_string(),
            });
        };

        let exit_value = exit_price * position.size;
        let profit = exit_value - position.entry_value;
        let profit_pct = if position.entry_value > 0.0 {
            profit / position.entry_value * 100.0
        } else {
            0.0
        };

        self.state.balance += exit_value;
        self.state.total_profit += profit;
        self.state.total_trades += 1;
        if profit > 0.0 {
            self.state.winning_trades += 1;
        } else if profit < 0.0 {
            self.state.losing_trades += 1;
        }

        let closed_at = Utc::now();
        let duration_minutes = (closed_at - position.opened_at).num_milliseconds() as f64 / 60_000.0;
        position.is_open = false;

        let trade = TradeRecord {
            id: Uuid::new_v4(),
            position,
            exit_price,
            exit_value,
            profit,
            profit_pct,
            closed_at,
            duration_minutes,
        };
        info!(
            symbol,
            exit_price,
            profit,
            profit_pct,
            balance = self.state.balance,
            "Position closed"
        );
        self.history.push(trade.clone());
        Ok(trade)
    }

    /// Which exit level, if any, `current_price` has reached for the open
    /// position on `symbol`. The stop is checked first; both bounds are
    /// inclusive.
    pub fn check_exit(&self, symbol: &str, current_price: f64) -> Option<ExitTrigger> {
        self.positions.get(symbol)?.exit_trigger(current_price)
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// Open positions ordered by symbol.
    pub fn open_positions(&self) -> Vec<&Position> {
        let mut open: Vec<&Position> = self.positions.values().collect();
        open.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        open
    }

    /// Up to `limit` closed trades, newest first.
    pub fn trade_history(&self, limit: usize) -> Vec<&TradeRecord> {
        self.history.iter().rev().take(limit).collect()
    }

    pub fn portfolio_stats(&self) -> PortfolioStats {
        let state = &self.state;
        let committed: f64 = self.positions.values().map(|p| p.entry_value).sum();
        let total_profit_pct = if state.initial_balance > 0.0 {
            state.total_profit / state.initial_balance * 100.0
        } else {
            0.0
        };
        PortfolioStats {
            balance: state.balance,
            initial_balance: state.initial_balance,
            total_value: state.balance + committed,
            total_profit: state.total_profit,
            total_profit_pct,
            open_positions: self.positions.len(),
            total_trades: state.total_trades,
            winning_trades: state.winning_trades,
            losing_trades: state.losing_trades,
            win_rate: state.win_rate(),
        }
    }
}

fn valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

// ─── Tests ────────────────────────────────────────────────────────────────────
