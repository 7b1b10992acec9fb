use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use common::{
    Decision, Direction, Error, ExitTrigger, MarketDataSource, PortfolioStats, Position,
    PositionStore, Result, TradeRecord,
};
use risk::SharedLedger;
use strategy::{compute_indicators, Column, ConsensusEngine, IndicatorFrame};

/// Bars requested per tick: the 200-bar warm-up plus room for the longest
/// strategy look-back.
pub const BAR_HISTORY: usize = 500;

/// Why an open position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloseReason {
    Exit(ExitTrigger),
    SellSignal,
}

/// What a tick did to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum TickAction {
    Opened(Position),
    Closed {
        trade: TradeRecord,
        reason: CloseReason,
    },
    Held,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub decision: Decision,
    pub action: TickAction,
}

/// Totals of a replay over a whole frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    /// Frame rows evaluated.
    pub decisions: usize,
    pub opened: usize,
    pub closed: usize,
    pub stats: PortfolioStats,
}

/// Drives one account's ledger from consensus decisions, long only.
///
/// An open position is closed when its stop or target is reached, or on a
/// Sell decision; with no open position a Buy decision opens one.
pub struct PaperTrader {
    account: String,
    engine: ConsensusEngine,
    ledger: SharedLedger,
    market: Arc<dyn MarketDataSource>,
    store: Arc<dyn PositionStore>,
}

impl PaperTrader {
    pub fn new(
        account: impl Into<String>,
        engine: ConsensusEngine,
        ledger: SharedLedger,
        market: Arc<dyn MarketDataSource>,
        store: Arc<dyn PositionStore>,
    ) -> Self {
        Self {
            account: account.into(),
            engine,
            ledger,
            market,
            store,
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    /// Fetch the latest bars for `symbol`, decide on the newest row and act
    /// at its close.
    pub async fn tick(&self, symbol: &str) -> Result<TickOutcome> {
        let bars = self.market.bars(symbol, BAR_HISTORY).await?;
        let frame = compute_indicators(&bars);
        if frame.is_empty() {
            warn!(symbol, bars = bars.len(), "Not enough history to decide");
            return Ok(TickOutcome {
                decision: Decision::hold(0.0),
                action: TickAction::Held,
            });
        }
        self.step(symbol, &frame, frame.len() - 1).await
    }

    /// Walk every row of `frame` in order, acting at each row's close.
    ///
    /// Stops at the first error. A failed store write leaves the ledger
    /// change in place; the failing record is logged at warn level.
    pub async fn replay(&self, symbol: &str, frame: &IndicatorFrame) -> Result<ReplaySummary> {
        let mut opened = 0;
        let mut closed = 0;
        for index in 0..frame.len() {
            match self.step(symbol, frame, index).await?.action {
                TickAction::Opened(_) => opened += 1,
                TickAction::Closed { .. } => closed += 1,
                TickAction::Held => {}
            }
        }
        let stats = self.ledger.lock().await.portfolio_stats();
        info!(
            account = %self.account,
            symbol,
            rows = frame.len(),
            opened,
            closed,
            balance = stats.balance,
            "Replay finished"
        );
        Ok(ReplaySummary {
            decisions: frame.len(),
            opened,
            closed,
            stats,
        })
    }

    async fn step(&self, symbol: &str, frame: &IndicatorFrame, index: usize) -> Result<TickOutcome> {
        let price = frame
            .value(Column::Close, index)
            .ok_or_else(|| Error::MarketData(format!("no close at row {index} for '{symbol}'")))?;
        let decision = self.engine.decide(frame, index);

        let action = {
            let mut ledger = self.ledger.lock().await;
            if ledger.position(symbol).is_some() {
                let reason = match ledger.check_exit(symbol, price) {
                    Some(trigger) => Some(CloseReason::Exit(trigger)),
                    None if decision.direction == Direction::Sell => Some(CloseReason::SellSignal),
                    None => None,
                };
                match reason {
                    Some(reason) => TickAction::Closed {
                        trade: ledger.close_position(symbol, price)?,
                        reason,
                    },
                    None => TickAction::Held,
                }
            } else if decision.direction == Direction::Buy {
                match ledger.open_from_decision(symbol, price, &decision)? {
                    Some(position) => TickAction::Opened(position),
                    None => TickAction::Held,
                }
            } else {
                TickAction::Held
            }
        };

        // The ledger has already changed; a store failure leaves the two
        // out of step and is reported with the record to reconcile.
        match &action {
            TickAction::Opened(position) => {
                if let Err(e) = self.store.save_open(&self.account, position).await {
                    warn!(
                        account = %self.account,
                        position = ?position,
                        error = %e,
                        "Position opened in ledger but not persisted"
                    );
                    return Err(e);
                }
            }
            TickAction::Closed { trade, reason } => {
                if let Err(e) = self.store.save_close(&self.account, trade).await {
                    warn!(
                        account = %self.account,
                        trade = ?trade,
                        error = %e,
                        "Trade closed in ledger but not persisted"
                    );
                    return Err(e);
                }
                debug!(symbol, reason = ?reason, profit = trade.profit, "Closing trade persisted");
            }
            TickAction::Held => {}
        }

        Ok(TickOutcome { decision, action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryMarketData, MemoryPositionStore};
    use chrono::{Duration, TimeZone, Utc};
    use async_trait::async_trait;
    use common::{Bar, PositionStore, Signal};
    use risk::{RiskConfig, RiskLedger};
    use strategy::{StrategySet, Strategy};
    use tokio::sync::Mutex;

    /// Buys below `buy_below`, sells above `sell_above`; stop 5 under and
    /// target 20 over the close.
    struct Band {
        buy_below: f64,
        sell_above: f64,
    }

    impl Strategy for Band {
        fn name(&self) -> &str {
            "Band"
        }

        fn weight(&self) -> f64 {
            1.0
        }

        fn min_index(&self) -> usize {
            0
        }

        fn setup(&self, frame: &IndicatorFrame, index: usize) -> Option<Signal> {
            let close = frame.value(Column::Close, index)?;
            if close < self.buy_below {
                Some(Signal::buy(0.9, close - 5.0, close + 20.0))
            } else if close > self.sell_above {
                Some(Signal::sell(0.9, close + 5.0, close - 20.0))
            } else {
                None
            }
        }
    }

    fn band(buy_below: f64, sell_above: f64) -> Band {
        Band {
            buy_below,
            sell_above,
        }
    }

    fn trader(band: Band) -> (PaperTrader, Arc<MemoryMarketData>, Arc<MemoryPositionStore>) {
        let strategies: Vec<Box<dyn Strategy>> = vec![Box::new(band)];
        let engine = ConsensusEngine::new(StrategySet::new(strategies), 0.70);
        let ledger = Arc::new(Mutex::new(RiskLedger::new(10_000.0, RiskConfig::default())));
        let market = Arc::new(MemoryMarketData::new());
        let store = Arc::new(MemoryPositionStore::new());
        let trader = PaperTrader::new("paper", engine, ledger, market.clone(), store.clone());
        (trader, market, store)
    }

    /// Store whose writes always fail.
    struct BrokenStore;

    #[async_trait]
    impl PositionStore for BrokenStore {
        async fn save_open(&self, _account: &str, _position: &Position) -> Result<()> {
            Err(Error::Other("store offline".into()))
        }

        async fn save_close(&self, _account: &str, _trade: &TradeRecord) -> Result<()> {
            Err(Error::Other("store offline".into()))
        }
    }

    fn bars(n: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let t = i as f64;
                let close = 100.0 + (t / 6.0).sin() * 2.0;
                let open = close - (t / 4.0).cos() * 0.5;
                Bar {
                    timestamp: start + Duration::hours(i as i64),
                    open,
                    high: close.max(open) + 0.6,
                    low: close.min(open) - 0.6,
                    close,
                    volume: 800.0 + (t / 3.0).sin().abs() * 400.0,
                }
            })
            .collect()
    }

    fn closes_frame(closes: &[f64]) -> IndicatorFrame {
        IndicatorFrame::with_len(closes.len()).with_column(Column::Close, closes.to_vec())
    }

    #[tokio::test]
    async fn tick_without_history_holds() {
        let (trader, market, store) = trader(band(1e9, 1e9));
        market.set_bars("SOL", bars(150)).await;

        let outcome = trader.tick("SOL").await.unwrap();
        assert_eq!(outcome.action, TickAction::Held);
        assert_eq!(outcome.decision, Decision::hold(0.0));
        assert!(store.opened().await.is_empty());
    }

    #[tokio::test]
    async fn tick_propagates_market_errors() {
        let (trader, _market, _store) = trader(band(1e9, 1e9));
        assert!(matches!(trader.tick("SOL").await, Err(Error::MarketData(_))));
    }

    #[tokio::test]
    async fn tick_opens_then_stops_out() {
        let (trader, market, store) = trader(band(1e9, 1e9));
        let history = bars(260);
        let last = *history.last().unwrap();
        market.set_bars("SOL", history).await;

        let outcome = trader.tick("SOL").await.unwrap();
        let position = match outcome.action {
            TickAction::Opened(position) => position,
            other => panic!("expected an open, got {other:?}"),
        };
        assert_eq!(position.entry_price, last.close);
        assert_eq!(position.strategies, vec!["Band"]);

        // same bars again: nothing reached, still a Buy
        assert_eq!(trader.tick("SOL").await.unwrap().action, TickAction::Held);

        market
            .push_bar(
                "SOL",
                Bar {
                    timestamp: last.timestamp + Duration::hours(1),
                    open: last.close,
                    high: last.close,
                    low: last.close - 10.5,
                    close: last.close - 10.0,
                    volume: 1_000.0,
                },
            )
            .await;
        let outcome = trader.tick("SOL").await.unwrap();
        let (trade, reason) = match outcome.action {
            TickAction::Closed { trade, reason } => (trade, reason),
            other => panic!("expected a close, got {other:?}"),
        };
        assert_eq!(reason, CloseReason::Exit(ExitTrigger::StopLossHit));
        assert!(trade.profit < 0.0);

        assert_eq!(store.opened().await.len(), 1);
        assert_eq!(store.closed().await.len(), 1);
        assert_eq!(store.closed().await[0].0, "paper");
    }

    #[tokio::test]
    async fn replay_closes_on_sell_and_on_stop() {
        let (trader, _market, store) = trader(band(100.0, 110.0));
        let frame = closes_frame(&[95.0, 100.0, 105.0, 112.0, 95.0, 80.0]);

        let summary = trader.replay("SOL", &frame).await.unwrap();
        assert_eq!(summary.decisions, 6);
        assert_eq!(summary.opened, 2);
        assert_eq!(summary.closed, 2);
        assert_eq!(summary.stats.total_trades, 2);
        assert_eq!(summary.stats.winning_trades, 1);
        assert_eq!(summary.stats.losing_trades, 1);
        assert_eq!(summary.stats.open_positions, 0);

        let closed = store.closed().await;
        assert_eq!(closed[0].1.exit_price, 112.0);
        assert_eq!(closed[1].1.exit_price, 80.0);
    }

    #[tokio::test]
    async fn sell_without_position_does_nothing() {
        let (trader, _market, store) = trader(band(0.0, 50.0));
        let summary = trader.replay("SOL", &closes_frame(&[100.0, 101.0])).await.unwrap();
        assert_eq!(summary.opened, 0);
        assert_eq!(summary.stats.balance, 10_000.0);
        assert!(store.opened().await.is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_returned_and_ledger_keeps_position() {
        let strategies: Vec<Box<dyn Strategy>> = vec![Box::new(band(100.0, 110.0))];
        let engine = ConsensusEngine::new(StrategySet::new(strategies), 0.70);
        let ledger = Arc::new(Mutex::new(RiskLedger::new(10_000.0, RiskConfig::default())));
        let trader = PaperTrader::new(
            "paper",
            engine,
            ledger.clone(),
            Arc::new(MemoryMarketData::new()),
            Arc::new(BrokenStore),
        );

        let err = trader.replay("SOL", &closes_frame(&[95.0])).await.unwrap_err();
        assert!(matches!(err, Error::Other(_)));
        assert!(ledger.lock().await.position("SOL").is_some());
    }
}
