use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use common::{Bar, Error, MarketDataSource, Position, PositionStore, Result, TradeRecord};

/// Bar source backed by in-memory series, one per symbol.
#[derive(Default)]
pub struct MemoryMarketData {
    series: RwLock<HashMap<String, Vec<Bar>>>,
}

impl MemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole series for `symbol`.
    pub async fn set_bars(&self, symbol: &str, bars: Vec<Bar>) {
        self.series.write().await.insert(symbol.to_string(), bars);
    }

    /// Append the newest bar for `symbol`.
    pub async fn push_bar(&self, symbol: &str, bar: Bar) {
        self.series
            .write()
            .await
            .entry(symbol.to_string())
            .or_default()
            .push(bar);
    }
}

#[async_trait]
impl MarketDataSource for MemoryMarketData {
    async fn bars(&self, symbol: &str, limit: usize) -> Result<Vec<Bar>> {
        let series = self.series.read().await;
        let bars = series
            .get(symbol)
            .ok_or_else(|| Error::MarketData(format!("no bars loaded for '{symbol}'")))?;
        let start = bars.len().saturating_sub(limit);
        debug!(symbol, count = bars.len() - start, "Serving bars");
        Ok(bars[start..].to_vec())
    }
}

/// Position store that keeps every saved record in memory, tagged by account.
#[derive(Default)]
pub struct MemoryPositionStore {
    opened: RwLock<Vec<(String, Position)>>,
    closed: RwLock<Vec<(String, TradeRecord)>>,
}

impl MemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn opened(&self) -> Vec<(String, Position)> {
        self.opened.read().await.clone()
    }

    pub async fn closed(&self) -> Vec<(String, TradeRecord)> {
        self.closed.read().await.clone()
    }
}

#[async_trait]
impl PositionStore for MemoryPositionStore {
    async fn save_open(&self, account: &str, position: &Position) -> Result<()> {
        self.opened
            .write()
            .await
            .push((account.to_string(), position.clone()));
        Ok(())
    }

    async fn save_close(&self, account: &str, trade: &TradeRecord) -> Result<()> {
        self.closed
            .write()
            .await
            .push((account.to_string(), trade.clone()));
        Ok(())
    }
}
