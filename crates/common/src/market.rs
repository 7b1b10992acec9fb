use async_trait::async_trait;

use crate::{Bar, Position, Result, TradeRecord};

/// Supplier of chronological price bars for a symbol.
///
/// The decision core never fetches data itself; drivers such as the paper
/// trader call this and hand the bars to the indicator pipeline. Timeouts and
/// retries are the implementor's concern.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Most recent `limit` bars for `symbol`, oldest first.
    async fn bars(&self, symbol: &str, limit: usize) -> Result<Vec<Bar>>;
}

/// Durable home for positions the ledger opens and closes.
#[async_trait]
pub trait PositionStore: Send + Sync {
    async fn save_open(&self, account: &str, position: &Position) -> Result<()>;

    async fn save_close(&self, account: &str, trade: &TradeRecord) -> Result<()>;
}
