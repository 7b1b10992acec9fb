pub mod memory;
pub mod trader;

pub use memory::{MemoryMarketData, MemoryPositionStore};
pub use trader::{CloseReason, PaperTrader, ReplaySummary, TickAction, TickOutcome};
