mod bars;

use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::Config;
use paper::{MemoryMarketData, MemoryPositionStore, PaperTrader};
use risk::{LedgerBook, RiskConfig};
use strategy::{compute_indicators, ConsensusEngine, StrategyFileConfig};

const ACCOUNT: &str = "paper";

#[tokio::main]
async fn main() -> Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(symbol = %cfg.symbol, bars = %cfg.bars_csv_path, "Ensemble replay starting");

    let strategy_file = match &cfg.strategy_config_path {
        Some(path) => StrategyFileConfig::load(path)?,
        None => StrategyFileConfig::default(),
    };
    let engine = ConsensusEngine::from_config(&strategy_file)?;
    info!(
        strategies = ?engine.strategies().names(),
        threshold = engine.threshold(),
        "Consensus engine ready"
    );

    // ── Market data ───────────────────────────────────────────────────────────
    let file = File::open(&cfg.bars_csv_path)
        .with_context(|| format!("cannot open bar file '{}'", cfg.bars_csv_path))?;
    let bars = bars::read_bars(file)?;
    let frame = compute_indicators(&bars);
    info!(bars = bars.len(), rows = frame.len(), "Indicators computed");
    if frame.is_empty() {
        warn!("Fewer bars than the 200-bar warm-up; nothing to replay");
    }

    let market = Arc::new(MemoryMarketData::new());
    market.set_bars(&cfg.symbol, bars).await;
    let store = Arc::new(MemoryPositionStore::new());

    // ── Ledger ────────────────────────────────────────────────────────────────
    let book = LedgerBook::new(RiskConfig {
        max_risk_per_trade: cfg.max_risk_per_trade,
    });
    let ledger = book.open_account(ACCOUNT, cfg.initial_balance).await?;

    // ── Replay ────────────────────────────────────────────────────────────────
    let trader = PaperTrader::new(ACCOUNT, engine, ledger.clone(), market, store);
    let summary = trader.replay(&cfg.symbol, &frame).await?;

    info!(summary = %serde_json::to_string_pretty(&summary)?, "Replay summary");
    for trade in ledger.lock().await.trade_history(5) {
        info!(
            symbol = %trade.position.symbol,
            entry = trade.position.entry_price,
            exit = trade.exit_price,
            profit = trade.profit,
            strategies = ?trade.position.strategies,
            "Recent trade"
        );
    }
    Ok(())
}
