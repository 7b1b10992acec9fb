use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;

use common::{Error, Result};

use crate::ledger::{RiskConfig, RiskLedger};

/// A ledger behind its account's exclusive lock.
pub type SharedLedger = Arc<Mutex<RiskLedger>>;

/// Ledgers keyed by account identity.
///
/// Each account has its own mutex, so operations on one account serialize
/// while different accounts proceed independently. The outer lock is held
/// only long enough to look up or insert an entry.
pub struct LedgerBook {
    config: RiskConfig,
    ledgers: RwLock<HashMap<String, SharedLedger>>,
}

impl LedgerBook {
    pub fn new(config: RiskConfig) -> Self {
        Self {
            config,
            ledgers: RwLock::new(HashMap::new()),
        }
    }

    pub async fn open_account(&self, account: &str, initial_balance: f64) -> Result<SharedLedger> {
        let mut ledgers = self.ledgers.write().await;
        if ledgers.contains_key(account) {
            return Err(Error::AccountExists {
                account: account.to_string(),
            });
        }
        let ledger = Arc::new(Mutex::new(RiskLedger::new(initial_balance, self.config)));
        ledgers.insert(account.to_string(), ledger.clone());
        info!(account, initial_balance, "Account opened");
        Ok(ledger)
    }

    pub async fn ledger(&self, account: &str) -> Result<SharedLedger> {
        self.ledgers
            .read()
            .await
            .get(account)
            .cloned()
            .ok_or_else(|| Error::AccountNotFound {
                account: account.to_string(),
            })
    }

    /// Existing ledger for `account`, or a fresh one at `initial_balance`.
    pub async fn get_or_open(&self, account: &str, initial_balance: f64) -> SharedLedger {
        if let Some(ledger) = self.ledgers.read().await.get(account) {
            return ledger.clone();
        }
        let mut ledgers = self.ledgers.write().await;
        ledgers
            .entry(account.to_string())
            .or_insert_with(|| {
                info!(account, initial_balance, "Account opened");
                Arc::new(Mutex::new(RiskLedger::new(initial_balance, self.config)))
            })
            .clone()
    }

    /// Known account identities, sorted.
    pub async fn accounts(&self) -> Vec<String> {
        let mut accounts: Vec<String> = self.ledgers.read().await.keys().cloned().collect();
        accounts.sort();
        accounts
    }
}

impl Default for LedgerBook {
    fn default() -> Self {
        Self::new(RiskConfig::default())
    }
}
